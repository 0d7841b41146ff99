//! Integration test: writes addressed past the joint table are absorbed.

use mc_common::motion::command::{CALIBRATOR_TYPE3, WireCalibrator, WireSetpoint};
use mc_common::motion::config::{Impedance, JointConfig, Pid};
use mc_common::motion::error::DiagnosticFlags;
use mc_common::motion::state::{ControlMode, JointStatus, MotionMonitorMode};
use mc_node::dispatch::{NvValue, VariableKind};

use super::common::Harness;

/// One representative value for every variable kind.
fn every_kind() -> Vec<NvValue> {
    let values = vec![
        NvValue::Config(JointConfig::default()),
        NvValue::ConfigPidPosition(Pid::default()),
        NvValue::ConfigPidVelocity(Pid::default()),
        NvValue::ConfigPidTorque(Pid::default()),
        NvValue::ConfigImpedance(Impedance::default()),
        NvValue::ConfigMinPosition(-100),
        NvValue::ConfigMaxPosition(100),
        NvValue::ConfigVelocityTimeout(50),
        NvValue::ConfigMotionMonitorMode(MotionMonitorMode::Forever),
        NvValue::Status(JointStatus::default()),
        NvValue::CmdSetpoint(WireSetpoint::default()),
        NvValue::CmdStopTrajectory(true),
        NvValue::CmdCalibration(WireCalibrator {
            kind: CALIBRATOR_TYPE3,
            params: [0, 0, 0],
        }),
        NvValue::CmdControlMode(ControlMode::ALL_OFF),
    ];
    assert_eq!(values.len(), VariableKind::COUNT);
    values
}

#[test]
fn out_of_range_joint_has_no_effect_and_counts_once() {
    let mut h = Harness::new(2);

    for (i, value) in every_kind().into_iter().enumerate() {
        let before = h.counters.total();
        h.write(2, value);

        assert!(h.calls().is_empty(), "{:?} reached the controller", value.kind());
        assert!(h.messages().is_empty(), "{:?} reached the bus", value.kind());
        assert_eq!(h.counters.total(), before + 1, "{:?}", value.kind());
        assert_eq!(
            h.counters.count(DiagnosticFlags::INVALID_JOINT),
            i as u64 + 1
        );
    }
    assert_eq!(h.dispatcher.applied_count(), 0);
}

#[test]
fn far_out_of_range_joint_is_absorbed() {
    let mut h = Harness::new(1);
    h.write(255, NvValue::CmdControlMode(ControlMode::POSITION));
    assert!(h.calls().is_empty());
    assert!(h.messages().is_empty());
    assert_eq!(h.counters.count(DiagnosticFlags::INVALID_JOINT), 1);
}

#[test]
fn in_range_joints_are_untouched_by_a_bad_write() {
    let mut h = Harness::new(2);
    let before = *h.dispatcher.store().config(1).unwrap();
    h.write(2, NvValue::ConfigMinPosition(-5000));
    assert_eq!(*h.dispatcher.store().config(1).unwrap(), before);
    assert_eq!(h.status(1), JointStatus::default());
}
