//! Integration test: setpoint dispatch and the monitor-forever re-arm.

use mc_common::motion::command::{
    CALIBRATOR_TYPE3, SETPOINT_CURRENT, SETPOINT_POSITION, SETPOINT_TORQUE, SETPOINT_VELOCITY,
    WireCalibrator, WireSetpoint,
};
use mc_common::motion::config::JointDefaults;
use mc_common::motion::error::DiagnosticFlags;
use mc_common::motion::state::{MotionMonitorMode, MotionMonitorStatus};
use mc_node::canbus::queue::OutboundQueue;
use mc_node::controller::{ControllerCall, MotorController};
use mc_node::diagnostics::DiagnosticCounters;
use mc_node::dispatch::{Dispatcher, NvValue, NvWrite};
use mc_node::store::StatusReader;
use mc_node::units::MeasureConverter;

use super::common::{Harness, calibration, location};

fn position(value: i32) -> NvValue {
    NvValue::CmdSetpoint(WireSetpoint {
        kind: SETPOINT_POSITION,
        value,
        flag: false,
    })
}

/// Records the monitor status visible at the moment each position
/// reference reaches the controller.
#[derive(Default)]
struct ReachingController {
    reader: Option<StatusReader>,
    seen: Vec<(f64, MotionMonitorStatus)>,
}

impl MotorController for ReachingController {
    fn apply(&mut self, call: ControllerCall) {
        if let ControllerCall::SetPosRef {
            joint, position, ..
        } = call
        {
            let status = self
                .reader
                .as_ref()
                .and_then(|r| r.snapshot(joint))
                .map(|s| s.monitor_status)
                .unwrap_or(MotionMonitorStatus::NotMonitored);
            self.seen.push((position, status));
        }
    }
}

#[test]
fn new_setpoint_under_forever_rearms_before_the_reference() {
    let (tx, _frames) = OutboundQueue::bounded(8);
    let mut d = Dispatcher::from_parts(
        JointDefaults::default(),
        &[Some(location(0))],
        Some(MeasureConverter::new(&[calibration()]).unwrap()),
        ReachingController::default(),
        tx,
        DiagnosticCounters::new(),
    )
    .unwrap();
    let reader = d.status_reader();
    d.controller_mut().reader = Some(reader.clone());

    d.apply(NvWrite::new(
        0,
        NvValue::ConfigMotionMonitorMode(MotionMonitorMode::Forever),
    ));
    assert!(reader.report_setpoint_reached(0));
    assert_eq!(
        reader.snapshot(0).unwrap().monitor_status,
        MotionMonitorStatus::SetpointReached
    );

    d.apply(NvWrite::new(0, position(300)));

    assert_eq!(
        d.controller().seen,
        vec![(3.0, MotionMonitorStatus::SetpointNotReachedYet)]
    );
    assert_eq!(
        reader.snapshot(0).unwrap().monitor_status,
        MotionMonitorStatus::SetpointNotReachedYet
    );
}

#[test]
fn monitor_once_keeps_reached() {
    let mut h = Harness::new(1);
    h.write(0, NvValue::ConfigMotionMonitorMode(MotionMonitorMode::Once));
    assert!(h.dispatcher.status_reader().report_setpoint_reached(0));

    h.write(0, position(100));
    assert_eq!(
        h.status(0).monitor_status,
        MotionMonitorStatus::SetpointReached
    );
}

#[test]
fn forever_while_not_reached_stays_not_reached() {
    let mut h = Harness::new(1);
    h.write(0, NvValue::ConfigMotionMonitorMode(MotionMonitorMode::Forever));
    h.write(0, position(100));
    assert_eq!(
        h.status(0).monitor_status,
        MotionMonitorStatus::SetpointNotReachedYet
    );
}

#[test]
fn each_variant_reaches_its_setter() {
    let mut h = Harness::new(1);

    h.write(
        0,
        NvValue::CmdSetpoint(WireSetpoint {
            kind: SETPOINT_VELOCITY,
            value: 160,
            flag: true,
        }),
    );
    h.write(
        0,
        NvValue::CmdSetpoint(WireSetpoint {
            kind: SETPOINT_TORQUE,
            value: -42,
            flag: false,
        }),
    );
    h.write(
        0,
        NvValue::CmdSetpoint(WireSetpoint {
            kind: SETPOINT_CURRENT,
            value: 17,
            flag: false,
        }),
    );

    assert_eq!(
        h.calls(),
        vec![
            // (160 * 1000) >> 4 = 10000, / 100
            ControllerCall::SetVelRef {
                joint: 0,
                velocity: 100.0,
                with_acceleration: true
            },
            ControllerCall::SetTrqRef {
                joint: 0,
                torque: -42.0
            },
            ControllerCall::SetOffset {
                joint: 0,
                offset: 17.0
            },
        ]
    );
    assert!(h.messages().is_empty());
}

#[test]
fn unknown_variant_has_no_effect() {
    let mut h = Harness::new(1);
    h.write(0, NvValue::ConfigMotionMonitorMode(MotionMonitorMode::Forever));
    assert!(h.dispatcher.status_reader().report_setpoint_reached(0));
    let before = h.dispatcher.store().commands(0).unwrap().setpoint;

    h.write(
        0,
        NvValue::CmdSetpoint(WireSetpoint {
            kind: 9,
            value: 1,
            flag: false,
        }),
    );

    assert!(h.calls().is_empty());
    assert_eq!(h.counters.count(DiagnosticFlags::UNRECOGNIZED_VARIANT), 1);
    assert_eq!(h.dispatcher.store().commands(0).unwrap().setpoint, before);
    // No partial effect: the re-arm did not happen either.
    assert_eq!(
        h.status(0).monitor_status,
        MotionMonitorStatus::SetpointReached
    );
}

#[test]
fn missing_converter_blocks_positions_only() {
    let mut h = Harness::build(JointDefaults::default(), 1, false, 8);

    h.write(0, position(100));
    assert!(h.calls().is_empty());
    assert_eq!(h.counters.count(DiagnosticFlags::NULL_CONTEXT), 1);

    h.write(
        0,
        NvValue::CmdSetpoint(WireSetpoint {
            kind: SETPOINT_TORQUE,
            value: 3,
            flag: false,
        }),
    );
    assert_eq!(
        h.calls(),
        vec![ControllerCall::SetTrqRef {
            joint: 0,
            torque: 3.0
        }]
    );
}

#[test]
fn stop_and_calibration_commands() {
    let mut h = Harness::new(2);
    h.write(1, NvValue::CmdStopTrajectory(true));
    h.write(
        1,
        NvValue::CmdCalibration(WireCalibrator {
            kind: CALIBRATOR_TYPE3,
            params: [1000, 160, 7],
        }),
    );
    h.write(
        1,
        NvValue::CmdCalibration(WireCalibrator {
            kind: 1,
            params: [0, 0, 0],
        }),
    );

    assert_eq!(
        h.calls(),
        vec![
            ControllerCall::Stop { joint: 1 },
            ControllerCall::StartCalibration {
                joint: 1,
                position: 10.0,
                velocity: 100.0,
                offset: 7.0
            },
        ]
    );
    assert_eq!(h.counters.count(DiagnosticFlags::UNRECOGNIZED_VARIANT), 1);
    assert!(h.messages().is_empty());
    assert_eq!(
        h.dispatcher.store().commands(1).unwrap().calibration.params,
        [1000, 160, 7]
    );
}

#[test]
fn status_slot_writes_are_ignored() {
    use mc_common::motion::state::{ControlMode, JointStatus};

    let mut h = Harness::new(1);
    h.write(
        0,
        NvValue::Status(JointStatus {
            control_mode: ControlMode::TORQUE,
            monitor_status: MotionMonitorStatus::SetpointReached,
        }),
    );
    assert_eq!(h.status(0), JointStatus::default());
    assert_eq!(h.counters.total(), 0);
}
