//! Integration test: motion-monitor mode writes reset progress tracking.

use mc_common::motion::JointId;
use mc_common::motion::state::{MotionMonitorMode, MotionMonitorStatus};
use mc_node::dispatch::NvValue;

use super::common::Harness;

const JOINTS: usize = 4;

/// Drive `joint` into `status` through the public surface.
fn prime(h: &mut Harness, joint: JointId, status: MotionMonitorStatus) {
    let reader = h.dispatcher.status_reader();
    match status {
        MotionMonitorStatus::NotMonitored => {
            h.write(joint, NvValue::ConfigMotionMonitorMode(MotionMonitorMode::DontMonitor))
        }
        MotionMonitorStatus::SetpointNotReachedYet => {
            h.write(joint, NvValue::ConfigMotionMonitorMode(MotionMonitorMode::Once))
        }
        MotionMonitorStatus::SetpointReached => {
            h.write(joint, NvValue::ConfigMotionMonitorMode(MotionMonitorMode::Once));
            assert!(reader.report_setpoint_reached(joint));
        }
    }
    assert_eq!(h.status(joint).monitor_status, status);
}

#[test]
fn monitoring_mode_always_restarts_tracking() {
    let priors = [
        MotionMonitorStatus::NotMonitored,
        MotionMonitorStatus::SetpointNotReachedYet,
        MotionMonitorStatus::SetpointReached,
    ];
    for mode in [MotionMonitorMode::Once, MotionMonitorMode::Forever] {
        for prior in priors {
            let mut h = Harness::new(JOINTS);
            for joint in 0..JOINTS as JointId {
                prime(&mut h, joint, prior);
                h.write(joint, NvValue::ConfigMotionMonitorMode(mode));
                assert_eq!(
                    h.status(joint).monitor_status,
                    MotionMonitorStatus::SetpointNotReachedYet,
                    "joint {joint} from {prior:?} with {mode:?}"
                );
                assert_eq!(
                    h.dispatcher.store().config(joint).unwrap().motion_monitor_mode,
                    mode
                );
            }
            assert!(h.calls().is_empty());
            assert!(h.messages().is_empty());
        }
    }
}

#[test]
fn dont_monitor_clears_tracking() {
    let mut h = Harness::new(1);
    prime(&mut h, 0, MotionMonitorStatus::SetpointReached);
    h.write(0, NvValue::ConfigMotionMonitorMode(MotionMonitorMode::DontMonitor));
    assert_eq!(h.status(0).monitor_status, MotionMonitorStatus::NotMonitored);
}

#[test]
fn monitor_write_keeps_control_mode() {
    use mc_common::motion::state::ControlMode;

    let mut h = Harness::new(1);
    h.write(0, NvValue::CmdControlMode(ControlMode::VELOCITY));
    h.write(0, NvValue::ConfigMotionMonitorMode(MotionMonitorMode::Forever));
    let status = h.status(0);
    assert_eq!(status.control_mode, ControlMode::VELOCITY);
    assert_eq!(
        status.monitor_status,
        MotionMonitorStatus::SetpointNotReachedYet
    );
}
