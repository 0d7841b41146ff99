//! Integration test: configuration writes set state, they never accumulate.

use mc_common::motion::config::{Impedance, JointConfig, Pid};
use mc_common::motion::state::MotionMonitorMode;
use mc_node::controller::ControllerCall;
use mc_node::dispatch::NvValue;

use super::common::Harness;

fn config() -> JointConfig {
    JointConfig {
        pid_position: Pid {
            kp: 64,
            ki: 16,
            kd: 32,
            limit_on_integral: 100,
            limit_on_output: 200,
            scale: 4,
            offset: 5,
        },
        pid_velocity: Pid {
            kp: 7,
            ..Pid::default()
        },
        pid_torque: Pid {
            kp: 12,
            ki: 3,
            kd: 0,
            limit_on_integral: 40,
            limit_on_output: 80,
            scale: 2,
            offset: -1,
        },
        impedance: Impedance {
            stiffness: 10,
            damping: 2,
            offset: 0,
        },
        min_position: -1000,
        max_position: 2000,
        velocity_setpoint_timeout: 150,
        motion_monitor_mode: MotionMonitorMode::Once,
    }
}

#[test]
fn whole_config_applies_in_order() {
    let mut h = Harness::new(1);
    h.write(0, NvValue::Config(config()));

    assert_eq!(
        h.calls(),
        vec![
            ControllerCall::SetOffset { joint: 0, offset: 5.0 },
            ControllerCall::SetPosPidLimits {
                joint: 0,
                output: 200.0,
                integral: 100.0
            },
            ControllerCall::SetPosPid {
                joint: 0,
                kp: 4.0,
                kd: 2.0,
                ki: 1.0
            },
            ControllerCall::SetOffset { joint: 0, offset: -1.0 },
            ControllerCall::SetTrqPidLimits {
                joint: 0,
                output: 80.0,
                integral: 40.0
            },
            ControllerCall::SetTrqPid {
                joint: 0,
                kp: 3.0,
                kd: 0.0,
                ki: 0.75
            },
            ControllerCall::SetPosMin {
                joint: 0,
                position: -10.0
            },
            ControllerCall::SetPosMax {
                joint: 0,
                position: 20.0
            },
            ControllerCall::SetVelTimeout {
                joint: 0,
                timeout_ms: 150
            },
        ]
    );
    assert!(h.messages().is_empty());
    assert_eq!(*h.dispatcher.store().config(0).unwrap(), config());
}

#[test]
fn whole_config_twice_equals_once() {
    let mut once = Harness::new(2);
    once.write(1, NvValue::Config(config()));

    let mut twice = Harness::new(2);
    twice.write(1, NvValue::Config(config()));
    let first = twice.calls();
    twice.write(1, NvValue::Config(config()));
    let second = twice.calls();

    assert_eq!(first, second);
    assert_eq!(
        once.dispatcher.controller().state(1),
        twice.dispatcher.controller().state(1)
    );
    assert_eq!(
        once.dispatcher.store().config(1).unwrap(),
        twice.dispatcher.store().config(1).unwrap()
    );
    assert_eq!(once.status(1), twice.status(1));
}

#[test]
fn sub_field_writes_touch_only_their_aspect() {
    let mut h = Harness::new(1);
    let pid = config().pid_position;

    h.write(0, NvValue::ConfigPidPosition(pid));
    h.write(0, NvValue::ConfigPidPosition(pid));
    let state = *h.dispatcher.controller().state(0).unwrap();
    assert_eq!(state.pos_pid, Some((4.0, 2.0, 1.0)));
    assert_eq!(state.pos_pid_limits, Some((200.0, 100.0)));
    assert_eq!(state.trq_pid, None);
    assert_eq!(state.pos_min, None);

    h.calls();
    h.write(0, NvValue::ConfigMaxPosition(-300));
    assert_eq!(
        h.calls(),
        vec![ControllerCall::SetPosMax {
            joint: 0,
            position: -3.0
        }]
    );
    assert_eq!(h.dispatcher.store().config(0).unwrap().max_position, -300);
}

#[test]
fn placeholders_are_stored_but_not_applied() {
    let mut h = Harness::new(1);
    let velocity_pid = Pid {
        kp: 99,
        ..Pid::default()
    };
    let impedance = Impedance {
        stiffness: 5,
        damping: 6,
        offset: 7,
    };
    h.write(0, NvValue::ConfigPidVelocity(velocity_pid));
    h.write(0, NvValue::ConfigImpedance(impedance));

    assert!(h.calls().is_empty());
    let cfg = h.dispatcher.store().config(0).unwrap();
    assert_eq!(cfg.pid_velocity, velocity_pid);
    assert_eq!(cfg.impedance, impedance);
    assert_eq!(h.dispatcher.applied_count(), 2);
}
