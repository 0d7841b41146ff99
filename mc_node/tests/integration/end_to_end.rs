//! Integration test: a position setpoint travels from wire units to the
//! controller without touching the bus.

use mc_common::motion::command::{SETPOINT_POSITION, WireSetpoint};
use mc_node::controller::ControllerCall;
use mc_node::dispatch::NvValue;

use super::common::Harness;

#[test]
fn position_setpoint_reaches_controller_in_internal_units() {
    let mut h = Harness::new(3);

    h.write(
        2,
        NvValue::CmdSetpoint(WireSetpoint {
            kind: SETPOINT_POSITION,
            value: 500,
            flag: false,
        }),
    );

    assert_eq!(
        h.calls(),
        vec![ControllerCall::SetPosRef {
            joint: 2,
            position: 5.0,
            with_velocity: false,
        }]
    );
    assert!(h.messages().is_empty(), "setpoints emit no bus traffic");
    assert_eq!(h.counters.total(), 0);
    assert_eq!(h.dispatcher.applied_count(), 1);
}

#[test]
fn setpoint_is_kept_in_the_command_slot() {
    let mut h = Harness::new(3);
    let wire = WireSetpoint {
        kind: SETPOINT_POSITION,
        value: -250,
        flag: true,
    };
    h.write(1, NvValue::CmdSetpoint(wire));

    assert_eq!(h.dispatcher.store().commands(1).unwrap().setpoint, wire);
    assert_eq!(
        h.dispatcher.controller().state(1).unwrap().pos_ref,
        Some((-2.5, true))
    );
}
