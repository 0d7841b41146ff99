//! Integration test: control-mode changes emit two ordered bus commands
//! and switch the local controller last.

use mc_common::canbus::{CanPort, CommandClass, MotorCommand, MsgDestination};
use mc_common::motion::JointId;
use mc_common::motion::config::JointDefaults;
use mc_common::motion::error::DiagnosticFlags;
use mc_common::motion::state::ControlMode;
use mc_node::canbus::build_destination;
use mc_node::controller::ControllerCall;
use mc_node::dispatch::NvValue;

use super::common::{Harness, location};

fn destination(joint: JointId) -> MsgDestination {
    let loc = location(joint);
    build_destination(loc.index_in_board, loc.addr)
}

/// `(command, payload)` pairs of the queued messages, after checking each
/// went to `joint`'s board on CAN1 as a polling motor-control command.
fn sent_to(h: &Harness, joint: JointId) -> Vec<(MotorCommand, Vec<u8>)> {
    h.messages()
        .into_iter()
        .map(|(port, msg)| {
            assert_eq!(port, CanPort::Can1);
            assert_eq!(msg.destination, destination(joint));
            assert_eq!(msg.class, CommandClass::PollingMotorControl);
            (msg.command, msg.payload.to_vec())
        })
        .collect()
}

#[test]
fn all_off_disables_outputs_then_idles() {
    let mut h = Harness::new(2);
    h.write(1, NvValue::CmdControlMode(ControlMode::ALL_OFF));

    assert_eq!(
        sent_to(&h, 1),
        vec![
            (MotorCommand::DisablePwmPad, vec![]),
            (MotorCommand::ControllerIdle, vec![]),
        ]
    );
    assert_eq!(
        h.calls(),
        vec![ControllerCall::SetControlMode {
            joint: 1,
            mode: ControlMode::ALL_OFF
        }]
    );
    assert_eq!(h.status(1).control_mode, ControlMode::ALL_OFF);
}

#[test]
fn idle_enables_outputs_then_idles() {
    let mut h = Harness::new(2);
    h.write(0, NvValue::CmdControlMode(ControlMode::IDLE));

    assert_eq!(
        sent_to(&h, 0),
        vec![
            (MotorCommand::EnablePwmPad, vec![]),
            (MotorCommand::ControllerIdle, vec![]),
        ]
    );
    assert_eq!(h.status(0).control_mode, ControlMode::IDLE);
}

#[test]
fn other_modes_send_the_mode_then_run() {
    let mut h = Harness::new(4);
    for mode in [
        ControlMode::POSITION,
        ControlMode::VELOCITY,
        ControlMode::TORQUE,
        ControlMode::IMPEDANCE_POS,
        ControlMode::CURRENT,
        ControlMode::OPEN_LOOP,
        ControlMode(0x42),
    ] {
        h.write(3, NvValue::CmdControlMode(mode));
        assert_eq!(
            sent_to(&h, 3),
            vec![
                (MotorCommand::SetControlMode, vec![mode.as_u8()]),
                (MotorCommand::ControllerRun, vec![]),
            ],
            "{mode}"
        );
        assert_eq!(h.status(3).control_mode, mode);
        assert_eq!(
            h.dispatcher.controller().state(3).unwrap().control_mode,
            Some(mode)
        );
    }
}

#[test]
fn destination_tracks_index_in_board() {
    let mut h = Harness::new(4);
    h.write(3, NvValue::CmdControlMode(ControlMode::IDLE));
    let msgs = h.messages();
    assert_eq!(msgs.len(), 2);
    // Joint 3: board address 2, second axis.
    assert_eq!(msgs[0].1.destination, MsgDestination(0x12));
    assert_eq!(msgs[0].1.to_frame(0).id, 0x002);
    assert_eq!(msgs[0].1.to_frame(0).bytes(), &[0x80 | 5]);
}

#[test]
fn any_mode_may_follow_any_mode() {
    let mut h = Harness::new(1);
    let sequence = [
        ControlMode::ALL_OFF,
        ControlMode::POSITION,
        ControlMode::ALL_OFF,
        ControlMode::IDLE,
        ControlMode::IDLE,
        ControlMode::TORQUE,
    ];
    for mode in sequence {
        h.write(0, NvValue::CmdControlMode(mode));
    }
    assert_eq!(h.messages().len(), 2 * sequence.len());
    assert_eq!(h.calls().len(), sequence.len());
    assert_eq!(h.counters.total(), 0);
}

#[test]
fn missing_location_mirrors_status_but_sends_nothing() {
    let mut h = Harness::with_locations(
        JointDefaults::default(),
        &[Some(location(0)), None],
        true,
        8,
    );
    h.write(1, NvValue::CmdControlMode(ControlMode::POSITION));

    assert!(h.messages().is_empty());
    assert!(h.calls().is_empty());
    // The failed update still left the mode in the command slot and mirror.
    assert_eq!(h.status(1).control_mode, ControlMode::POSITION);
    assert_eq!(
        h.dispatcher.store().commands(1).unwrap().control_mode,
        ControlMode::POSITION
    );
    assert_eq!(h.counters.count(DiagnosticFlags::RECORD_NOT_FOUND), 1);
    assert_eq!(h.dispatcher.applied_count(), 0);
}

#[test]
fn refused_message_is_counted_and_the_update_goes_on() {
    let mut h = Harness::build(JointDefaults::default(), 1, true, 1);
    h.write(0, NvValue::CmdControlMode(ControlMode::ALL_OFF));

    let msgs = h.messages();
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].1.command, MotorCommand::DisablePwmPad);
    assert_eq!(h.counters.count(DiagnosticFlags::TX_REJECTED), 1);
    assert_eq!(h.counters.total(), 1);
    // Transport refusals do not abort the update.
    assert_eq!(h.dispatcher.applied_count(), 1);
    assert_eq!(
        h.calls(),
        vec![ControllerCall::SetControlMode {
            joint: 0,
            mode: ControlMode::ALL_OFF
        }]
    );
}
