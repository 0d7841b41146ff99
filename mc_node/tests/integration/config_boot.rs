//! Integration test: boot from the shipped board file and replay the
//! shipped script through the event task.

use std::path::Path;

use mc_common::prelude::*;
use mc_node::canbus::queue::OutboundQueue;
use mc_node::config::{BoardConfig, load_board_config, load_replay_script};
use mc_node::controller::{ControllerCall, RecordingController};
use mc_node::diagnostics::DiagnosticCounters;
use mc_node::dispatch::Dispatcher;
use mc_node::runtime::task::EventTask;

const BOARD: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/board.toml");
const REPLAY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/replay.toml");

fn board() -> BoardConfig {
    load_board_config(Path::new(BOARD)).unwrap()
}

#[test]
fn shipped_board_boots_with_defaults() {
    let board = board();
    let (tx, frames) = OutboundQueue::bounded(board.board.outbound_queue_capacity);
    let d = Dispatcher::boot(
        &board,
        RecordingController::new(board.joints.len()),
        tx,
        DiagnosticCounters::new(),
    )
    .unwrap();

    assert_eq!(d.store().joint_count(), 2);
    for j in 0..2 {
        let status = d.store().status(j).unwrap();
        assert_eq!(status.control_mode, ControlMode::ALL_OFF);
        assert_eq!(status.monitor_status, MotionMonitorStatus::NotMonitored);
        assert_eq!(d.store().commands(j).unwrap().control_mode, ControlMode::ALL_OFF);
        assert_eq!(d.store().config(j).unwrap().pid_position.kp, 32);
    }
    // Boot only fills slots; nothing goes to the controller or the bus.
    assert!(d.controller().calls().is_empty());
    assert!(frames.drain().is_empty());

    // Position round trip stays within one wire unit.
    let conv = d.converter().unwrap();
    let internal = conv.position_to_internal(0, 9102).unwrap();
    assert!((internal - 50.0).abs() < 0.01);
    let wire = conv.position_to_wire(0, internal).unwrap();
    assert!((wire - 9102).abs() <= 1);
}

#[test]
fn replay_script_through_event_task() {
    let board = board();
    let script = load_replay_script(Path::new(REPLAY)).unwrap();
    let writes = script.to_writes();
    assert_eq!(writes.len(), 8);

    let (tx, frames) = OutboundQueue::bounded(board.board.outbound_queue_capacity);
    let counters = DiagnosticCounters::new();
    let d = Dispatcher::boot(
        &board,
        RecordingController::new(board.joints.len()),
        tx,
        counters.clone(),
    )
    .unwrap();

    let task = EventTask::spawn(d, board.board.event_queue_capacity, None).unwrap();
    let sender = task.sender();
    for w in writes {
        sender.submit_blocking(w).unwrap();
    }
    drop(sender);
    let d = task.join().unwrap();

    assert_eq!(d.applied_count(), 7);
    assert_eq!(counters.total(), 1);
    assert_eq!(counters.count(DiagnosticFlags::INVALID_JOINT), 1);

    let sent: Vec<_> = frames
        .drain()
        .into_iter()
        .map(|(port, msg)| {
            assert_eq!(port, CanPort::Can1);
            assert_eq!(msg.destination, MsgDestination(0x03));
            (msg.command, msg.payload.to_vec())
        })
        .collect();
    let expected: Vec<(MotorCommand, Vec<u8>)> = vec![
        (MotorCommand::EnablePwmPad, vec![]),
        (MotorCommand::ControllerIdle, vec![]),
        (MotorCommand::SetControlMode, vec![0x01]),
        (MotorCommand::ControllerRun, vec![]),
        (MotorCommand::DisablePwmPad, vec![]),
        (MotorCommand::ControllerIdle, vec![]),
    ];
    assert_eq!(sent, expected);

    let calls = d.controller().calls();
    assert!(calls.contains(&ControllerCall::Stop { joint: 1 }));
    assert_eq!(
        calls.last(),
        Some(&ControllerCall::SetControlMode {
            joint: 0,
            mode: ControlMode::ALL_OFF
        })
    );
    let pos_ref = d.controller().state(0).unwrap().pos_ref.unwrap();
    assert!((pos_ref.0 - 50.0).abs() < 0.01);
    assert!(pos_ref.1);

    let status = d.store().status(0).unwrap();
    assert_eq!(status.control_mode, ControlMode::ALL_OFF);
    assert_eq!(
        status.monitor_status,
        MotionMonitorStatus::SetpointNotReachedYet
    );
}
