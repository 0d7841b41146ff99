//! Bus commands emitted for a control-mode change.
//!
//! Any mode may follow any mode. Each change sends exactly two polling
//! commands to the joint, in this order:
//!
//! | mode      | first                    | second           |
//! |-----------|--------------------------|------------------|
//! | all-off   | `DisablePwmPad`          | `ControllerIdle` |
//! | idle      | `EnablePwmPad`           | `ControllerIdle` |
//! | any other | `SetControlMode(mode)`   | `ControllerRun`  |
//!
//! Outputs are disabled before the controller is told to go idle.

use mc_common::canbus::MotorCommand;
use mc_common::motion::state::ControlMode;

/// One command of the sequence with its optional one-byte payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeCommand {
    pub command: MotorCommand,
    pub payload: Option<u8>,
}

impl ModeCommand {
    const fn bare(command: MotorCommand) -> Self {
        Self {
            command,
            payload: None,
        }
    }
}

/// The two commands a change to `mode` emits, in send order.
pub const fn command_sequence(mode: ControlMode) -> [ModeCommand; 2] {
    match mode {
        ControlMode::ALL_OFF => [
            ModeCommand::bare(MotorCommand::DisablePwmPad),
            ModeCommand::bare(MotorCommand::ControllerIdle),
        ],
        ControlMode::IDLE => [
            ModeCommand::bare(MotorCommand::EnablePwmPad),
            ModeCommand::bare(MotorCommand::ControllerIdle),
        ],
        other => [
            ModeCommand {
                command: MotorCommand::SetControlMode,
                payload: Some(other.as_u8()),
            },
            ModeCommand::bare(MotorCommand::ControllerRun),
        ],
    }
}
