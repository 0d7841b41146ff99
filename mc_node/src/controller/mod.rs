//! Port to the per-joint motor controller.
//!
//! The dispatch layer configures the controller through synchronous setters;
//! the PID numerics behind them are not part of this crate. Every setter is a
//! provided method that packs its arguments into a [`ControllerCall`] and
//! forwards it to [`MotorController::apply`], so an implementation only has
//! to handle one entry point.

pub mod recorder;

use mc_common::motion::JointId;
use mc_common::motion::state::ControlMode;

pub use recorder::{ControllerJointState, RecordingController, TracingController};

/// One controller setter invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerCall {
    SetPosPid { joint: JointId, kp: f64, kd: f64, ki: f64 },
    SetTrqPid { joint: JointId, kp: f64, kd: f64, ki: f64 },
    SetPosPidLimits { joint: JointId, output: f64, integral: f64 },
    SetTrqPidLimits { joint: JointId, output: f64, integral: f64 },
    SetOffset { joint: JointId, offset: f64 },
    SetPosMin { joint: JointId, position: f64 },
    SetPosMax { joint: JointId, position: f64 },
    SetVelTimeout { joint: JointId, timeout_ms: u16 },
    SetPosRef { joint: JointId, position: f64, with_velocity: bool },
    SetVelRef { joint: JointId, velocity: f64, with_acceleration: bool },
    SetTrqRef { joint: JointId, torque: f64 },
    Stop { joint: JointId },
    StartCalibration { joint: JointId, position: f64, velocity: f64, offset: f64 },
    SetControlMode { joint: JointId, mode: ControlMode },
}

impl ControllerCall {
    pub const fn joint(&self) -> JointId {
        match *self {
            Self::SetPosPid { joint, .. }
            | Self::SetTrqPid { joint, .. }
            | Self::SetPosPidLimits { joint, .. }
            | Self::SetTrqPidLimits { joint, .. }
            | Self::SetOffset { joint, .. }
            | Self::SetPosMin { joint, .. }
            | Self::SetPosMax { joint, .. }
            | Self::SetVelTimeout { joint, .. }
            | Self::SetPosRef { joint, .. }
            | Self::SetVelRef { joint, .. }
            | Self::SetTrqRef { joint, .. }
            | Self::Stop { joint }
            | Self::StartCalibration { joint, .. }
            | Self::SetControlMode { joint, .. } => joint,
        }
    }
}

/// Synchronous setters on the joint controllers of this board.
///
/// Calls must return quickly: they run inside the dispatch of one NV write.
pub trait MotorController {
    fn apply(&mut self, call: ControllerCall);

    fn set_pos_pid(&mut self, joint: JointId, kp: f64, kd: f64, ki: f64) {
        self.apply(ControllerCall::SetPosPid { joint, kp, kd, ki });
    }

    fn set_trq_pid(&mut self, joint: JointId, kp: f64, kd: f64, ki: f64) {
        self.apply(ControllerCall::SetTrqPid { joint, kp, kd, ki });
    }

    fn set_pos_pid_limits(&mut self, joint: JointId, output: f64, integral: f64) {
        self.apply(ControllerCall::SetPosPidLimits { joint, output, integral });
    }

    fn set_trq_pid_limits(&mut self, joint: JointId, output: f64, integral: f64) {
        self.apply(ControllerCall::SetTrqPidLimits { joint, output, integral });
    }

    fn set_offset(&mut self, joint: JointId, offset: f64) {
        self.apply(ControllerCall::SetOffset { joint, offset });
    }

    fn set_pos_min(&mut self, joint: JointId, position: f64) {
        self.apply(ControllerCall::SetPosMin { joint, position });
    }

    fn set_pos_max(&mut self, joint: JointId, position: f64) {
        self.apply(ControllerCall::SetPosMax { joint, position });
    }

    fn set_vel_timeout(&mut self, joint: JointId, timeout_ms: u16) {
        self.apply(ControllerCall::SetVelTimeout { joint, timeout_ms });
    }

    fn set_pos_ref(&mut self, joint: JointId, position: f64, with_velocity: bool) {
        self.apply(ControllerCall::SetPosRef {
            joint,
            position,
            with_velocity,
        });
    }

    fn set_vel_ref(&mut self, joint: JointId, velocity: f64, with_acceleration: bool) {
        self.apply(ControllerCall::SetVelRef {
            joint,
            velocity,
            with_acceleration,
        });
    }

    fn set_trq_ref(&mut self, joint: JointId, torque: f64) {
        self.apply(ControllerCall::SetTrqRef { joint, torque });
    }

    fn stop(&mut self, joint: JointId) {
        self.apply(ControllerCall::Stop { joint });
    }

    fn start_calibration(&mut self, joint: JointId, position: f64, velocity: f64, offset: f64) {
        self.apply(ControllerCall::StartCalibration {
            joint,
            position,
            velocity,
            offset,
        });
    }

    fn set_control_mode(&mut self, joint: JointId, mode: ControlMode) {
        self.apply(ControllerCall::SetControlMode { joint, mode });
    }
}
