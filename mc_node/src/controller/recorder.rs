//! Controller implementations that keep the last value of every setter.
//!
//! [`RecordingController`] also logs each call, in order, for tests.
//! [`TracingController`] emits each call at `debug!` and is what the board
//! binary drives when no motor hardware is attached.

use mc_common::motion::JointId;
use mc_common::motion::state::ControlMode;
use tracing::debug;

use super::{ControllerCall, MotorController};

/// Last value applied by each setter for one joint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerJointState {
    pub pos_pid: Option<(f64, f64, f64)>,
    pub trq_pid: Option<(f64, f64, f64)>,
    pub pos_pid_limits: Option<(f64, f64)>,
    pub trq_pid_limits: Option<(f64, f64)>,
    pub offset: Option<f64>,
    pub pos_min: Option<f64>,
    pub pos_max: Option<f64>,
    pub vel_timeout_ms: Option<u16>,
    pub pos_ref: Option<(f64, bool)>,
    pub vel_ref: Option<(f64, bool)>,
    pub trq_ref: Option<f64>,
    pub stop_requests: u32,
    pub calibration: Option<(f64, f64, f64)>,
    pub control_mode: Option<ControlMode>,
}

impl ControllerJointState {
    fn apply(&mut self, call: &ControllerCall) {
        match *call {
            ControllerCall::SetPosPid { kp, kd, ki, .. } => self.pos_pid = Some((kp, kd, ki)),
            ControllerCall::SetTrqPid { kp, kd, ki, .. } => self.trq_pid = Some((kp, kd, ki)),
            ControllerCall::SetPosPidLimits {
                output, integral, ..
            } => self.pos_pid_limits = Some((output, integral)),
            ControllerCall::SetTrqPidLimits {
                output, integral, ..
            } => self.trq_pid_limits = Some((output, integral)),
            ControllerCall::SetOffset { offset, .. } => self.offset = Some(offset),
            ControllerCall::SetPosMin { position, .. } => self.pos_min = Some(position),
            ControllerCall::SetPosMax { position, .. } => self.pos_max = Some(position),
            ControllerCall::SetVelTimeout { timeout_ms, .. } => {
                self.vel_timeout_ms = Some(timeout_ms)
            }
            ControllerCall::SetPosRef {
                position,
                with_velocity,
                ..
            } => self.pos_ref = Some((position, with_velocity)),
            ControllerCall::SetVelRef {
                velocity,
                with_acceleration,
                ..
            } => self.vel_ref = Some((velocity, with_acceleration)),
            ControllerCall::SetTrqRef { torque, .. } => self.trq_ref = Some(torque),
            ControllerCall::Stop { .. } => self.stop_requests += 1,
            ControllerCall::StartCalibration {
                position,
                velocity,
                offset,
                ..
            } => self.calibration = Some((position, velocity, offset)),
            ControllerCall::SetControlMode { mode, .. } => self.control_mode = Some(mode),
        }
    }
}

/// Per-joint state table shared by both implementations.
#[derive(Debug, Clone, Default)]
struct JointStates(Vec<ControllerJointState>);

impl JointStates {
    fn new(joint_count: usize) -> Self {
        Self(vec![ControllerJointState::default(); joint_count])
    }

    fn apply(&mut self, call: &ControllerCall) {
        // Calls for joints the controller does not host are dropped.
        if let Some(state) = self.0.get_mut(call.joint() as usize) {
            state.apply(call);
        }
    }
}

/// Records every call in order and tracks the resulting state.
#[derive(Debug, Clone, Default)]
pub struct RecordingController {
    calls: Vec<ControllerCall>,
    states: JointStates,
}

impl RecordingController {
    pub fn new(joint_count: usize) -> Self {
        Self {
            calls: Vec::new(),
            states: JointStates::new(joint_count),
        }
    }

    pub fn calls(&self) -> &[ControllerCall] {
        &self.calls
    }

    /// Return and clear the call log; state is kept.
    pub fn take_calls(&mut self) -> Vec<ControllerCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn state(&self, joint: JointId) -> Option<&ControllerJointState> {
        self.states.0.get(joint as usize)
    }
}

impl MotorController for RecordingController {
    fn apply(&mut self, call: ControllerCall) {
        self.states.apply(&call);
        self.calls.push(call);
    }
}

/// Logs each call and tracks the resulting state.
#[derive(Debug, Clone, Default)]
pub struct TracingController {
    states: JointStates,
}

impl TracingController {
    pub fn new(joint_count: usize) -> Self {
        Self {
            states: JointStates::new(joint_count),
        }
    }

    pub fn state(&self, joint: JointId) -> Option<&ControllerJointState> {
        self.states.0.get(joint as usize)
    }
}

impl MotorController for TracingController {
    fn apply(&mut self, call: ControllerCall) {
        debug!(joint = call.joint(), ?call, "controller");
        self.states.apply(&call);
    }
}
