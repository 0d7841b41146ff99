//! Static initializer/updater table.

use mc_common::canbus::{CanPort, CommandClass, MotorCommand, MsgDestination};
use mc_common::motion::JointId;
use mc_common::motion::config::JointDefaults;
use mc_common::motion::state::JointStatus;

use super::kind::{NvValue, VariableKind};
use super::updaters;
use crate::canbus::{self, CanServicePort};
use crate::controller::MotorController;
use crate::diagnostics::{DiagnosticSink, DispatchFailure, FailureCause};
use crate::error::DispatchError;
use crate::store::{JointRecord, JointStore};
use crate::units::MeasureConverter;

/// Slots of one joint as seen by the initializers at boot.
pub struct JointSlots<'a> {
    pub record: &'a mut JointRecord,
    pub status: &'a mut JointStatus,
}

/// Everything an updater may touch while handling one write.
pub struct UpdateContext<'a> {
    pub store: &'a mut JointStore,
    pub controller: &'a mut dyn MotorController,
    pub transport: &'a mut dyn CanServicePort,
    pub converter: Option<&'a MeasureConverter>,
    pub sink: &'a dyn DiagnosticSink,
    pub kind: VariableKind,
    pub timestamp: u64,
    pub sequence: u32,
}

impl UpdateContext<'_> {
    pub fn converter(&self) -> Result<&MeasureConverter, DispatchError> {
        self.converter.ok_or(DispatchError::NullConfigurationContext)
    }

    /// Send one polling motor-control command. A refusal is reported to the
    /// sink and otherwise ignored.
    pub fn send_command(
        &mut self,
        joint: JointId,
        port: CanPort,
        destination: MsgDestination,
        command: MotorCommand,
        payload: Option<&[u8]>,
    ) {
        let sent = canbus::send_command(
            &mut *self.transport,
            port,
            destination,
            CommandClass::PollingMotorControl,
            command,
            payload,
        );
        if let Err(e) = sent {
            self.sink.record(&DispatchFailure {
                kind: self.kind,
                joint,
                timestamp: self.timestamp,
                sequence: self.sequence,
                cause: FailureCause::Transport(e),
            });
        }
    }
}

pub type InitFn = fn(&JointDefaults, &mut JointSlots<'_>);
pub type UpdateFn = fn(&mut UpdateContext<'_>, JointId, &NvValue) -> Result<(), DispatchError>;

/// Initializer and updater of one variable kind.
#[derive(Clone, Copy)]
pub struct NvHandler {
    pub kind: VariableKind,
    pub init: InitFn,
    pub update: UpdateFn,
}

impl std::fmt::Debug for NvHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NvHandler").field("kind", &self.kind).finish()
    }
}

const fn entry(kind: VariableKind, init: InitFn, update: UpdateFn) -> NvHandler {
    NvHandler { kind, init, update }
}

/// One handler per kind, indexed by `VariableKind as usize`.
pub static DISPATCH_TABLE: [NvHandler; VariableKind::COUNT] = [
    entry(VariableKind::Config, updaters::init_config, updaters::update_config),
    entry(
        VariableKind::ConfigPidPosition,
        updaters::init_pid_position,
        updaters::update_pid_position,
    ),
    entry(
        VariableKind::ConfigPidVelocity,
        updaters::init_pid_velocity,
        updaters::update_pid_velocity,
    ),
    entry(
        VariableKind::ConfigPidTorque,
        updaters::init_pid_torque,
        updaters::update_pid_torque,
    ),
    entry(
        VariableKind::ConfigImpedance,
        updaters::init_impedance,
        updaters::update_impedance,
    ),
    entry(
        VariableKind::ConfigMinPosition,
        updaters::init_min_position,
        updaters::update_min_position,
    ),
    entry(
        VariableKind::ConfigMaxPosition,
        updaters::init_max_position,
        updaters::update_max_position,
    ),
    entry(
        VariableKind::ConfigVelocityTimeout,
        updaters::init_velocity_timeout,
        updaters::update_velocity_timeout,
    ),
    entry(
        VariableKind::ConfigMotionMonitorMode,
        updaters::init_motion_monitor_mode,
        updaters::update_motion_monitor_mode,
    ),
    entry(VariableKind::Status, updaters::init_status, updaters::update_status),
    entry(
        VariableKind::CmdSetpoint,
        updaters::init_setpoint,
        updaters::update_setpoint,
    ),
    entry(
        VariableKind::CmdStopTrajectory,
        updaters::init_stop_trajectory,
        updaters::update_stop_trajectory,
    ),
    entry(
        VariableKind::CmdCalibration,
        updaters::init_calibration,
        updaters::update_calibration,
    ),
    entry(
        VariableKind::CmdControlMode,
        updaters::init_control_mode,
        updaters::update_control_mode,
    ),
];

#[inline]
pub fn handler(kind: VariableKind) -> &'static NvHandler {
    &DISPATCH_TABLE[kind.index()]
}
