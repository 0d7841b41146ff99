//! Initializers and updaters, one pair per [`VariableKind`].
//!
//! Initializers copy the board default template into a fresh slot.
//! Updaters validate everything they need (joint index, converter, variant
//! tags, unit conversions) before the first side effect, so an `Err` means
//! nothing was applied. The one exception is [`update_control_mode`]: the
//! command slot and status mirror take the new mode before the CAN location
//! is looked up, so a joint without a location keeps the mirrored mode even
//! though the update fails with `RecordNotFound`. The written value is
//! stored in the joint's record because each sub-field slot aliases its
//! config field.

use mc_common::motion::JointId;
use mc_common::motion::command::{Calibrator, Setpoint};
use mc_common::motion::config::{JointDefaults, Pid};
use mc_common::motion::state::JointStatus;
use tracing::trace;

use super::kind::{NvValue, VariableKind};
use super::table::{JointSlots, UpdateContext};
use crate::canbus::build_destination;
use crate::error::DispatchError;
use crate::state::control_mode::command_sequence;
use crate::state::monitor::{MonitorEvent, next_status};

/// Extract the payload of the expected variant or fail with a mismatch.
macro_rules! slot {
    ($value:expr, $kind:ident) => {
        match $value {
            NvValue::$kind(v) => *v,
            other => {
                return Err(DispatchError::SlotTypeMismatch {
                    expected: VariableKind::$kind,
                    found: other.kind(),
                });
            }
        }
    };
}

type UpdateResult = Result<(), DispatchError>;

// ─── Initializers ───────────────────────────────────────────────────

pub fn init_config(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.config = defaults.config;
}

pub fn init_pid_position(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.config.pid_position = defaults.config.pid_position;
}

pub fn init_pid_velocity(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.config.pid_velocity = defaults.config.pid_velocity;
}

pub fn init_pid_torque(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.config.pid_torque = defaults.config.pid_torque;
}

pub fn init_impedance(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.config.impedance = defaults.config.impedance;
}

pub fn init_min_position(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.config.min_position = defaults.config.min_position;
}

pub fn init_max_position(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.config.max_position = defaults.config.max_position;
}

pub fn init_velocity_timeout(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.config.velocity_setpoint_timeout = defaults.config.velocity_setpoint_timeout;
}

pub fn init_motion_monitor_mode(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.config.motion_monitor_mode = defaults.config.motion_monitor_mode;
}

pub fn init_status(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    *slots.status = defaults.status;
}

pub fn init_setpoint(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.commands.setpoint = defaults.commands.setpoint;
}

pub fn init_stop_trajectory(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.commands.stop_trajectory = defaults.commands.stop_trajectory;
}

pub fn init_calibration(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.commands.calibration = defaults.commands.calibration;
}

pub fn init_control_mode(defaults: &JointDefaults, slots: &mut JointSlots<'_>) {
    slots.record.commands.control_mode = defaults.commands.control_mode;
}

// ─── PID helpers ────────────────────────────────────────────────────

fn apply_pid_position(ctx: &mut UpdateContext<'_>, joint: JointId, pid: &Pid) {
    let (kp, kd, ki) = pid.rescaled_gains();
    ctx.controller.set_offset(joint, f64::from(pid.offset));
    ctx.controller.set_pos_pid_limits(
        joint,
        f64::from(pid.limit_on_output),
        f64::from(pid.limit_on_integral),
    );
    ctx.controller.set_pos_pid(joint, kp, kd, ki);
}

fn apply_pid_torque(ctx: &mut UpdateContext<'_>, joint: JointId, pid: &Pid) {
    let (kp, kd, ki) = pid.rescaled_gains();
    ctx.controller.set_offset(joint, f64::from(pid.offset));
    ctx.controller.set_trq_pid_limits(
        joint,
        f64::from(pid.limit_on_output),
        f64::from(pid.limit_on_integral),
    );
    ctx.controller.set_trq_pid(joint, kp, kd, ki);
}

// ─── Configuration updaters ─────────────────────────────────────────

/// Whole-config write: position PID, torque PID, limits, velocity timeout.
/// Velocity PID and impedance are stored but not applied.
pub fn update_config(ctx: &mut UpdateContext<'_>, joint: JointId, value: &NvValue) -> UpdateResult {
    let cfg = slot!(value, Config);
    ctx.store.record(joint)?;
    let conv = ctx.converter()?;
    let min = conv.position_to_internal(joint, cfg.min_position)?;
    let max = conv.position_to_internal(joint, cfg.max_position)?;

    *ctx.store.config_mut(joint)? = cfg;

    apply_pid_position(ctx, joint, &cfg.pid_position);
    apply_pid_torque(ctx, joint, &cfg.pid_torque);
    trace!(joint, "velocity PID not applied");
    ctx.controller.set_pos_min(joint, min);
    ctx.controller.set_pos_max(joint, max);
    ctx.controller.set_vel_timeout(joint, cfg.velocity_setpoint_timeout);
    trace!(joint, "impedance not applied");
    Ok(())
}

pub fn update_pid_position(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let pid = slot!(value, ConfigPidPosition);
    ctx.store.config_mut(joint)?.pid_position = pid;
    apply_pid_position(ctx, joint, &pid);
    Ok(())
}

pub fn update_pid_velocity(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let pid = slot!(value, ConfigPidVelocity);
    ctx.store.config_mut(joint)?.pid_velocity = pid;
    trace!(joint, "velocity PID not applied");
    Ok(())
}

pub fn update_pid_torque(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let pid = slot!(value, ConfigPidTorque);
    ctx.store.config_mut(joint)?.pid_torque = pid;
    apply_pid_torque(ctx, joint, &pid);
    Ok(())
}

pub fn update_impedance(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let impedance = slot!(value, ConfigImpedance);
    ctx.store.config_mut(joint)?.impedance = impedance;
    trace!(joint, "impedance not applied");
    Ok(())
}

pub fn update_min_position(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let wire = slot!(value, ConfigMinPosition);
    ctx.store.record(joint)?;
    let position = ctx.converter()?.position_to_internal(joint, wire)?;
    ctx.store.config_mut(joint)?.min_position = wire;
    ctx.controller.set_pos_min(joint, position);
    Ok(())
}

pub fn update_max_position(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let wire = slot!(value, ConfigMaxPosition);
    ctx.store.record(joint)?;
    let position = ctx.converter()?.position_to_internal(joint, wire)?;
    ctx.store.config_mut(joint)?.max_position = wire;
    ctx.controller.set_pos_max(joint, position);
    Ok(())
}

pub fn update_velocity_timeout(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let timeout = slot!(value, ConfigVelocityTimeout);
    ctx.store.config_mut(joint)?.velocity_setpoint_timeout = timeout;
    ctx.controller.set_vel_timeout(joint, timeout);
    Ok(())
}

/// A fresh monitor mode always restarts progress tracking.
pub fn update_motion_monitor_mode(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let mode = slot!(value, ConfigMotionMonitorMode);
    ctx.store.config_mut(joint)?.motion_monitor_mode = mode;
    ctx.store.update_status(joint, |s| JointStatus {
        monitor_status: next_status(s.monitor_status, MonitorEvent::ModeChanged(mode)),
        ..s
    })?;
    Ok(())
}

/// The status slot mirrors board state; host writes are accepted and ignored.
pub fn update_status(ctx: &mut UpdateContext<'_>, joint: JointId, value: &NvValue) -> UpdateResult {
    let _ = slot!(value, Status);
    ctx.store.record(joint)?;
    trace!(joint, "status is board-owned, write ignored");
    Ok(())
}

// ─── Command updaters ───────────────────────────────────────────────

pub fn update_setpoint(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let wire = slot!(value, CmdSetpoint);
    let monitor_mode = ctx.store.config(joint)?.motion_monitor_mode;
    let setpoint = Setpoint::try_from(wire)?;

    // Resolve units before touching anything.
    let reference = match setpoint {
        Setpoint::Position {
            value,
            with_velocity,
        } => Reference::Position(
            ctx.converter()?.position_to_internal(joint, value)?,
            with_velocity,
        ),
        Setpoint::Velocity {
            value,
            with_acceleration,
        } => Reference::Velocity(
            ctx.converter()?.velocity_to_internal(joint, value)?,
            with_acceleration,
        ),
        Setpoint::Torque { value } => Reference::Torque(f64::from(value)),
        Setpoint::Current { value } => Reference::Current(f64::from(value)),
    };

    ctx.store.commands_mut(joint)?.setpoint = wire;
    ctx.store.update_status(joint, |s| JointStatus {
        monitor_status: next_status(s.monitor_status, MonitorEvent::NewSetpoint(monitor_mode)),
        ..s
    })?;

    match reference {
        Reference::Position(position, with_velocity) => {
            ctx.controller.set_pos_ref(joint, position, with_velocity)
        }
        Reference::Velocity(velocity, with_acceleration) => {
            ctx.controller.set_vel_ref(joint, velocity, with_acceleration)
        }
        Reference::Torque(torque) => ctx.controller.set_trq_ref(joint, torque),
        Reference::Current(current) => ctx.controller.set_offset(joint, current),
    }
    Ok(())
}

/// Setpoint in controller units.
enum Reference {
    Position(f64, bool),
    Velocity(f64, bool),
    Torque(f64),
    Current(f64),
}

pub fn update_stop_trajectory(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let stop = slot!(value, CmdStopTrajectory);
    ctx.store.commands_mut(joint)?.stop_trajectory = stop;
    ctx.controller.stop(joint);
    Ok(())
}

pub fn update_calibration(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let wire = slot!(value, CmdCalibration);
    ctx.store.record(joint)?;
    let Calibrator::Type3 {
        position,
        velocity,
        offset,
    } = Calibrator::try_from(wire)?;
    let conv = ctx.converter()?;
    let position = conv.position_to_internal(joint, position)?;
    let velocity = conv.velocity_to_internal(joint, velocity)?;

    ctx.store.commands_mut(joint)?.calibration = wire;
    ctx.controller
        .start_calibration(joint, position, velocity, f64::from(offset));
    Ok(())
}

/// Mirror the mode into status, tell the joint's board over the bus, then
/// switch the local controller.
pub fn update_control_mode(
    ctx: &mut UpdateContext<'_>,
    joint: JointId,
    value: &NvValue,
) -> UpdateResult {
    let mode = slot!(value, CmdControlMode);

    ctx.store.commands_mut(joint)?.control_mode = mode;
    ctx.store.update_status(joint, |s| JointStatus {
        control_mode: mode,
        ..s
    })?;

    let location = ctx.store.can_location(joint)?;
    let destination = build_destination(location.index_in_board, location.addr);

    for step in command_sequence(mode) {
        match step.payload {
            Some(byte) => ctx.send_command(
                joint,
                location.port,
                destination,
                step.command,
                Some(&[byte]),
            ),
            None => ctx.send_command(joint, location.port, destination, step.command, None),
        }
    }

    ctx.controller.set_control_mode(joint, mode);
    Ok(())
}
