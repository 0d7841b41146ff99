//! Joint configuration records and the per-board default template.
//!
//! Field shapes follow the wire contract: gains are fixed-point `i16` with a
//! power-of-two `scale`, positions are wire-unit `i32`, timeouts are `u16` ms.
//! Optional TOML fields fall back to the builtin template values.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SHIFT;

use super::command::JointCommands;
use super::state::{JointStatus, MotionMonitorMode};

/// Default velocity-setpoint timeout [ms].
pub const VELOCITY_TIMEOUT_DEFAULT_MS: u16 = 100;

// ─── PID ────────────────────────────────────────────────────────────

/// Fixed-point PID record.
///
/// Effective gains are `k * 2^-scale`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pid {
    pub kp: i16,
    pub ki: i16,
    pub kd: i16,
    pub limit_on_integral: i16,
    pub limit_on_output: i16,
    pub scale: u8,
    pub offset: i16,
}

impl Pid {
    /// `2^-scale`, applied to kp/kd/ki.
    #[inline]
    pub fn rescaler(&self) -> f64 {
        (-(self.scale as f64)).exp2()
    }

    /// `(kp, kd, ki)` after rescaling, in the order controllers take them.
    #[inline]
    pub fn rescaled_gains(&self) -> (f64, f64, f64) {
        let r = self.rescaler();
        (self.kp as f64 * r, self.kd as f64 * r, self.ki as f64 * r)
    }
}

/// Impedance parameters. Accepted and stored; not yet applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Impedance {
    pub stiffness: i32,
    pub damping: i32,
    pub offset: i16,
}

// ─── Joint Config ───────────────────────────────────────────────────

/// Whole joint configuration slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointConfig {
    pub pid_position: Pid,
    /// Part of the wire contract; not applied to the controller.
    pub pid_velocity: Pid,
    pub pid_torque: Pid,
    pub impedance: Impedance,
    /// Lower position limit, wire units.
    pub min_position: i32,
    /// Upper position limit, wire units.
    pub max_position: i32,
    /// Velocity setpoint timeout [ms].
    pub velocity_setpoint_timeout: u16,
    pub motion_monitor_mode: MotionMonitorMode,
}

impl Default for JointConfig {
    fn default() -> Self {
        Self {
            pid_position: Pid::default(),
            pid_velocity: Pid::default(),
            pid_torque: Pid::default(),
            impedance: Impedance::default(),
            min_position: 0,
            max_position: 0,
            velocity_setpoint_timeout: VELOCITY_TIMEOUT_DEFAULT_MS,
            motion_monitor_mode: MotionMonitorMode::DontMonitor,
        }
    }
}

// ─── Calibration ────────────────────────────────────────────────────

/// Per-joint encoder calibration used by unit conversion.
///
/// `factor` is encoder ticks per internal unit. Shifts are the power-of-two
/// divisors the peer boards use: `vel_estim_shift`/`acc_estim_shift` on
/// measurements coming in, `vel_shift`/`acc_shift` on references going out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointCalibration {
    pub factor: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub vel_shift: u8,
    #[serde(default)]
    pub acc_shift: u8,
    #[serde(default)]
    pub vel_estim_shift: u8,
    #[serde(default)]
    pub acc_estim_shift: u8,
}

impl JointCalibration {
    /// Unity calibration: factor 1, no offset, no shifts.
    pub const IDENTITY: Self = Self {
        factor: 1.0,
        offset: 0.0,
        vel_shift: 0,
        acc_shift: 0,
        vel_estim_shift: 0,
        acc_estim_shift: 0,
    };

    pub fn validate(&self) -> Result<(), String> {
        if !self.factor.is_finite() || self.factor == 0.0 {
            return Err(format!("factor {} must be finite and non-zero", self.factor));
        }
        if !self.offset.is_finite() {
            return Err(format!("offset {} must be finite", self.offset));
        }
        let shifts = [
            ("vel_shift", self.vel_shift),
            ("acc_shift", self.acc_shift),
            ("vel_estim_shift", self.vel_estim_shift),
            ("acc_estim_shift", self.acc_estim_shift),
        ];
        for (name, v) in shifts {
            if v > MAX_SHIFT {
                return Err(format!("{name} {v} exceeds {MAX_SHIFT}"));
            }
        }
        Ok(())
    }
}

impl Default for JointCalibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ─── Board Default Template ─────────────────────────────────────────

/// Per-board default values every joint slot is initialized from at boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointDefaults {
    pub config: JointConfig,
    pub status: JointStatus,
    pub commands: JointCommands,
}
