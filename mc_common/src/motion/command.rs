//! Command slots: setpoint, calibrator, stop and control mode.
//!
//! Slots hold the wire shape (`kind` tag + payload). The typed views
//! ([`Setpoint`], [`Calibrator`]) are obtained with `TryFrom`, which is where
//! an unknown tag is rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::ControlMode;

/// A wire tag that names no known variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {what} tag {tag}")]
pub struct UnknownTag {
    pub what: &'static str,
    pub tag: u8,
}

// ─── Setpoint ───────────────────────────────────────────────────────

pub const SETPOINT_POSITION: u8 = 0;
pub const SETPOINT_VELOCITY: u8 = 1;
pub const SETPOINT_TORQUE: u8 = 2;
pub const SETPOINT_CURRENT: u8 = 3;

/// Setpoint slot as written by the host.
///
/// `flag` is `with_velocity` for position and `with_acceleration` for
/// velocity; ignored otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSetpoint {
    pub kind: u8,
    pub value: i32,
    #[serde(default)]
    pub flag: bool,
}

/// Decoded setpoint. Exactly one variant per write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setpoint {
    Position { value: i32, with_velocity: bool },
    Velocity { value: i32, with_acceleration: bool },
    Torque { value: i32 },
    Current { value: i32 },
}

impl TryFrom<WireSetpoint> for Setpoint {
    type Error = UnknownTag;

    fn try_from(w: WireSetpoint) -> Result<Self, Self::Error> {
        match w.kind {
            SETPOINT_POSITION => Ok(Self::Position {
                value: w.value,
                with_velocity: w.flag,
            }),
            SETPOINT_VELOCITY => Ok(Self::Velocity {
                value: w.value,
                with_acceleration: w.flag,
            }),
            SETPOINT_TORQUE => Ok(Self::Torque { value: w.value }),
            SETPOINT_CURRENT => Ok(Self::Current { value: w.value }),
            tag => Err(UnknownTag {
                what: "setpoint",
                tag,
            }),
        }
    }
}

impl From<Setpoint> for WireSetpoint {
    fn from(sp: Setpoint) -> Self {
        match sp {
            Setpoint::Position {
                value,
                with_velocity,
            } => Self {
                kind: SETPOINT_POSITION,
                value,
                flag: with_velocity,
            },
            Setpoint::Velocity {
                value,
                with_acceleration,
            } => Self {
                kind: SETPOINT_VELOCITY,
                value,
                flag: with_acceleration,
            },
            Setpoint::Torque { value } => Self {
                kind: SETPOINT_TORQUE,
                value,
                flag: false,
            },
            Setpoint::Current { value } => Self {
                kind: SETPOINT_CURRENT,
                value,
                flag: false,
            },
        }
    }
}

// ─── Calibrator ─────────────────────────────────────────────────────

/// The only calibrator type the dispatch core handles.
pub const CALIBRATOR_TYPE3: u8 = 3;

/// Calibrator slot as written by the host: type tag and three parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCalibrator {
    pub kind: u8,
    pub params: [i32; 3],
}

/// Decoded calibrator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calibrator {
    /// Move to `position` at `velocity`, then apply encoder `offset`.
    Type3 {
        position: i32,
        velocity: i32,
        offset: i32,
    },
}

impl TryFrom<WireCalibrator> for Calibrator {
    type Error = UnknownTag;

    fn try_from(w: WireCalibrator) -> Result<Self, Self::Error> {
        match w.kind {
            CALIBRATOR_TYPE3 => Ok(Self::Type3 {
                position: w.params[0],
                velocity: w.params[1],
                offset: w.params[2],
            }),
            tag => Err(UnknownTag {
                what: "calibrator",
                tag,
            }),
        }
    }
}

// ─── Command Slots ──────────────────────────────────────────────────

/// Per-joint command slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointCommands {
    pub setpoint: WireSetpoint,
    pub stop_trajectory: bool,
    pub calibration: WireCalibrator,
    pub control_mode: ControlMode,
}
