//! Control-mode and motion-monitor enums, and the published status pair.
//!
//! `JointStatus` is the pair that must change together; it packs into a
//! single `u16` so the store can publish it with one atomic store.

use serde::{Deserialize, Serialize};

// ─── Control Mode ───────────────────────────────────────────────────

/// Joint control mode as carried on the wire.
///
/// Open enumeration: every `u8` is a valid mode, the named constants are
/// the ones this board knows how to describe. Any mode may follow any mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlMode(pub u8);

impl ControlMode {
    pub const IDLE: Self = Self(0x00);
    pub const POSITION: Self = Self(0x01);
    pub const VELOCITY: Self = Self(0x02);
    pub const TORQUE: Self = Self(0x03);
    pub const IMPEDANCE_POS: Self = Self(0x04);
    pub const IMPEDANCE_VEL: Self = Self(0x05);
    pub const CURRENT: Self = Self(0x06);
    pub const OPEN_LOOP: Self = Self(0x50);
    /// Switch everything off: outputs disabled, controller idle.
    pub const ALL_OFF: Self = Self(0xF0);

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Human-readable name, `None` for modes this board has no name for.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0x00 => Some("idle"),
            0x01 => Some("position"),
            0x02 => Some("velocity"),
            0x03 => Some("torque"),
            0x04 => Some("impedance_pos"),
            0x05 => Some("impedance_vel"),
            0x06 => Some("current"),
            0x50 => Some("open_loop"),
            0xF0 => Some("all_off"),
            _ => None,
        }
    }
}

impl Default for ControlMode {
    fn default() -> Self {
        Self::IDLE
    }
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "mode(0x{:02X})", self.0),
        }
    }
}

// ─── Motion Monitor ─────────────────────────────────────────────────

/// How setpoint-reached progress is tracked for a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MotionMonitorMode {
    DontMonitor = 0,
    /// Track until the first setpoint is reached.
    Once = 1,
    /// Restart tracking on every new setpoint.
    Forever = 2,
}

impl MotionMonitorMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::DontMonitor),
            1 => Some(Self::Once),
            2 => Some(Self::Forever),
            _ => None,
        }
    }
}

impl Default for MotionMonitorMode {
    fn default() -> Self {
        Self::DontMonitor
    }
}

/// Setpoint-reached progress.
///
/// Only meaningful when the joint's [`MotionMonitorMode`] is not `DontMonitor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MotionMonitorStatus {
    NotMonitored = 0,
    SetpointNotReachedYet = 1,
    SetpointReached = 2,
}

impl MotionMonitorStatus {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NotMonitored),
            1 => Some(Self::SetpointNotReachedYet),
            2 => Some(Self::SetpointReached),
            _ => None,
        }
    }
}

impl Default for MotionMonitorStatus {
    fn default() -> Self {
        Self::NotMonitored
    }
}

// ─── Published Status ───────────────────────────────────────────────

/// Per-joint status mirror: `(control_mode, monitor_status)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointStatus {
    #[serde(default)]
    pub control_mode: ControlMode,
    #[serde(default)]
    pub monitor_status: MotionMonitorStatus,
}

impl JointStatus {
    /// Pack as `mode << 8 | monitor`.
    #[inline]
    pub const fn to_bits(self) -> u16 {
        ((self.control_mode.0 as u16) << 8) | self.monitor_status as u16
    }

    /// Inverse of [`to_bits`](Self::to_bits). An unknown monitor byte reads
    /// back as `NotMonitored`; it can only come from a corrupted word.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        let monitor = match MotionMonitorStatus::from_u8((bits & 0x00FF) as u8) {
            Some(m) => m,
            None => MotionMonitorStatus::NotMonitored,
        };
        Self {
            control_mode: ControlMode((bits >> 8) as u8),
            monitor_status: monitor,
        }
    }
}
