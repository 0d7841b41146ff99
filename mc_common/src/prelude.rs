//! Prelude module for common re-exports.
//!
//! ```rust
//! use mc_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::MAX_JOINTS;

// ─── Joint Model ────────────────────────────────────────────────────
pub use crate::motion::JointId;
pub use crate::motion::command::{Calibrator, JointCommands, Setpoint, WireCalibrator, WireSetpoint};
pub use crate::motion::config::{Impedance, JointCalibration, JointConfig, JointDefaults, Pid};
pub use crate::motion::error::DiagnosticFlags;
pub use crate::motion::state::{ControlMode, JointStatus, MotionMonitorMode, MotionMonitorStatus};

// ─── Bus Addressing ─────────────────────────────────────────────────
pub use crate::canbus::{CanLocation, CanPort, CommandClass, MotorCommand, MsgDestination};
