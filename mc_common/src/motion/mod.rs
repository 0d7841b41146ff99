//! Joint data model shared by the dispatch core and its readers.
//!
//! Organized by concern: state enums and the published status pair,
//! configuration records (PID, impedance, limits, calibration), command
//! slots (setpoint, calibrator, control mode) and diagnostic flags.

pub mod command;
pub mod config;
pub mod error;
pub mod state;

/// Joint identifier: zero-based index into the board's joint table.
pub type JointId = u8;
