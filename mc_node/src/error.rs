//! Error types for the dispatch core.
//!
//! Every updater returns `Result<(), DispatchError>`. The dispatcher boundary
//! records the error on the diagnostic sink and discards it, so none of these
//! reach the transport. Each variant maps to one [`DiagnosticFlags`] class.

use std::fmt;

use mc_common::config::ConfigError;
use mc_common::consts::MAX_JOINTS;
use mc_common::motion::JointId;
use mc_common::motion::command::UnknownTag;
use mc_common::motion::error::DiagnosticFlags;
use thiserror::Error;

use crate::dispatch::kind::VariableKind;

/// Backing record a lookup can miss. Config and status exist for every
/// joint in range, so only the optional CAN location can be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    CanLocation,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CanLocation => "CAN location",
        })
    }
}

/// Failure inside one update. Absorbed at the dispatch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("joint {joint} out of range (board has {count})")]
    InvalidJointIndex { joint: JointId, count: usize },

    #[error("no {record} record for joint {joint}")]
    RecordNotFound { record: Record, joint: JointId },

    #[error("unrecognized {what} variant {tag}")]
    UnrecognizedVariant { what: &'static str, tag: u8 },

    #[error("measure converter not installed")]
    NullConfigurationContext,

    #[error("{found:?} value written to {expected:?} slot")]
    SlotTypeMismatch {
        expected: VariableKind,
        found: VariableKind,
    },
}

impl DispatchError {
    /// Diagnostic class of this error.
    pub const fn flag(&self) -> DiagnosticFlags {
        match self {
            Self::InvalidJointIndex { .. } => DiagnosticFlags::INVALID_JOINT,
            Self::RecordNotFound { .. } => DiagnosticFlags::RECORD_NOT_FOUND,
            Self::UnrecognizedVariant { .. } => DiagnosticFlags::UNRECOGNIZED_VARIANT,
            Self::NullConfigurationContext => DiagnosticFlags::NULL_CONTEXT,
            Self::SlotTypeMismatch { .. } => DiagnosticFlags::SLOT_TYPE_MISMATCH,
        }
    }
}

impl From<UnknownTag> for DispatchError {
    fn from(e: UnknownTag) -> Self {
        Self::UnrecognizedVariant {
            what: e.what,
            tag: e.tag,
        }
    }
}

/// Unit conversion failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("joint {joint} out of range (converter has {count})")]
    InvalidJoint { joint: JointId, count: usize },

    #[error("{0} calibrations exceed the joint table capacity")]
    TooManyJoints(usize),

    #[error("joint {joint} calibration invalid: {reason}")]
    InvalidCalibration { joint: JointId, reason: String },
}

impl From<ConversionError> for DispatchError {
    fn from(e: ConversionError) -> Self {
        match e {
            ConversionError::InvalidJoint { joint, count } => {
                Self::InvalidJointIndex { joint, count }
            }
            // Construction-time errors never come out of a conversion call.
            ConversionError::TooManyJoints(_) | ConversionError::InvalidCalibration { .. } => {
                Self::NullConfigurationContext
            }
        }
    }
}

/// Outbound transport refusal. Fire-and-forget: the caller logs and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("outbound queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("transport closed")]
    Closed,

    #[error("payload of {len} bytes does not fit one frame")]
    PayloadTooLong { len: usize },
}

/// Failure to bring the dispatch core up from a board description.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BootError {
    #[error("{0} joints exceed the table capacity of {MAX_JOINTS}")]
    TooManyJoints(usize),

    #[error("{calibrations} calibrations for {joints} joints")]
    CalibrationCountMismatch { joints: usize, calibrations: usize },

    #[error("joint {joint} CAN location invalid: {reason}")]
    InvalidLocation { joint: JointId, reason: String },

    #[error("joint {joint} shares its CAN location with joint {first}")]
    DuplicateLocation { joint: JointId, first: JointId },

    #[error(transparent)]
    Calibration(#[from] ConversionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
