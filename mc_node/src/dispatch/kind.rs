//! Variable kinds and the values written to them.

use std::fmt;

use mc_common::motion::JointId;
use mc_common::motion::command::{WireCalibrator, WireSetpoint};
use mc_common::motion::config::{Impedance, JointConfig, Pid};
use mc_common::motion::state::{ControlMode, JointStatus, MotionMonitorMode};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

/// Network variable kinds of one joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum VariableKind {
    Config = 0,
    ConfigPidPosition = 1,
    ConfigPidVelocity = 2,
    ConfigPidTorque = 3,
    ConfigImpedance = 4,
    ConfigMinPosition = 5,
    ConfigMaxPosition = 6,
    ConfigVelocityTimeout = 7,
    ConfigMotionMonitorMode = 8,
    Status = 9,
    CmdSetpoint = 10,
    CmdStopTrajectory = 11,
    CmdCalibration = 12,
    CmdControlMode = 13,
}

impl VariableKind {
    pub const COUNT: usize = 14;

    /// All kinds in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Config,
        Self::ConfigPidPosition,
        Self::ConfigPidVelocity,
        Self::ConfigPidTorque,
        Self::ConfigImpedance,
        Self::ConfigMinPosition,
        Self::ConfigMaxPosition,
        Self::ConfigVelocityTimeout,
        Self::ConfigMotionMonitorMode,
        Self::Status,
        Self::CmdSetpoint,
        Self::CmdStopTrajectory,
        Self::CmdCalibration,
        Self::CmdControlMode,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        if (value as usize) < Self::COUNT {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }

    /// Wire name of the variable.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Config => "jconfig",
            Self::ConfigPidPosition => "jconfig.pidposition",
            Self::ConfigPidVelocity => "jconfig.pidvelocity",
            Self::ConfigPidTorque => "jconfig.pidtorque",
            Self::ConfigImpedance => "jconfig.impedance",
            Self::ConfigMinPosition => "jconfig.minpositionofjoint",
            Self::ConfigMaxPosition => "jconfig.maxpositionofjoint",
            Self::ConfigVelocityTimeout => "jconfig.velocitysetpointtimeout",
            Self::ConfigMotionMonitorMode => "jconfig.motionmonitormode",
            Self::Status => "jstatus",
            Self::CmdSetpoint => "jcmmnds.setpoint",
            Self::CmdStopTrajectory => "jcmmnds.stoptrajectory",
            Self::CmdCalibration => "jcmmnds.calibration",
            Self::CmdControlMode => "jcmmnds.controlmode",
        }
    }
}

const_assert_eq!(VariableKind::COUNT, VariableKind::CmdControlMode as usize + 1);

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value carried by a write. One variant per kind, same name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NvValue {
    Config(JointConfig),
    ConfigPidPosition(Pid),
    ConfigPidVelocity(Pid),
    ConfigPidTorque(Pid),
    ConfigImpedance(Impedance),
    ConfigMinPosition(i32),
    ConfigMaxPosition(i32),
    ConfigVelocityTimeout(u16),
    ConfigMotionMonitorMode(MotionMonitorMode),
    Status(JointStatus),
    CmdSetpoint(WireSetpoint),
    CmdStopTrajectory(bool),
    CmdCalibration(WireCalibrator),
    CmdControlMode(ControlMode),
}

impl NvValue {
    /// The kind whose slot holds this value.
    pub const fn kind(&self) -> VariableKind {
        match self {
            Self::Config(_) => VariableKind::Config,
            Self::ConfigPidPosition(_) => VariableKind::ConfigPidPosition,
            Self::ConfigPidVelocity(_) => VariableKind::ConfigPidVelocity,
            Self::ConfigPidTorque(_) => VariableKind::ConfigPidTorque,
            Self::ConfigImpedance(_) => VariableKind::ConfigImpedance,
            Self::ConfigMinPosition(_) => VariableKind::ConfigMinPosition,
            Self::ConfigMaxPosition(_) => VariableKind::ConfigMaxPosition,
            Self::ConfigVelocityTimeout(_) => VariableKind::ConfigVelocityTimeout,
            Self::ConfigMotionMonitorMode(_) => VariableKind::ConfigMotionMonitorMode,
            Self::Status(_) => VariableKind::Status,
            Self::CmdSetpoint(_) => VariableKind::CmdSetpoint,
            Self::CmdStopTrajectory(_) => VariableKind::CmdStopTrajectory,
            Self::CmdCalibration(_) => VariableKind::CmdCalibration,
            Self::CmdControlMode(_) => VariableKind::CmdControlMode,
        }
    }
}

/// One inbound write as delivered by the NV layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NvWrite {
    pub kind: VariableKind,
    pub joint: JointId,
    pub value: NvValue,
    /// Absolute time of reception, microseconds.
    pub timestamp: u64,
    pub sequence: u32,
}

impl NvWrite {
    /// Write whose kind follows from its value.
    pub const fn new(joint: JointId, value: NvValue) -> Self {
        Self {
            kind: value.kind(),
            joint,
            value,
            timestamp: 0,
            sequence: 0,
        }
    }

    pub const fn with_sequence(mut self, timestamp: u64, sequence: u32) -> Self {
        self.timestamp = timestamp;
        self.sequence = sequence;
        self
    }
}
