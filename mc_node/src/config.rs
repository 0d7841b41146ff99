//! Board configuration and replay-script loading.
//!
//! ```toml
//! [shared]
//! service_name = "mc-node-eb5"
//!
//! [board]
//! joint_count = 2
//!
//! [defaults.config]
//! velocity_setpoint_timeout = 100
//!
//! [[joints]]
//! can = { port = "can1", addr = 3, index_in_board = 0 }
//! calibration = { factor = 182.044, offset = 0.0, vel_shift = 4, acc_shift = 4, vel_estim_shift = 4, acc_estim_shift = 4 }
//! ```

use std::collections::HashSet;
use std::path::Path;

use mc_common::canbus::CanLocation;
use mc_common::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
use mc_common::consts::{
    DEFAULT_SOURCE_ADDR, EVENT_QUEUE_CAPACITY_DEFAULT, MAX_CAN_ADDR, MAX_JOINTS,
    OUTBOUND_QUEUE_CAPACITY_DEFAULT,
};
use mc_common::motion::JointId;
use mc_common::motion::config::{JointCalibration, JointDefaults};
use serde::Deserialize;

use crate::dispatch::kind::{NvValue, NvWrite, VariableKind};

// ─── Board Config ───────────────────────────────────────────────────

/// `[board]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardSection {
    pub joint_count: usize,
    #[serde(default = "default_outbound_capacity")]
    pub outbound_queue_capacity: usize,
    #[serde(default = "default_event_capacity")]
    pub event_queue_capacity: usize,
    /// This board's own bus address, used as frame source.
    #[serde(default)]
    pub source_addr: u8,
}

fn default_outbound_capacity() -> usize {
    OUTBOUND_QUEUE_CAPACITY_DEFAULT
}

fn default_event_capacity() -> usize {
    EVENT_QUEUE_CAPACITY_DEFAULT
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            joint_count: 0,
            outbound_queue_capacity: OUTBOUND_QUEUE_CAPACITY_DEFAULT,
            event_queue_capacity: EVENT_QUEUE_CAPACITY_DEFAULT,
            source_addr: DEFAULT_SOURCE_ADDR,
        }
    }
}

/// One `[[joints]]` entry. A joint without `can` has no bus location and
/// cannot change control mode.
#[derive(Debug, Clone, Deserialize)]
pub struct JointEntry {
    #[serde(default)]
    pub can: Option<CanLocation>,
    #[serde(default)]
    pub calibration: JointCalibration,
}

/// Complete board description.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    pub shared: SharedConfig,
    pub board: BoardSection,
    #[serde(default)]
    pub defaults: JointDefaults,
    #[serde(default)]
    pub joints: Vec<JointEntry>,
}

impl BoardConfig {
    pub fn locations(&self) -> Vec<Option<CanLocation>> {
        self.joints.iter().map(|j| j.can).collect()
    }

    pub fn calibrations(&self) -> Vec<JointCalibration> {
        self.joints.iter().map(|j| j.calibration).collect()
    }

    /// Filter directive for the node's logs: `[shared] log_level`, raised to
    /// `debug` when `verbose` asks for more than the file does.
    pub fn log_directive(&self, verbose: bool) -> &'static str {
        match self.shared.log_level {
            LogLevel::Trace => LogLevel::Trace.as_directive(),
            _ if verbose => LogLevel::Debug.as_directive(),
            level => level.as_directive(),
        }
    }

    /// Check bounds, joint count consistency and address uniqueness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let b = &self.board;
        if b.joint_count == 0 || b.joint_count > MAX_JOINTS {
            return Err(invalid(format!(
                "joint_count {} must be in 1..={MAX_JOINTS}",
                b.joint_count
            )));
        }
        if b.joint_count != self.joints.len() {
            return Err(invalid(format!(
                "joint_count is {} but {} [[joints]] entries are given",
                b.joint_count,
                self.joints.len()
            )));
        }
        if b.outbound_queue_capacity == 0 || b.event_queue_capacity == 0 {
            return Err(invalid("queue capacities must be positive".to_string()));
        }
        if b.source_addr > MAX_CAN_ADDR {
            return Err(invalid(format!(
                "source_addr {} exceeds {MAX_CAN_ADDR}",
                b.source_addr
            )));
        }

        let mut seen = HashSet::new();
        for (j, entry) in self.joints.iter().enumerate() {
            if let Some(can) = &entry.can {
                can.validate()
                    .map_err(|e| invalid(format!("joint {j} can: {e}")))?;
                if !seen.insert(*can) {
                    return Err(invalid(format!(
                        "joint {j} shares CAN location {:?}/{}/{} with another joint",
                        can.port, can.addr, can.index_in_board
                    )));
                }
            }
            entry
                .calibration
                .validate()
                .map_err(|e| invalid(format!("joint {j} calibration: {e}")))?;
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

/// Load and validate a board config file.
pub fn load_board_config(path: &Path) -> Result<BoardConfig, ConfigError> {
    let cfg = BoardConfig::load(path)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse and validate a board config from a string.
pub fn load_board_config_from_str(content: &str) -> Result<BoardConfig, ConfigError> {
    let cfg = BoardConfig::load_str(content)?;
    cfg.validate()?;
    Ok(cfg)
}

// ─── Replay Script ──────────────────────────────────────────────────

/// One `[[write]]` entry. `kind` defaults to the value's own kind.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptWrite {
    pub joint: JointId,
    #[serde(default)]
    pub kind: Option<VariableKind>,
    pub value: NvValue,
    #[serde(default)]
    pub timestamp: u64,
}

/// Sequence of NV writes fed to the dispatcher by the board binary.
///
/// ```toml
/// [[write]]
/// joint = 0
/// value = { cmd_control_mode = 1 }
///
/// [[write]]
/// joint = 0
/// value = { cmd_setpoint = { kind = 0, value = 500, flag = false } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayScript {
    #[serde(default, rename = "write")]
    pub writes: Vec<ScriptWrite>,
}

impl ReplayScript {
    /// Writes in file order, numbered from 1.
    pub fn to_writes(&self) -> Vec<NvWrite> {
        self.writes
            .iter()
            .zip(1u32..)
            .map(|(w, seq)| NvWrite {
                kind: w.kind.unwrap_or(w.value.kind()),
                joint: w.joint,
                value: w.value,
                timestamp: w.timestamp,
                sequence: seq,
            })
            .collect()
    }
}

pub fn load_replay_script(path: &Path) -> Result<ReplayScript, ConfigError> {
    ReplayScript::load(path)
}
