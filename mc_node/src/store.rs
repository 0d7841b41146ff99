//! Per-joint records owned by the dispatch layer.
//!
//! Configuration, command slots and CAN location live in [`JointRecord`]s
//! that only the dispatcher mutates. The `(control_mode, monitor_status)`
//! pair lives apart in a [`StatusBoard`] so telemetry threads can read it
//! while updates run: each joint's pair is one `AtomicU16`, which a reader
//! observes either before or after an update, never half way.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use heapless::Vec;
use mc_common::canbus::CanLocation;
use mc_common::consts::MAX_JOINTS;
use mc_common::motion::JointId;
use mc_common::motion::command::JointCommands;
use mc_common::motion::config::JointConfig;
use mc_common::motion::state::JointStatus;

use crate::error::{BootError, DispatchError, Record};
use crate::state::monitor::{MonitorEvent, next_status};

/// Everything the board keeps for one joint except the published status.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointRecord {
    pub config: JointConfig,
    pub commands: JointCommands,
    pub location: Option<CanLocation>,
}

// ─── Status Board ───────────────────────────────────────────────────

/// Packed status words, one per joint.
#[derive(Debug)]
pub struct StatusBoard {
    cells: [AtomicU16; MAX_JOINTS],
    joint_count: usize,
}

impl StatusBoard {
    fn new(joint_count: usize) -> Self {
        Self {
            cells: std::array::from_fn(|_| AtomicU16::new(JointStatus::default().to_bits())),
            joint_count,
        }
    }

    #[inline]
    fn cell(&self, joint: JointId) -> Option<&AtomicU16> {
        if (joint as usize) < self.joint_count {
            self.cells.get(joint as usize)
        } else {
            None
        }
    }

    fn load(&self, joint: JointId) -> Option<JointStatus> {
        self.cell(joint)
            .map(|c| JointStatus::from_bits(c.load(Ordering::Acquire)))
    }

    fn store(&self, joint: JointId, status: JointStatus) -> bool {
        match self.cell(joint) {
            Some(c) => {
                c.store(status.to_bits(), Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Read-modify-write of one word. Retries if the progress reporter
    /// raced in between.
    fn modify(&self, joint: JointId, f: impl Fn(JointStatus) -> JointStatus) -> Option<JointStatus> {
        let cell = self.cell(joint)?;
        let prev = cell
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some(f(JointStatus::from_bits(bits)).to_bits())
            })
            .unwrap_or_else(|bits| bits);
        Some(f(JointStatus::from_bits(prev)))
    }
}

/// Cloneable read handle on the status board.
///
/// Handed to telemetry and to the controller's progress reporter; the only
/// write it allows is [`report_setpoint_reached`](Self::report_setpoint_reached).
#[derive(Debug, Clone)]
pub struct StatusReader {
    board: Arc<StatusBoard>,
}

impl StatusReader {
    pub fn joint_count(&self) -> usize {
        self.board.joint_count
    }

    /// Consistent `(control_mode, monitor_status)` snapshot of one joint.
    pub fn snapshot(&self, joint: JointId) -> Option<JointStatus> {
        self.board.load(joint)
    }

    /// Mark the current setpoint as reached.
    ///
    /// Only moves `SetpointNotReachedYet` to `SetpointReached`; returns
    /// whether the word changed.
    pub fn report_setpoint_reached(&self, joint: JointId) -> bool {
        let Some(cell) = self.board.cell(joint) else {
            return false;
        };
        cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
            let current = JointStatus::from_bits(bits);
            let next = next_status(current.monitor_status, MonitorEvent::SetpointReached);
            (next != current.monitor_status).then_some(
                JointStatus {
                    monitor_status: next,
                    ..current
                }
                .to_bits(),
            )
        })
        .is_ok()
    }
}

// ─── Joint Store ────────────────────────────────────────────────────

/// Index-stable arena of joint records plus the shared status board.
#[derive(Debug)]
pub struct JointStore {
    records: Vec<JointRecord, MAX_JOINTS>,
    status: Arc<StatusBoard>,
}

impl JointStore {
    /// One default record per location, in joint order.
    ///
    /// Every location must be in bus range and belong to one joint only;
    /// the destination byte cannot represent anything else.
    pub fn new(locations: &[Option<CanLocation>]) -> Result<Self, BootError> {
        if locations.len() > MAX_JOINTS {
            return Err(BootError::TooManyJoints(locations.len()));
        }
        let mut records: Vec<JointRecord, MAX_JOINTS> = Vec::new();
        for (i, location) in locations.iter().enumerate() {
            let joint = i as JointId;
            if let Some(loc) = location {
                loc.validate()
                    .map_err(|reason| BootError::InvalidLocation { joint, reason })?;
                if let Some(first) = records.iter().position(|r| r.location == Some(*loc)) {
                    return Err(BootError::DuplicateLocation {
                        joint,
                        first: first as JointId,
                    });
                }
            }
            // Length checked above.
            let _ = records.push(JointRecord {
                location: *location,
                ..JointRecord::default()
            });
        }
        Ok(Self {
            status: Arc::new(StatusBoard::new(records.len())),
            records,
        })
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.records.len()
    }

    pub fn status_reader(&self) -> StatusReader {
        StatusReader {
            board: Arc::clone(&self.status),
        }
    }

    #[inline]
    fn invalid(&self, joint: JointId) -> DispatchError {
        DispatchError::InvalidJointIndex {
            joint,
            count: self.records.len(),
        }
    }

    pub fn record(&self, joint: JointId) -> Result<&JointRecord, DispatchError> {
        self.records
            .get(joint as usize)
            .ok_or_else(|| self.invalid(joint))
    }

    /// Run `f` over every joint's record and a fresh status word, then
    /// publish the resulting status. Boot only.
    pub(crate) fn initialize(&mut self, mut f: impl FnMut(&mut JointRecord, &mut JointStatus)) {
        for (i, record) in self.records.iter_mut().enumerate() {
            let mut status = JointStatus::default();
            f(record, &mut status);
            self.status.store(i as JointId, status);
        }
    }

    pub(crate) fn record_mut(&mut self, joint: JointId) -> Result<&mut JointRecord, DispatchError> {
        let count = self.records.len();
        self.records
            .get_mut(joint as usize)
            .ok_or(DispatchError::InvalidJointIndex { joint, count })
    }

    pub fn config(&self, joint: JointId) -> Result<&JointConfig, DispatchError> {
        self.record(joint).map(|r| &r.config)
    }

    pub(crate) fn config_mut(&mut self, joint: JointId) -> Result<&mut JointConfig, DispatchError> {
        self.record_mut(joint).map(|r| &mut r.config)
    }

    pub fn commands(&self, joint: JointId) -> Result<&JointCommands, DispatchError> {
        self.record(joint).map(|r| &r.commands)
    }

    pub(crate) fn commands_mut(
        &mut self,
        joint: JointId,
    ) -> Result<&mut JointCommands, DispatchError> {
        self.record_mut(joint).map(|r| &mut r.commands)
    }

    /// Snapshot of the published status.
    pub fn status(&self, joint: JointId) -> Result<JointStatus, DispatchError> {
        self.status.load(joint).ok_or_else(|| self.invalid(joint))
    }

    /// Apply `f` to the status word as one atomic step; returns the new value.
    pub(crate) fn update_status(
        &self,
        joint: JointId,
        f: impl Fn(JointStatus) -> JointStatus,
    ) -> Result<JointStatus, DispatchError> {
        self.status.modify(joint, f).ok_or_else(|| self.invalid(joint))
    }

    pub fn can_location(&self, joint: JointId) -> Result<CanLocation, DispatchError> {
        self.record(joint)?
            .location
            .ok_or(DispatchError::RecordNotFound {
                record: Record::CanLocation,
                joint,
            })
    }
}
