//! Boot and write boundary of the dispatch core.

use std::sync::Arc;

use mc_common::canbus::CanLocation;
use mc_common::motion::config::JointDefaults;
use tracing::{debug, info};

use super::kind::NvWrite;
use super::table::{DISPATCH_TABLE, JointSlots, UpdateContext, handler};
use crate::canbus::CanServicePort;
use crate::config::BoardConfig;
use crate::controller::MotorController;
use crate::diagnostics::{DiagnosticSink, DispatchFailure, FailureCause};
use crate::error::{BootError, DispatchError};
use crate::store::{JointStore, StatusReader};
use crate::units::MeasureConverter;

/// Owns the joint store and routes every NV write to its updater.
pub struct Dispatcher<C: MotorController, T: CanServicePort> {
    store: JointStore,
    converter: Option<MeasureConverter>,
    controller: C,
    transport: T,
    sink: Arc<dyn DiagnosticSink>,
    defaults: JointDefaults,
    applied: u64,
}

impl<C: MotorController, T: CanServicePort> Dispatcher<C, T> {
    /// Boot from a board description. The description is validated first,
    /// so a hand-built or unvalidated `BoardConfig` is rejected the same way
    /// `load_board_config` would reject it.
    pub fn boot(
        board: &BoardConfig,
        controller: C,
        transport: T,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, BootError> {
        board.validate()?;
        let converter = MeasureConverter::new(&board.calibrations())?;
        Self::from_parts(
            board.defaults,
            &board.locations(),
            Some(converter),
            controller,
            transport,
            sink,
        )
    }

    /// Boot from loose parts. Without a converter every update that needs
    /// unit conversion fails with `NullConfigurationContext`. Locations are
    /// checked by [`JointStore::new`].
    pub fn from_parts(
        defaults: JointDefaults,
        locations: &[Option<CanLocation>],
        converter: Option<MeasureConverter>,
        controller: C,
        transport: T,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, BootError> {
        if let Some(conv) = &converter
            && conv.joint_count() != locations.len()
        {
            return Err(BootError::CalibrationCountMismatch {
                joints: locations.len(),
                calibrations: conv.joint_count(),
            });
        }
        let mut store = JointStore::new(locations)?;
        store.initialize(|record, status| {
            let mut slots = JointSlots { record, status };
            for h in DISPATCH_TABLE.iter() {
                (h.init)(&defaults, &mut slots);
            }
        });
        info!(
            joints = store.joint_count(),
            converter = converter.is_some(),
            "dispatch table initialized"
        );
        Ok(Self {
            store,
            converter,
            controller,
            transport,
            sink,
            defaults,
            applied: 0,
        })
    }

    /// Apply one write. Failures are recorded on the sink and dropped; only
    /// successful writes count towards [`applied_count`](Self::applied_count).
    pub fn apply(&mut self, write: NvWrite) {
        match self.try_apply(&write) {
            Ok(()) => {
                self.applied += 1;
                debug!(
                    kind = %write.kind,
                    joint = write.joint,
                    seq = write.sequence,
                    "update applied"
                );
            }
            Err(e) => self.sink.record(&DispatchFailure {
                kind: write.kind,
                joint: write.joint,
                timestamp: write.timestamp,
                sequence: write.sequence,
                cause: FailureCause::Dispatch(e),
            }),
        }
    }

    /// Run the updater and return its result instead of absorbing it.
    pub fn try_apply(&mut self, write: &NvWrite) -> Result<(), DispatchError> {
        let found = write.value.kind();
        if found != write.kind {
            return Err(DispatchError::SlotTypeMismatch {
                expected: write.kind,
                found,
            });
        }
        let mut ctx = UpdateContext {
            store: &mut self.store,
            controller: &mut self.controller,
            transport: &mut self.transport,
            converter: self.converter.as_ref(),
            sink: &*self.sink,
            kind: write.kind,
            timestamp: write.timestamp,
            sequence: write.sequence,
        };
        (handler(write.kind).update)(&mut ctx, write.joint, &write.value)
    }

    pub fn store(&self) -> &JointStore {
        &self.store
    }

    pub fn status_reader(&self) -> StatusReader {
        self.store.status_reader()
    }

    pub fn converter(&self) -> Option<&MeasureConverter> {
        self.converter.as_ref()
    }

    pub fn defaults(&self) -> &JointDefaults {
        &self.defaults
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Writes applied without error since boot.
    pub fn applied_count(&self) -> u64 {
        self.applied
    }
}
