//! Diagnostic flags for absorbed dispatch failures.
//!
//! Updates never propagate errors to the transport; each absorbed failure is
//! classified with one of these flags so it can be counted and logged.

use bitflags::bitflags;

bitflags! {
    /// Classes of failure the dispatch boundary absorbs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DiagnosticFlags: u8 {
        /// Joint index outside the configured joint count.
        const INVALID_JOINT       = 0x01;
        /// Config, status or CAN-location lookup missed.
        const RECORD_NOT_FOUND    = 0x02;
        /// Setpoint, calibrator or monitor-mode tag not recognised.
        const UNRECOGNIZED_VARIANT = 0x04;
        /// Update needed a converter context that was not installed.
        const NULL_CONTEXT        = 0x08;
        /// Slot value type does not belong to the variable kind.
        const SLOT_TYPE_MISMATCH  = 0x10;
        /// Transport refused an outbound command (update continued).
        const TX_REJECTED         = 0x20;
    }
}

impl DiagnosticFlags {
    /// Every flag, in bit order. Used to size and index counter tables.
    pub const ORDERED: [Self; 6] = [
        Self::INVALID_JOINT,
        Self::RECORD_NOT_FOUND,
        Self::UNRECOGNIZED_VARIANT,
        Self::NULL_CONTEXT,
        Self::SLOT_TYPE_MISMATCH,
        Self::TX_REJECTED,
    ];

    /// Position of a single flag in [`ORDERED`](Self::ORDERED).
    pub fn index(self) -> Option<usize> {
        Self::ORDERED.iter().position(|f| *f == self)
    }

    /// Returns true for failures that abort the update (everything but TX).
    #[inline]
    pub const fn aborts_update(&self) -> bool {
        !self.is_empty() && !self.contains(Self::TX_REJECTED)
    }
}

impl Default for DiagnosticFlags {
    fn default() -> Self {
        Self::empty()
    }
}
