//! Observation hook for failures the dispatch boundary absorbs.
//!
//! Production behaviour discards every updater error; before it does, the
//! dispatcher hands a [`DispatchFailure`] to the injected [`DiagnosticSink`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mc_common::motion::JointId;
use mc_common::motion::error::DiagnosticFlags;
use tracing::warn;

use crate::dispatch::kind::VariableKind;
use crate::error::{DispatchError, TransportError};

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// The update was aborted with no effect.
    Dispatch(DispatchError),
    /// One outbound command was refused; the update went on.
    Transport(TransportError),
}

impl FailureCause {
    pub const fn flag(&self) -> DiagnosticFlags {
        match self {
            Self::Dispatch(e) => e.flag(),
            Self::Transport(_) => DiagnosticFlags::TX_REJECTED,
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch(e) => e.fmt(f),
            Self::Transport(e) => e.fmt(f),
        }
    }
}

/// One absorbed failure with the write that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchFailure {
    pub kind: VariableKind,
    pub joint: JointId,
    pub timestamp: u64,
    pub sequence: u32,
    pub cause: FailureCause,
}

impl DispatchFailure {
    #[inline]
    pub const fn flag(&self) -> DiagnosticFlags {
        self.cause.flag()
    }
}

/// Receives every absorbed failure. Called on the dispatch thread; must not
/// block.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, failure: &DispatchFailure);
}

/// Logs each failure at `warn!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, failure: &DispatchFailure) {
        warn!(
            kind = %failure.kind,
            joint = failure.joint,
            seq = failure.sequence,
            flag = ?failure.flag(),
            "update absorbed: {}",
            failure.cause
        );
    }
}

/// Lock-free counters, one per diagnostic class plus a total.
#[derive(Debug, Default)]
pub struct DiagnosticCounters {
    by_flag: [AtomicU64; DiagnosticFlags::ORDERED.len()],
    total: AtomicU64,
}

impl DiagnosticCounters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Count for one class; zero for a composite or empty flag.
    pub fn count(&self, flag: DiagnosticFlags) -> u64 {
        flag.index()
            .map_or(0, |i| self.by_flag[i].load(Ordering::Relaxed))
    }

    /// Non-zero classes, in bit order.
    pub fn snapshot(&self) -> Vec<(DiagnosticFlags, u64)> {
        DiagnosticFlags::ORDERED
            .iter()
            .map(|f| (*f, self.count(*f)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

impl DiagnosticSink for DiagnosticCounters {
    fn record(&self, failure: &DispatchFailure) {
        if let Some(i) = failure.flag().index() {
            self.by_flag[i].fetch_add(1, Ordering::Relaxed);
        }
        self.total.fetch_add(1, Ordering::Relaxed);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, failure: &DispatchFailure) {
        (**self).record(failure);
    }
}

/// Fans one failure out to two sinks.
#[derive(Debug, Clone, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for Tee<A, B> {
    fn record(&self, failure: &DispatchFailure) {
        self.0.record(failure);
        self.1.record(failure);
    }
}
