//! Threads the board binary runs the dispatch core on.

pub mod task;

pub use task::{EventSender, EventTask, RtParams, RtStep};

use thiserror::Error;

/// Runtime setup or task failure.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("RT setup step `{step}` failed: {reason}")]
    RtSetup { step: RtStep, reason: String },

    #[error("failed to spawn {name}: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} thread panicked")]
    Panicked(&'static str),
}
