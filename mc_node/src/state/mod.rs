//! Per-joint state machines driven by the dispatch layer.
//!
//! - [`monitor`]: motion-monitor progress tracking.
//! - [`control_mode`]: bus command sequence for a control-mode change.

pub mod control_mode;
pub mod monitor;
