//! Motion-control common library.
//!
//! Shared constants, configuration loading and the joint data model used by
//! the NV dispatch core and by anything that reads its state.
//!
//! # Module Structure
//!
//! - [`consts`] - Workspace-wide limits
//! - [`config`] - TOML configuration loading traits and types
//! - [`motion`] - Joint configuration, status, commands and diagnostic flags
//! - [`canbus`] - Field-bus addressing and polling command identifiers
//! - [`prelude`] - Common re-exports for convenience

pub mod canbus;
pub mod config;
pub mod consts;
pub mod motion;
pub mod prelude;
