//! # Motion-Control Node Library
//!
//! NV update-dispatch core of a joint-actuation board. Every write to a
//! joint's network variable becomes, in this order of decision, a
//! unit-correct controller parameter, a mutation of local joint state, and
//! zero or more outbound CAN commands.
//!
//! ## Layers
//!
//! 1. **units**: wire ↔ internal position, velocity and acceleration
//! 2. **canbus**: destination packing, command frames, outbound queue
//! 3. **store**: per-joint records and the atomic status board
//! 4. **dispatch**: static initializer/updater table and the write boundary
//! 5. **state**: motion-monitor transitions and control-mode command sequences
//!
//! The controller, transport and diagnostic sink are traits; the board
//! binary wires them to logging implementations and a bounded queue.
//!
//! ## No Allocation per Write
//!
//! Joint tables are fixed-capacity `heapless` vectors sized at boot.
//! Applying a write allocates nothing; command payloads live inline.

#![deny(clippy::disallowed_types)]

pub mod canbus;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod runtime;
pub mod state;
pub mod store;
pub mod units;
