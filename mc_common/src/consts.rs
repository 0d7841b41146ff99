//! System-wide constants for the motion-control workspace.
//!
//! Single source of truth for numeric limits shared between crates.

use static_assertions::const_assert;

/// Maximum number of joints a single board can host.
pub const MAX_JOINTS: usize = 16;

/// Maximum number of CAN boards addressable on one port (4-bit address).
pub const MAX_CAN_ADDR: u8 = 15;

/// Maximum index of a joint inside one CAN board (dual-axis boards).
pub const MAX_INDEX_IN_BOARD: u8 = 1;

/// Maximum payload bytes after the command byte of a polling frame.
pub const MAX_COMMAND_PAYLOAD: usize = 7;

/// Default bounded capacity of the outbound CAN queue.
pub const OUTBOUND_QUEUE_CAPACITY_DEFAULT: usize = 64;

/// Default bounded capacity of the inbound NV write queue.
pub const EVENT_QUEUE_CAPACITY_DEFAULT: usize = 32;

/// Largest shift accepted for velocity/acceleration fixed-point scaling.
pub const MAX_SHIFT: u8 = 15;

/// Bus address used by this board as the source of polling messages.
pub const DEFAULT_SOURCE_ADDR: u8 = 0;

const_assert!(MAX_JOINTS > 0 && MAX_JOINTS <= u8::MAX as usize);
const_assert!(MAX_CAN_ADDR <= 0x0F);
const_assert!(OUTBOUND_QUEUE_CAPACITY_DEFAULT > 0);
const_assert!(EVENT_QUEUE_CAPACITY_DEFAULT > 0);
const_assert!(MAX_SHIFT < 32);
const_assert!(MAX_INDEX_IN_BOARD == 1);
const_assert!(MAX_COMMAND_PAYLOAD == 7);

