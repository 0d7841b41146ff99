//! Field-bus addressing and polling-command identifiers.
//!
//! A joint is reached through its [`CanLocation`]: the port it hangs off,
//! the 4-bit board address, and the index of the joint inside that board.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

use crate::consts::{MAX_CAN_ADDR, MAX_INDEX_IN_BOARD};

const_assert!(MAX_CAN_ADDR <= 0x0F);
const_assert!(MAX_INDEX_IN_BOARD <= 0x0F);

/// CAN port on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CanPort {
    Can1 = 0,
    Can2 = 1,
}

/// Where a joint lives on the bus. Immutable once configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanLocation {
    pub port: CanPort,
    pub addr: u8,
    #[serde(default)]
    pub index_in_board: u8,
}

impl CanLocation {
    pub fn validate(&self) -> Result<(), String> {
        if self.addr > MAX_CAN_ADDR {
            return Err(format!("addr {} exceeds {}", self.addr, MAX_CAN_ADDR));
        }
        if self.index_in_board > MAX_INDEX_IN_BOARD {
            return Err(format!(
                "index_in_board {} exceeds {}",
                self.index_in_board, MAX_INDEX_IN_BOARD
            ));
        }
        Ok(())
    }
}

/// Encoded `(index_in_board, board_addr)` destination byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MsgDestination(pub u8);

impl MsgDestination {
    #[inline]
    pub const fn index_in_board(self) -> u8 {
        self.0 >> 4
    }

    #[inline]
    pub const fn board_addr(self) -> u8 {
        self.0 & 0x0F
    }
}

/// Command class of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandClass {
    PollingMotorControl = 0,
    PeriodicMotorControl = 1,
    PollingAnalogSensor = 2,
    PeriodicAnalogSensor = 3,
}

/// Polling motor-control command identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MotorCommand {
    ControllerRun = 1,
    ControllerIdle = 2,
    CalibrateEncoder = 4,
    EnablePwmPad = 5,
    DisablePwmPad = 6,
    GetControlMode = 7,
    MotionDone = 8,
    SetControlMode = 9,
}

impl MotorCommand {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::ControllerRun),
            2 => Some(Self::ControllerIdle),
            4 => Some(Self::CalibrateEncoder),
            5 => Some(Self::EnablePwmPad),
            6 => Some(Self::DisablePwmPad),
            7 => Some(Self::GetControlMode),
            8 => Some(Self::MotionDone),
            9 => Some(Self::SetControlMode),
            _ => None,
        }
    }
}
