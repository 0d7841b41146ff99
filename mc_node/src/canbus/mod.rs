//! Outbound command encoding and the transport port.
//!
//! The dispatch layer builds a [`CommandMessage`] per command and hands it to
//! a [`CanServicePort`]. The port is fire-and-forget: it either accepts the
//! message for asynchronous transmission or refuses it immediately. Nothing
//! here queues, retries, or waits.

pub mod queue;

use heapless::Vec;
use mc_common::canbus::{CanPort, CommandClass, MotorCommand, MsgDestination};
use mc_common::consts::{MAX_COMMAND_PAYLOAD, MAX_INDEX_IN_BOARD};

use crate::error::TransportError;

/// One outbound polling command. Built, sent and dropped per update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    pub destination: MsgDestination,
    pub class: CommandClass,
    pub command: MotorCommand,
    pub payload: Vec<u8, MAX_COMMAND_PAYLOAD>,
}

impl CommandMessage {
    /// Message without payload.
    pub fn new(destination: MsgDestination, class: CommandClass, command: MotorCommand) -> Self {
        Self {
            destination,
            class,
            command,
            payload: Vec::new(),
        }
    }

    /// Message carrying `payload` after the command byte.
    pub fn with_payload(
        destination: MsgDestination,
        class: CommandClass,
        command: MotorCommand,
        payload: &[u8],
    ) -> Result<Self, TransportError> {
        let payload = Vec::from_slice(payload)
            .map_err(|_| TransportError::PayloadTooLong { len: payload.len() })?;
        Ok(Self {
            destination,
            class,
            command,
            payload,
        })
    }

    /// Encode as a classic CAN frame sent from `source_addr`.
    ///
    /// Identifier: `class << 8 | source << 4 | dest_addr` (11 bits).
    /// Byte 0: `index_in_board << 7 | command_id`, then the payload.
    pub fn to_frame(&self, source_addr: u8) -> CanFrame {
        let id = ((self.class as u16) << 8)
            | (((source_addr & 0x0F) as u16) << 4)
            | self.destination.board_addr() as u16;

        let mut data = [0u8; 8];
        data[0] = ((self.destination.index_in_board() & 0x01) << 7) | (self.command as u8 & 0x7F);
        data[1..1 + self.payload.len()].copy_from_slice(&self.payload);

        CanFrame {
            id,
            len: 1 + self.payload.len() as u8,
            data,
        }
    }
}

/// Classic CAN data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    pub id: u16,
    pub len: u8,
    pub data: [u8; 8],
}

impl CanFrame {
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// Send side of the board's CAN service.
///
/// Implementations must not block. A full queue or closed link is reported
/// through `Err` and the caller moves on.
pub trait CanServicePort {
    fn send(&mut self, port: CanPort, msg: CommandMessage) -> Result<(), TransportError>;
}

/// Pack a joint's index inside its board and the board's bus address into
/// the destination byte: `index << 4 | addr`.
#[inline]
pub const fn build_destination(index_in_board: u8, board_addr: u8) -> MsgDestination {
    MsgDestination(((index_in_board & MAX_INDEX_IN_BOARD) << 4) | (board_addr & 0x0F))
}

/// Build a command and hand it to `tx` for asynchronous transmission.
pub fn send_command(
    tx: &mut dyn CanServicePort,
    port: CanPort,
    destination: MsgDestination,
    class: CommandClass,
    command: MotorCommand,
    payload: Option<&[u8]>,
) -> Result<(), TransportError> {
    let msg = match payload {
        Some(bytes) => CommandMessage::with_payload(destination, class, command, bytes)?,
        None => CommandMessage::new(destination, class, command),
    };
    tx.send(port, msg)
}
