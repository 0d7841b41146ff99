//! Bounded outbound queue between the dispatch task and the CAN driver.
//!
//! Backed by a `sync_channel` used only with `try_send`, so the producer
//! never blocks: when the driver falls behind, `send` returns `QueueFull`.

use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

use mc_common::canbus::CanPort;

use super::{CanServicePort, CommandMessage};
use crate::error::TransportError;

/// Producer half, owned by the dispatcher.
#[derive(Debug, Clone)]
pub struct OutboundQueue {
    tx: SyncSender<(CanPort, CommandMessage)>,
    capacity: usize,
}

/// Consumer half, owned by whatever drives the CAN peripheral.
#[derive(Debug)]
pub struct OutboundReceiver {
    rx: Receiver<(CanPort, CommandMessage)>,
}

impl OutboundQueue {
    /// Create a queue holding at most `capacity` messages (minimum 1).
    pub fn bounded(capacity: usize) -> (Self, OutboundReceiver) {
        let capacity = capacity.max(1);
        let (tx, rx) = sync_channel(capacity);
        (Self { tx, capacity }, OutboundReceiver { rx })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl CanServicePort for OutboundQueue {
    fn send(&mut self, port: CanPort, msg: CommandMessage) -> Result<(), TransportError> {
        self.tx.try_send((port, msg)).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::QueueFull {
                capacity: self.capacity,
            },
            TrySendError::Disconnected(_) => TransportError::Closed,
        })
    }
}

impl OutboundReceiver {
    /// Next queued message, if any. Never blocks.
    pub fn try_next(&self) -> Option<(CanPort, CommandMessage)> {
        self.rx.try_recv().ok()
    }

    /// Block until a message arrives; `None` once every producer is gone.
    pub fn recv(&self) -> Option<(CanPort, CommandMessage)> {
        self.rx.recv().ok()
    }

    /// Everything queued right now.
    pub fn drain(&self) -> Vec<(CanPort, CommandMessage)> {
        self.rx.try_iter().collect()
    }
}
