//! Event task: the single thread that applies NV writes.
//!
//! Writes arrive over a bounded channel and are applied one at a time, each
//! to completion. Dropping every [`EventSender`] ends the task, which hands
//! the dispatcher back through [`EventTask::join`].
//!
//! With [`RtParams`], the thread walks its [`RtStep`]s before taking the
//! first write. Steps only touch the OS with the `rt` feature.

use std::fmt;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use super::RuntimeError;
use crate::canbus::CanServicePort;
use crate::controller::MotorController;
use crate::dispatch::{Dispatcher, NvWrite};
use crate::error::TransportError;

/// Producer handle for inbound writes.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: SyncSender<NvWrite>,
    capacity: usize,
}

impl EventSender {
    /// Queue a write without blocking.
    pub fn submit(&self, write: NvWrite) -> Result<(), TransportError> {
        self.tx.try_send(write).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::QueueFull {
                capacity: self.capacity,
            },
            TrySendError::Disconnected(_) => TransportError::Closed,
        })
    }

    /// Queue a write, waiting for room.
    pub fn submit_blocking(&self, write: NvWrite) -> Result<(), TransportError> {
        self.tx.send(write).map_err(|_| TransportError::Closed)
    }
}

/// Running event task.
pub struct EventTask<C: MotorController, T: CanServicePort> {
    sender: EventSender,
    handle: JoinHandle<Dispatcher<C, T>>,
}

impl<C, T> EventTask<C, T>
where
    C: MotorController + Send + 'static,
    T: CanServicePort + Send + 'static,
{
    /// Move `dispatcher` onto a new thread. With `rt`, the thread applies its
    /// RT steps before taking its first write; a failed step is logged and
    /// the task runs with whatever steps succeeded before it.
    pub fn spawn(
        dispatcher: Dispatcher<C, T>,
        capacity: usize,
        rt: Option<RtParams>,
    ) -> Result<Self, RuntimeError> {
        let capacity = capacity.max(1);
        let (tx, rx) = sync_channel(capacity);
        let handle = thread::Builder::new()
            .name("mc-event".to_string())
            .spawn(move || {
                if let Some(params) = rt {
                    match params.apply() {
                        Ok(applied) => info!(
                            cpu_core = params.cpu_core,
                            priority = params.priority,
                            applied,
                            "RT setup complete"
                        ),
                        Err(e) => error!("{e}"),
                    }
                }
                run(dispatcher, rx)
            })
            .map_err(|source| RuntimeError::Spawn {
                name: "event task",
                source,
            })?;
        Ok(Self {
            sender: EventSender { tx, capacity },
            handle,
        })
    }

    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Close this task's own sender and wait for the queue to drain. Other
    /// senders still alive keep the task running.
    pub fn join(self) -> Result<Dispatcher<C, T>, RuntimeError> {
        drop(self.sender);
        self.handle
            .join()
            .map_err(|_| RuntimeError::Panicked("event task"))
    }
}

/// Placement of the event thread when running with real-time scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtParams {
    pub cpu_core: usize,
    pub priority: i32,
}

impl Default for RtParams {
    fn default() -> Self {
        Self {
            cpu_core: 1,
            priority: 80,
        }
    }
}

impl RtParams {
    /// Steps in the order the thread applies them. Memory is locked before
    /// the thread is pinned so the lock covers pages touched afterwards.
    pub fn steps(&self) -> [RtStep; 3] {
        [
            RtStep::LockMemory,
            RtStep::PinCore(self.cpu_core),
            RtStep::FifoPriority(self.priority),
        ]
    }

    /// Apply every step to the calling thread, stopping at the first failure.
    /// Returns how many steps were applied.
    pub fn apply(&self) -> Result<usize, RuntimeError> {
        let mut applied = 0;
        for step in self.steps() {
            step.apply()?;
            debug!(%step, "RT step applied");
            applied += 1;
        }
        Ok(applied)
    }
}

/// One OS-level change made to the event thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtStep {
    /// `mlockall(MCL_CURRENT | MCL_FUTURE)`.
    LockMemory,
    /// Restrict the thread to one CPU core.
    PinCore(usize),
    /// `SCHED_FIFO` at the given priority.
    FifoPriority(i32),
}

impl fmt::Display for RtStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockMemory => f.write_str("lock memory"),
            Self::PinCore(core) => write!(f, "pin to core {core}"),
            Self::FifoPriority(priority) => write!(f, "SCHED_FIFO priority {priority}"),
        }
    }
}

impl RtStep {
    #[cfg(any(feature = "rt", test))]
    fn fail(self, reason: impl fmt::Display) -> RuntimeError {
        RuntimeError::RtSetup {
            step: self,
            reason: reason.to_string(),
        }
    }

    #[cfg(feature = "rt")]
    fn apply(self) -> Result<(), RuntimeError> {
        use nix::sched::{CpuSet, sched_setaffinity};
        use nix::sys::mman::{MlockallFlags, mlockall};
        use nix::unistd::Pid;

        match self {
            Self::LockMemory => mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
                .map_err(|e| self.fail(e)),
            Self::PinCore(core) => {
                let mut set = CpuSet::new();
                set.set(core).map_err(|e| self.fail(e))?;
                sched_setaffinity(Pid::from_raw(0), &set).map_err(|e| self.fail(e))
            }
            Self::FifoPriority(priority) => {
                let param = libc::sched_param {
                    sched_priority: priority,
                };
                // SAFETY: `param` outlives the call; pid 0 is the calling thread.
                match unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) } {
                    0 => Ok(()),
                    _ => Err(self.fail(std::io::Error::last_os_error())),
                }
            }
        }
    }

    #[cfg(not(feature = "rt"))]
    fn apply(self) -> Result<(), RuntimeError> {
        Ok(())
    }
}

fn run<C: MotorController, T: CanServicePort>(
    mut dispatcher: Dispatcher<C, T>,
    rx: Receiver<NvWrite>,
) -> Dispatcher<C, T> {
    for write in rx.iter() {
        dispatcher.apply(write);
    }
    info!(applied = dispatcher.applied_count(), "event task stopped");
    dispatcher
}
