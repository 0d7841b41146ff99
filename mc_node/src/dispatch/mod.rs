//! NV update dispatch.
//!
//! Every variable kind has one initializer and one updater, held in a static
//! table indexed by [`VariableKind`]. The [`Dispatcher`] runs the
//! initializers once at boot and routes each [`NvWrite`] to its updater.
//! Updaters return `Result`; the dispatcher records a failure on the
//! diagnostic sink and drops it, so one bad write never stalls the board.

pub mod dispatcher;
pub mod kind;
pub mod table;
pub mod updaters;

pub use dispatcher::Dispatcher;
pub use kind::{NvValue, NvWrite, VariableKind};
pub use table::{DISPATCH_TABLE, JointSlots, NvHandler, UpdateContext, handler};
