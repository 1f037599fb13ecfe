//! Scheduling state owned by the engine.
//!
//! This module defines the per-entity command records and the queue types
//! the schedulers drive. All mutation happens through
//! [`Scheduler`](crate::scheduler::Scheduler); collaborators observe state
//! through its read-only accessors.
pub mod types;

pub use types::{CommandRecord, CommandState, Day, EntityId, LoadQueues, Priority, RunQueue};
