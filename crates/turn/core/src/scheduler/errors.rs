//! Scheduler error types.
//!
//! Invariant violations indicate a scheduler bug, never a game-rule outcome:
//! the driver treats them as fatal and aborts the turn, while tests can
//! assert on the typed variants instead of crashing the test process.

use crate::command::{Opcode, RegistryError};
use crate::state::{CommandState, Day, EntityId};

/// Fatal bookkeeping violations inside the scheduler.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    #[error("no command record exists for {0}")]
    MissingRecord(EntityId),

    #[error("finish invoked twice for {entity} on {day}")]
    DoubleFinish { entity: EntityId, day: Day },

    #[error("{entity} dispatched while {state}")]
    BadStartState {
        entity: EntityId,
        state: CommandState,
    },

    #[error("{0} holds no opcode but a callback was requested")]
    NoOpcode(EntityId),

    #[error("{entity} loaded {opcode} but the registry no longer knows it")]
    MissingDispatchEntry { entity: EntityId, opcode: Opcode },

    #[error("{0} still running after interrupt")]
    InterruptStuck(EntityId),
}

/// Errors surfaced by the turn driver.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Invariant(#[from] InvariantError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
