//! Deterministic turn-processing core for a multi-party simulation.
//!
//! Each controlled entity submits a queue of textual orders once per game
//! turn; `turn-core` executes them as commands taking a variable number of
//! simulated days, respecting cross-entity priority, stacking hierarchy,
//! interruption, and daily polling semantics. The engine is intentionally
//! single-threaded and cooperative: "concurrency" among entities is purely
//! logical, interleaved state-machine steps with exact, reproducible
//! ordering.
//!
//! The parser, the individual command implementations, the world store, and
//! all player-visible output live outside this crate and are consumed
//! through the trait seams in [`env`] and [`command`].
pub mod command;
pub mod config;
pub mod env;
pub mod scheduler;
pub mod state;

pub use command::{
    ActorKind, ActorKinds, CommandBehavior, CommandCtx, CommandEntry, CommandRegistry, CommandSpec,
    Opcode, RegistryError, WAIT_COMMAND,
};
pub use config::{
    HOSTILE_SWEEP_PRIORITY, MAX_PRIORITY, PRIORITY_SPAN, STACK_KEY_SPAN, SchedulerConfig,
    WAIT_FOREVER,
};
pub use env::{
    DayHooks, DispatchEvent, DispatchRecorder, NoopRecorder, Notice, NoticeSink, OrderOutcome,
    OrderSource, ParsedOrder, SimEnv, WorldOracle,
};
pub use scheduler::{InvariantError, LoadResult, Scheduler, SchedulerError, precedence_key};
pub use state::{CommandRecord, CommandState, Day, EntityId, Priority};
