//! In-memory runtime around [`turn_core`]'s deterministic scheduler.
//!
//! `turn-runtime` supplies concrete collaborators for every trait seam the
//! engine consumes: an order book, a world table, a notice log, day hooks,
//! and a dispatch trace, plus the built-in commands the driver expects.
//! [`SimRuntime`] wires them together behind turn- and day-level entry
//! points; everything stays synchronous and single-threaded by design.
pub mod commands;
pub mod notices;
pub mod orders;
pub mod runtime;
pub mod world;

pub use commands::{WAIT_OPCODE, WaitBehavior, base_registry};
pub use notices::{DispatchLog, HookLog, NoticeLog};
pub use orders::OrderBook;
pub use runtime::{RuntimeError, SimRuntime, init_tracing};
pub use world::{UnitInfo, WorldTable};
