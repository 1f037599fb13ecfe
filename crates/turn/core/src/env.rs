//! Traits describing the engine's external collaborators.
//!
//! The scheduler consumes the order parser's output, a read-only world
//! store, a notice sink for lifecycle messages, per-day world hooks, and an
//! optional dispatch recorder entirely through the traits here. [`SimEnv`]
//! bundles them so engine entry points take one argument instead of five.

use crate::command::{ActorKind, Opcode};
use crate::state::{Day, EntityId};

/// A successfully parsed order line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedOrder {
    pub opcode: Opcode,
    /// Original text, echoed back in failure notices.
    pub raw: String,
}

/// Outcome of pulling one order line through the external parser.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderOutcome {
    Parsed(ParsedOrder),
    /// The line did not parse; the raw text is kept for the error notice.
    Malformed(String),
}

/// Source of per-entity order queues. The textual parser itself lives
/// outside the engine; the engine only consumes its outcome, one line per
/// load.
pub trait OrderSource {
    /// Pulls and consumes the next order line for `entity`; `None` when the
    /// entity's queue is exhausted.
    fn next_order(&mut self, entity: EntityId) -> Option<OrderOutcome>;

    /// Queues orders for autonomous (world-controlled) entities. Called once
    /// per turn before the initial loads.
    fn queue_autonomous_orders(&mut self) {}
}

/// Read-only predicates about entities and the stacking hierarchy.
pub trait WorldOracle {
    fn is_alive(&self, entity: EntityId) -> bool;
    fn is_prisoner(&self, entity: EntityId) -> bool;
    /// True while the entity itself is mid multi-day transit.
    fn is_moving(&self, entity: EntityId) -> bool;
    fn actor_kind(&self, entity: EntityId) -> ActorKind;

    /// Nesting depth beneath the entity's stack leader; 0 for a leader or an
    /// unstacked entity.
    fn stack_depth(&self, entity: EntityId) -> u32;
    /// Stable position of the entity within its location, for deterministic
    /// tie-breaking among stack siblings.
    fn location_position(&self, entity: EntityId) -> u32;
    fn is_stack_leader(&self, entity: EntityId) -> bool;
    /// The entity's stack subordinates, leaders first, in precedence order.
    fn stack_members(&self, leader: EntityId) -> Vec<EntityId>;

    /// Every schedulable unit, in world order.
    fn units(&self) -> Vec<EntityId>;
    /// Every player/faction meta-entity.
    fn factions(&self) -> Vec<EntityId>;
}

/// Lifecycle message the engine reports on an entity's behalf.
///
/// Only parse and permission failures reach the player; everything else the
/// engine keeps to itself.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Notice {
    /// The order line did not parse or named an unknown command.
    UnrecognizedCommand { raw: String },
    /// The command exists but this kind of actor may not issue it.
    OrderRefused { opcode: Opcode },
}

/// Sink for player-visible lifecycle messages, keyed by entity.
pub trait NoticeSink {
    fn notify(&mut self, entity: EntityId, notice: Notice);
}

/// Per-day world hooks the turn driver invokes.
pub trait DayHooks {
    /// Fires at most once per day, the first time the day scheduler selects
    /// a priority level at or above the hostile-sweep threshold. Declared
    /// hostiles take their auto-attacks here.
    fn on_hostile_sweep(&mut self, _day: Day) {}

    /// Fires after each day's command loop settles, for world upkeep.
    fn on_day_end(&mut self, _day: Day) {}
}

/// Dispatch event observed by a [`DispatchRecorder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DispatchEvent {
    Started(Opcode),
    Finished(Opcode),
    Interrupted(Opcode),
}

/// Observer for the engine's dispatch order; used by tests and debug
/// tooling. The default recorder drops everything.
pub trait DispatchRecorder {
    fn record(&mut self, day: Day, entity: EntityId, event: DispatchEvent);
}

/// Recorder that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRecorder;

impl DispatchRecorder for NoopRecorder {
    fn record(&mut self, _day: Day, _entity: EntityId, _event: DispatchEvent) {}
}

/// Bundle of every collaborator an engine entry point needs.
pub struct SimEnv<'a> {
    pub orders: &'a mut dyn OrderSource,
    pub world: &'a dyn WorldOracle,
    pub notices: &'a mut dyn NoticeSink,
    pub hooks: &'a mut dyn DayHooks,
    pub recorder: &'a mut dyn DispatchRecorder,
}
