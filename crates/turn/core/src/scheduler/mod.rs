//! The cooperative, single-threaded command scheduler.
//!
//! [`Scheduler`] owns every command record and the load/run queues, and
//! advances thousands of independent command state machines through a
//! simulated month with exact, reproducible ordering. Collaborators (order
//! source, world store, notice sink, hooks) are passed in per call through
//! [`SimEnv`](crate::env::SimEnv), so parallel test instances never share
//! state.
//!
//! One turn is driven by [`Scheduler::process_orders`]: per-turn setup, then
//! a month of days, each day being `start_phase` (dispatch queued commands
//! in priority-then-precedence order) followed by `evening_phase` (tick
//! every running command once).

mod day;
mod driver;
mod errors;
mod evening;
mod interrupt;
mod lifecycle;

pub use errors::{InvariantError, SchedulerError};
pub use lifecycle::LoadResult;

use std::collections::HashMap;

use crate::command::{CommandCtx, CommandEntry, CommandRegistry, Opcode};
use crate::config::{MAX_PRIORITY, SchedulerConfig, STACK_KEY_SPAN};
use crate::env::{SimEnv, WorldOracle};
use crate::state::{CommandRecord, CommandState, Day, EntityId, LoadQueues, Priority, RunQueue};

/// Deterministic tie-breaker among entities, independent of priority:
/// stack leaders order before their members (depth dominates), siblings
/// resolve by stable in-location position.
pub fn precedence_key(world: &dyn WorldOracle, entity: EntityId) -> u64 {
    u64::from(world.stack_depth(entity)) * STACK_KEY_SPAN
        + u64::from(world.location_position(entity))
}

/// Owner of all scheduling state for one simulation.
pub struct Scheduler {
    config: SchedulerConfig,
    day: Day,
    records: HashMap<EntityId, CommandRecord>,
    load_queues: LoadQueues,
    run_queue: RunQueue,
    /// Priority level the day scheduler is currently dispatching;
    /// `MAX_PRIORITY` while idle. Lowered by a reload of a more urgent
    /// command so the new command is considered in the same pass.
    cursor: Priority,
    /// Zero-duration mode for faction commands at turn setup: completed
    /// commands go straight to `Done` without reloading.
    immediate: bool,
    hostile_sweep_fired: bool,
    /// Opcode of the reserved wait command, resolved once per turn.
    wait_opcode: Option<Opcode>,
    /// Fast-path list of entities parked on a wait command, re-checked for
    /// exact completion after every dispatch and every evening sweep.
    wait_list: Vec<EntityId>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            day: Day::ZERO,
            records: HashMap::new(),
            load_queues: LoadQueues::new(),
            run_queue: RunQueue::new(),
            cursor: MAX_PRIORITY,
            immediate: false,
            hostile_sweep_fired: false,
            wait_opcode: None,
            wait_list: Vec::new(),
        }
    }

    /// Current simulated day.
    pub fn day(&self) -> Day {
        self.day
    }

    /// Read-only view of an entity's command record, if one exists yet.
    pub fn record(&self, entity: EntityId) -> Option<&CommandRecord> {
        self.records.get(&entity)
    }

    /// Every command record, in unspecified order; for diagnostics.
    pub fn records(&self) -> impl Iterator<Item = &CommandRecord> {
        self.records.values()
    }

    /// Entities currently counting down a started command.
    pub fn running(&self) -> Vec<EntityId> {
        self.run_queue.snapshot()
    }

    /// Entities queued for dispatch at `priority`, in insertion order.
    pub fn queued_at(&self, priority: Priority) -> Vec<EntityId> {
        self.load_queues.level(priority).to_vec()
    }

    /// Applies a one-day suspension (post-combat detention and the like).
    /// Blocks both day-scheduler pickup and the evening tick; the end of the
    /// current daily loop clears it, so a longer detention must re-apply it
    /// each day.
    pub fn apply_second_wait(&mut self, entity: EntityId) {
        self.ensure_record(entity).second_wait = 1;
    }

    /// Flags the entity's command for interruption at the next turn's setup.
    pub fn request_interrupt(&mut self, entity: EntityId) {
        self.ensure_record(entity).pending_interrupt = true;
    }

    pub(crate) fn ensure_record(&mut self, entity: EntityId) -> &mut CommandRecord {
        self.records
            .entry(entity)
            .or_insert_with(|| CommandRecord::new(entity))
    }

    /// Eligibility for day-scheduler pickup: not a prisoner, not mid-transit
    /// (own move or suspended under a moving leader), not detained.
    fn ready_to_start(&self, entity: EntityId, world: &dyn WorldOracle) -> bool {
        let Some(rec) = self.records.get(&entity) else {
            return false;
        };
        rec.second_wait == 0
            && rec.moving_since.is_none()
            && !world.is_prisoner(entity)
            && !world.is_moving(entity)
    }

    /// Runs one callback of the entity's dispatch entry with a [`CommandCtx`]
    /// built around its record. The record is detached from the table for
    /// the duration of the call, so callbacks can never re-enter the
    /// scheduler.
    fn with_entry<R>(
        &mut self,
        entity: EntityId,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
        f: impl FnOnce(&CommandEntry, &mut CommandCtx<'_>) -> R,
    ) -> Result<R, InvariantError> {
        let mut record = self
            .records
            .remove(&entity)
            .ok_or(InvariantError::MissingRecord(entity))?;

        let result = (|| {
            let opcode = record.opcode.ok_or(InvariantError::NoOpcode(entity))?;
            let entry = registry
                .get(opcode)
                .ok_or(InvariantError::MissingDispatchEntry { entity, opcode })?;
            let mut ctx = CommandCtx {
                owner: entity,
                today: self.day,
                record: &mut record,
                world: env.world,
                notices: &mut *env.notices,
            };
            Ok(f(entry, &mut ctx))
        })();

        self.records.insert(entity, record);
        result
    }

    /// Re-checks every parked wait command for exact completion, so their
    /// completion callback fires even when the evening sweep skipped them.
    /// At most one tick per day still holds: already-ticked records are
    /// passed over.
    fn run_wait_completions(
        &mut self,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        let parked = self.wait_list.clone();
        for entity in parked {
            let Some(rec) = self.records.get(&entity) else {
                continue;
            };
            if rec.state != CommandState::Run || rec.last_tick_day == Some(self.day) {
                continue;
            }
            let Some(opcode) = rec.opcode else {
                continue;
            };
            let Some(entry) = registry.get(opcode) else {
                continue;
            };
            if entry.behavior.wait_satisfied(rec, env.world, self.day) {
                tracing::debug!(%entity, %opcode, "wait condition satisfied");
                self.finish(entity, registry, env, true)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatWorld;

    impl WorldOracle for FlatWorld {
        fn is_alive(&self, _: EntityId) -> bool {
            true
        }
        fn is_prisoner(&self, _: EntityId) -> bool {
            false
        }
        fn is_moving(&self, _: EntityId) -> bool {
            false
        }
        fn actor_kind(&self, _: EntityId) -> crate::command::ActorKind {
            crate::command::ActorKind::Character
        }
        fn stack_depth(&self, e: EntityId) -> u32 {
            e.0 / 100
        }
        fn location_position(&self, e: EntityId) -> u32 {
            e.0 % 100
        }
        fn is_stack_leader(&self, e: EntityId) -> bool {
            e.0 < 100
        }
        fn stack_members(&self, _: EntityId) -> Vec<EntityId> {
            Vec::new()
        }
        fn units(&self) -> Vec<EntityId> {
            Vec::new()
        }
        fn factions(&self) -> Vec<EntityId> {
            Vec::new()
        }
    }

    #[test]
    fn precedence_puts_leaders_before_members() {
        let world = FlatWorld;
        // entity 5: depth 0 pos 5; entity 103: depth 1 pos 3
        assert!(precedence_key(&world, EntityId(5)) < precedence_key(&world, EntityId(103)));
    }

    #[test]
    fn second_wait_blocks_pickup() {
        let world = FlatWorld;
        let mut sched = Scheduler::new(SchedulerConfig::default());
        sched.ensure_record(EntityId(1)).state = CommandState::Load;
        assert!(sched.ready_to_start(EntityId(1), &world));
        sched.apply_second_wait(EntityId(1));
        assert!(!sched.ready_to_start(EntityId(1), &world));
    }
}
