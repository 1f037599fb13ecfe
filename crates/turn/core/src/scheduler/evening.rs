//! The evening scheduler: tick every running command once.

use crate::command::CommandRegistry;
use crate::config::PRIORITY_SPAN;
use crate::env::{SimEnv, WorldOracle};
use crate::state::{CommandState, EntityId};

use super::{InvariantError, Scheduler, precedence_key};

impl Scheduler {
    /// Visits every running entity exactly once, in priority-then-precedence
    /// order, counting down its wait and invoking finish when due.
    ///
    /// Ordering is game-visible: commands started at a lower priority today
    /// are guaranteed to have their finish called (and possibly re-load a
    /// more urgent command) before higher-priority entities' finishes run.
    /// Entities under a one-day detention are passed over; the wait
    /// fast-path re-check afterwards catches exact completions the sweep
    /// skipped.
    pub fn evening_phase(
        &mut self,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        let mut snapshot = self.run_queue.snapshot();
        snapshot.sort_by_key(|&e| (self.evening_key(e, env.world), e));

        for entity in snapshot {
            let Some(rec) = self.records.get_mut(&entity) else {
                continue;
            };
            if rec.state != CommandState::Run || rec.second_wait > 0 {
                continue;
            }
            rec.days_executing += 1;
            self.finish(entity, registry, env, false)?;
        }

        self.run_wait_completions(registry, env)
    }

    /// Composite sort key: priority band dominates, precedence key breaks
    /// ties within a band.
    fn evening_key(&self, entity: EntityId, world: &dyn WorldOracle) -> u64 {
        let priority = self
            .records
            .get(&entity)
            .map(|r| r.priority as u64)
            .unwrap_or(u64::MAX / PRIORITY_SPAN);
        priority * PRIORITY_SPAN + precedence_key(world, entity)
    }
}
