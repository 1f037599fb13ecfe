//! The day scheduler: dispatch queued commands in priority order.

use crate::command::CommandRegistry;
use crate::config::{HOSTILE_SWEEP_PRIORITY, MAX_PRIORITY};
use crate::env::{SimEnv, WorldOracle};
use crate::state::Priority;

use super::{InvariantError, Scheduler, precedence_key};

impl Scheduler {
    /// Starts every dispatchable command, lowest priority level first.
    ///
    /// Each pass selects the first priority level holding at least one
    /// eligible entity, sorts a snapshot of that level by precedence key
    /// (stack leaders before members, stable by location position), and
    /// dispatches each entity in turn. After every dispatch the wait
    /// fast-path is re-checked so zero-duration chains resolve within the
    /// same pass; and if a completed command reloaded something more urgent
    /// (the cursor dropped), the rest of the snapshot is abandoned and the
    /// scan restarts from the top.
    pub fn start_phase(
        &mut self,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        while let Some(level) = self.lowest_ready_level(env.world) {
            // Declared-hostile auto-attacks run the first time the day
            // reaches this band, so they never preempt more urgent commands.
            if level >= HOSTILE_SWEEP_PRIORITY && !self.hostile_sweep_fired {
                self.hostile_sweep_fired = true;
                env.hooks.on_hostile_sweep(self.day);
            }

            self.cursor = level;

            let mut snapshot = self.queued_at(level);
            snapshot.sort_by_key(|&e| (precedence_key(env.world, e), e));

            for entity in snapshot {
                // the snapshot is point-in-time; entries may have left the
                // queue while earlier dispatches ran
                if !self.load_queues.contains(level, entity) {
                    continue;
                }
                if !self.ready_to_start(entity, env.world) {
                    continue;
                }
                self.start(entity, registry, env)?;
                self.run_wait_completions(registry, env)?;
                if self.cursor < level {
                    break;
                }
            }
        }
        self.cursor = MAX_PRIORITY;
        Ok(())
    }

    /// First priority level holding at least one eligible entity, scanning
    /// `0..MAX_PRIORITY` in order; `None` ends the phase.
    fn lowest_ready_level(&self, world: &dyn WorldOracle) -> Option<Priority> {
        (0..MAX_PRIORITY).find(|&level| {
            self.load_queues
                .level(level)
                .iter()
                .any(|&e| self.ready_to_start(e, world))
        })
    }
}
