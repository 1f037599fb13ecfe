//! The turn driver: per-turn setup plus a month of daily loops.

use crate::command::{CommandRegistry, WAIT_COMMAND};
use crate::env::SimEnv;
use crate::state::{CommandState, EntityId};

use super::{InvariantError, LoadResult, Scheduler, SchedulerError};

impl Scheduler {
    /// Processes one full game turn.
    ///
    /// Setup: resolve the reserved wait opcode and rebuild the wait
    /// fast-path list, queue autonomous entities' orders, run the initial
    /// load for every unit and faction that is between commands, honor
    /// interruptions flagged during the previous turn, and run the
    /// zero-duration faction commands to completion synchronously. Then a
    /// month of days, each one `start_phase` then `evening_phase` then the
    /// one-day suspension reset.
    pub fn process_orders(
        &mut self,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), SchedulerError> {
        let wait_opcode = registry.resolve(WAIT_COMMAND)?;
        self.wait_opcode = Some(wait_opcode);
        self.wait_list = self
            .records
            .iter()
            .filter(|(_, rec)| {
                rec.opcode == Some(wait_opcode) && rec.state != CommandState::Done
            })
            .map(|(&entity, _)| entity)
            .collect();
        self.wait_list.sort_unstable();

        env.orders.queue_autonomous_orders();

        let mut roster = env.world.factions();
        roster.extend(env.world.units());
        for entity in &roster {
            let idle = self
                .records
                .get(entity)
                .map(|rec| rec.state == CommandState::Done)
                .unwrap_or(true);
            if idle {
                self.load(*entity, registry, env);
            }
        }

        self.resume_interrupted(registry, env)?;
        self.run_faction_commands(registry, env)?;

        for _ in 0..self.config.month_days {
            self.day = self.day.next();
            tracing::debug!(day = %self.day, "daily loop begins");
            self.daily_command_loop(registry, env)?;
            env.hooks.on_day_end(self.day);
        }
        Ok(())
    }

    /// Advances the day counter and runs one daily loop outside
    /// [`Scheduler::process_orders`]; the stepping entry point for tests
    /// and tools.
    pub fn run_day(
        &mut self,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        self.day = self.day.next();
        self.daily_command_loop(registry, env)
    }

    /// One simulated day: dispatch, tick, then clear the one-day
    /// suspensions (they are applied fresh each day by whichever logic set
    /// them).
    pub fn daily_command_loop(
        &mut self,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        self.hostile_sweep_fired = false;
        self.start_phase(registry, env)?;
        self.evening_phase(registry, env)?;
        for rec in self.records.values_mut() {
            rec.second_wait = 0;
        }
        Ok(())
    }

    /// Honors interruptions requested while a previous turn was processing.
    fn resume_interrupted(
        &mut self,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        let mut flagged: Vec<EntityId> = self
            .records
            .iter()
            .filter(|(_, rec)| rec.pending_interrupt)
            .map(|(&entity, _)| entity)
            .collect();
        flagged.sort_unstable();

        for entity in flagged {
            if let Some(rec) = self.records.get_mut(&entity) {
                rec.pending_interrupt = false;
            }
            self.interrupt(entity, registry, env)?;
        }
        Ok(())
    }

    /// Faction-level commands take zero days; the whole queue runs
    /// synchronously before the first day starts.
    fn run_faction_commands(
        &mut self,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        self.immediate = true;
        let outcome = (|| {
            for faction in env.world.factions() {
                loop {
                    let Some(state) = self.records.get(&faction).map(|rec| rec.state) else {
                        break;
                    };
                    match state {
                        CommandState::Load | CommandState::Error => {
                            self.start(faction, registry, env)?;
                        }
                        CommandState::Done => {
                            if self.load(faction, registry, env) == LoadResult::NoCommand {
                                break;
                            }
                        }
                        // a faction command that somehow carries a wait is
                        // left to the daily loops
                        CommandState::Run => break,
                    }
                }
            }
            Ok(())
        })();
        self.immediate = false;
        outcome
    }
}
