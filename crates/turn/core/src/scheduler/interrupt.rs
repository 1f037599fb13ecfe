//! Forced termination and stack-wide movement suspension.

use crate::command::CommandRegistry;
use crate::env::{DispatchEvent, SimEnv, WorldOracle};
use crate::state::{CommandState, EntityId};

use super::{InvariantError, Scheduler};

impl Scheduler {
    /// Terminates the entity's running command early, bypassing any
    /// remaining wait.
    ///
    /// A stack leader that is no longer mid-move first has its suspended
    /// subordinates restored. If the record is running, the interrupt
    /// callback fires exactly once, its result becomes the final status,
    /// and the record must leave `Run`.
    pub fn interrupt(
        &mut self,
        entity: EntityId,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        if env.world.is_stack_leader(entity) && !env.world.is_moving(entity) {
            self.restore_stack(entity, env.world);
        }

        let running = self
            .records
            .get(&entity)
            .map(|rec| rec.state == CommandState::Run)
            .unwrap_or(false);
        if !running {
            return Ok(());
        }

        let opcode = self
            .records
            .get(&entity)
            .and_then(|rec| rec.opcode)
            .ok_or(InvariantError::NoOpcode(entity))?;

        tracing::debug!(%entity, %opcode, day = %self.day, "command interrupted");
        let status = self.with_entry(entity, registry, env, |entry, ctx| {
            entry.behavior.interrupt(ctx)
        })?;
        self.ensure_record(entity).status = status;
        env.recorder
            .record(self.day, entity, DispatchEvent::Interrupted(opcode));

        self.command_done(entity, registry, env)?;

        let rec = self
            .records
            .get(&entity)
            .ok_or(InvariantError::MissingRecord(entity))?;
        if rec.state == CommandState::Run {
            return Err(InvariantError::InterruptStuck(entity));
        }
        Ok(())
    }

    /// Marks every subordinate of `leader` as moving from today, pausing
    /// their finish ticks (wait-completion checks excepted) so the whole
    /// stack pauses together without individual wait counters drifting.
    pub fn suspend_stack(&mut self, leader: EntityId, world: &dyn WorldOracle) {
        let today = self.day;
        for member in world.stack_members(leader) {
            if member == leader {
                continue;
            }
            self.ensure_record(member).moving_since = Some(today);
        }
    }

    /// Clears the movement markers set by [`Scheduler::suspend_stack`].
    pub fn restore_stack(&mut self, leader: EntityId, world: &dyn WorldOracle) {
        for member in world.stack_members(leader) {
            if let Some(rec) = self.records.get_mut(&member) {
                rec.moving_since = None;
            }
        }
    }
}
