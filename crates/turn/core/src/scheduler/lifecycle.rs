//! Command lifecycle transitions: load, start, finish, command_done.

use crate::command::CommandRegistry;
use crate::env::{DispatchEvent, Notice, OrderOutcome, SimEnv};
use crate::state::{CommandState, EntityId};

use super::{InvariantError, Scheduler};

/// Whether a load produced a command to surface (including a parse failure,
/// which is still reported once).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadResult {
    NoCommand,
    HasCommand,
}

impl Scheduler {
    /// Pulls the next order line for `entity` and loads it into the record.
    ///
    /// An empty order queue parks the record at `Done`. A malformed line (or
    /// an opcode the registry does not know) parks it at `Error`, queued at
    /// its previous priority so the failure is surfaced once. A good line
    /// copies the command spec into the record and queues it for dispatch.
    pub fn load(
        &mut self,
        entity: EntityId,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> LoadResult {
        let next = env.orders.next_order(entity);
        let wait_opcode = self.wait_opcode;
        let mut parked_wait = false;

        let priority = {
            let rec = self.ensure_record(entity);

            let Some(outcome) = next else {
                rec.state = CommandState::Done;
                rec.opcode = None;
                return LoadResult::NoCommand;
            };

            match outcome {
                OrderOutcome::Malformed(raw) => {
                    tracing::debug!(%entity, line = %raw, "order failed to parse");
                    rec.state = CommandState::Error;
                    rec.opcode = None;
                    rec.line = raw;
                    rec.last_tick_day = None;
                }
                OrderOutcome::Parsed(order) => match registry.get(order.opcode) {
                    None => {
                        tracing::debug!(%entity, opcode = %order.opcode, "unknown opcode");
                        rec.state = CommandState::Error;
                        rec.opcode = None;
                        rec.line = order.raw;
                    }
                    Some(entry) => {
                        rec.state = CommandState::Load;
                        rec.opcode = Some(order.opcode);
                        rec.line = order.raw;
                        rec.priority = entry.spec.priority;
                        rec.wait = entry.spec.base_duration;
                        rec.poll = entry.spec.poll;
                        rec.days_executing = 0;
                        rec.status = true;
                        // a fresh command owns a fresh tick guard; without
                        // this, zero-duration chains would trip the
                        // double-finish invariant
                        rec.last_tick_day = None;
                        parked_wait = wait_opcode == Some(order.opcode);
                    }
                },
            }
            rec.priority
        };

        if parked_wait && !self.wait_list.contains(&entity) {
            self.wait_list.push(entity);
        }
        self.load_queues.push(priority, entity);
        LoadResult::HasCommand
    }

    /// Dispatches the entity's loaded command.
    ///
    /// An `Error` record reports its failure once and completes immediately.
    /// Otherwise the allow mask is checked, the start callback runs, and the
    /// record enters `Run`; a false status completes at once, and a zero
    /// wait proceeds straight to `finish` so zero-duration chains resolve
    /// within the same pass.
    pub fn start(
        &mut self,
        entity: EntityId,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        let (state, priority) = {
            let rec = self
                .records
                .get(&entity)
                .ok_or(InvariantError::MissingRecord(entity))?;
            (rec.state, rec.priority)
        };

        if !matches!(state, CommandState::Load | CommandState::Error) {
            return Err(InvariantError::BadStartState { entity, state });
        }

        // leaving the pending queue either way
        self.load_queues.remove(priority, entity);

        if state == CommandState::Error {
            let rec = self.ensure_record(entity);
            rec.status = false;
            let raw = rec.line.clone();
            env.notices.notify(entity, Notice::UnrecognizedCommand { raw });
            return self.command_done(entity, registry, env);
        }

        let opcode = {
            let rec = self.ensure_record(entity);
            rec.state = CommandState::Run;
            rec.days_executing = 0;
            rec.opcode.ok_or(InvariantError::NoOpcode(entity))?
        };
        self.run_queue.push(entity);

        let entry = registry
            .get(opcode)
            .ok_or(InvariantError::MissingDispatchEntry { entity, opcode })?;
        let allowed = entry.spec.allowed.admits(env.world.actor_kind(entity));

        let status = if allowed {
            self.with_entry(entity, registry, env, |entry, ctx| entry.behavior.start(ctx))?
        } else {
            env.notices.notify(entity, Notice::OrderRefused { opcode });
            false
        };

        let rec = self.ensure_record(entity);
        rec.status = status;
        tracing::debug!(%entity, %opcode, status, day = %self.day, "command started");
        env.recorder
            .record(self.day, entity, DispatchEvent::Started(opcode));

        if !status {
            self.command_done(entity, registry, env)
        } else if self.records[&entity].wait == 0 {
            self.finish(entity, registry, env, false)
        } else {
            Ok(())
        }
    }

    /// One completion tick for a running command.
    ///
    /// At most one tick per simulated day per record; a second is a fatal
    /// invariant violation, not a silent no-op. Dead owners are skipped, as
    /// are entities suspended under a moving stack leader unless this is a
    /// wait-completion check. The finish callback runs when the wait is
    /// spent or the command polls; a false status, or a wait that just hit
    /// zero, completes the command.
    pub fn finish(
        &mut self,
        entity: EntityId,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
        wait_check: bool,
    ) -> Result<(), InvariantError> {
        let today = self.day;
        let (tick_callback, opcode) = {
            let rec = self
                .records
                .get_mut(&entity)
                .ok_or(InvariantError::MissingRecord(entity))?;

            if rec.last_tick_day == Some(today) {
                tracing::warn!(%entity, %today, "finish invoked twice in one day");
                return Err(InvariantError::DoubleFinish { entity, day: today });
            }
            if !env.world.is_alive(entity) {
                return Ok(());
            }
            // the whole stack pauses while its leader is mid-move
            if rec.moving_since.is_some() && !wait_check {
                return Ok(());
            }

            rec.last_tick_day = Some(today);
            if rec.wait > 0 {
                rec.wait -= 1;
            }
            (rec.wait <= 0 || rec.poll, rec.opcode)
        };

        if tick_callback {
            let status =
                self.with_entry(entity, registry, env, |entry, ctx| entry.behavior.finish(ctx))?;
            let rec = self.ensure_record(entity);
            rec.status = status;
            if let Some(opcode) = opcode {
                env.recorder
                    .record(today, entity, DispatchEvent::Finished(opcode));
            }
        }

        let rec = self
            .records
            .get(&entity)
            .ok_or(InvariantError::MissingRecord(entity))?;
        if rec.state == CommandState::Run && (!rec.status || rec.wait == 0) {
            self.command_done(entity, registry, env)?;
        }
        Ok(())
    }

    /// Completion criteria met: leave `Run` and move on.
    ///
    /// In immediate (zero-duration faction) mode the record simply parks at
    /// `Done`. Otherwise the next order is loaded at once, and if it came in
    /// at a more urgent priority than the day scheduler's cursor, the cursor
    /// drops so the new command is considered in the same pass.
    pub(super) fn command_done(
        &mut self,
        entity: EntityId,
        registry: &CommandRegistry,
        env: &mut SimEnv<'_>,
    ) -> Result<(), InvariantError> {
        self.run_queue.remove(entity);
        self.wait_list.retain(|&e| e != entity);

        if self.immediate {
            let rec = self
                .records
                .get_mut(&entity)
                .ok_or(InvariantError::MissingRecord(entity))?;
            rec.state = CommandState::Done;
            return Ok(());
        }

        self.load(entity, registry, env);

        let rec = self
            .records
            .get(&entity)
            .ok_or(InvariantError::MissingRecord(entity))?;
        if rec.is_loaded() && rec.priority < self.cursor {
            tracing::debug!(
                %entity,
                from = self.cursor,
                to = rec.priority,
                "urgent reload lowers the dispatch cursor"
            );
            self.cursor = rec.priority;
        }
        Ok(())
    }
}
