use crate::command::Opcode;
use crate::config::WAIT_FOREVER;

use super::{Day, EntityId, Priority};

/// Lifecycle state of an entity's current command.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CommandState {
    /// No command loaded; the order queue was empty at the last load.
    #[default]
    Done,
    /// A command is parsed and queued, waiting for the day scheduler.
    Load,
    /// The last order failed to parse; the failure is surfaced once when the
    /// day scheduler reaches the entity, then the next order is loaded.
    Error,
    /// The command has started and is counting down its wait.
    Run,
}

/// Per-entity scheduling state for the entity's current command.
///
/// Created lazily the first time the scheduler touches the entity and reused
/// for the entity's entire lifetime; it is never destroyed while the entity
/// exists. Queue membership is derived from `state`: a record sits in the
/// load queue for its priority while `Load`/`Error` and in the run queue
/// while `Run`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandRecord {
    /// Entity this record schedules.
    pub owner: EntityId,

    /// Lifecycle state; drives queue membership.
    pub state: CommandState,

    /// Identity of the currently loaded command, `None` between commands.
    pub opcode: Option<Opcode>,

    /// Original order text of the current command, echoed in failure
    /// notices.
    pub line: String,

    /// Priority copied from the command spec at load time. Retained across
    /// a parse failure, so an `Error` record queues at its old level.
    pub priority: Priority,

    /// Remaining simulated days before the finish callback is mandatory;
    /// [`WAIT_FOREVER`] parks the command until an external condition.
    pub wait: i32,

    /// Whether finish runs every evening while waiting, rather than only
    /// once the wait reaches zero.
    pub poll: bool,

    /// Evenings this running command has been ticked; reset on every start.
    pub days_executing: u32,

    /// Boolean result of the most recent start/finish invocation. `false`
    /// ends the command at the next completion check.
    pub status: bool,

    /// One-day suspension applied after combat and similar events,
    /// independent of `wait`. Cleared at the end of every daily loop.
    pub second_wait: u32,

    /// Day stamp of the last finish tick; a second finish on the same day is
    /// a scheduler bug and surfaces as an invariant error.
    pub last_tick_day: Option<Day>,

    /// Set while the entity's stack leader is mid multi-day move; finish is
    /// skipped (except wait-completion checks) until the marker clears.
    pub moving_since: Option<Day>,

    /// Set when an interruption was requested during a previous turn's
    /// processing; honored by the next turn's setup.
    pub pending_interrupt: bool,
}

impl CommandRecord {
    /// Fresh record for `owner` with nothing loaded.
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            state: CommandState::Done,
            opcode: None,
            line: String::new(),
            priority: 0,
            wait: 0,
            poll: false,
            days_executing: 0,
            status: true,
            second_wait: 0,
            last_tick_day: None,
            moving_since: None,
            pending_interrupt: false,
        }
    }

    /// True if the record holds a command awaiting dispatch (including a
    /// parse failure awaiting its one report).
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, CommandState::Load | CommandState::Error)
    }

    /// True if the wait sentinel parks this command until an external
    /// condition.
    pub fn runs_until_stopped(&self) -> bool {
        self.wait == WAIT_FOREVER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_is_done_and_healthy() {
        let rec = CommandRecord::new(EntityId(7));
        assert_eq!(rec.state, CommandState::Done);
        assert!(rec.status);
        assert_eq!(rec.opcode, None);
        assert!(!rec.is_loaded());
    }

    #[test]
    fn state_names_serialize_snake_case() {
        assert_eq!(CommandState::Load.to_string(), "load");
        assert_eq!(CommandState::Error.to_string(), "error");
    }
}
