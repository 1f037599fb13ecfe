//! Command identity, dispatch specs, and the behavior seam.
//!
//! The scheduler never inspects command-specific logic: every command is an
//! opcode mapped by the [`CommandRegistry`] to a static [`CommandSpec`] and a
//! [`CommandBehavior`] strategy object whose three callbacks (start, finish,
//! interrupt) are the only entry points the engine calls.

mod registry;

pub use registry::{CommandEntry, CommandRegistry, RegistryError, WAIT_COMMAND};

use std::fmt;

use crate::env::{NoticeSink, WorldOracle};
use crate::state::{CommandRecord, Day, EntityId};

/// Identity of a registered command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opcode(pub u16);

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// Kind of actor an entity is, for command permission checks.
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
pub enum ActorKind {
    /// Player-controlled unit in the world.
    #[default]
    Character,
    /// Player/faction meta-entity; its commands are all zero-duration.
    Faction,
    /// Autonomous world-controlled unit.
    Npc,
}

bitflags::bitflags! {
    /// Allow mask naming which actor kinds may issue a command.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ActorKinds: u8 {
        const CHARACTER = 1 << 0;
        const FACTION   = 1 << 1;
        const NPC       = 1 << 2;
    }
}

impl ActorKinds {
    /// Mask admitting every actor kind.
    pub const ANY: Self = Self::all();

    pub fn admits(self, kind: ActorKind) -> bool {
        self.contains(match kind {
            ActorKind::Character => Self::CHARACTER,
            ActorKind::Faction => Self::FACTION,
            ActorKind::Npc => Self::NPC,
        })
    }
}

/// Static dispatch data for one command, copied into the record at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    /// Dispatch priority; lower numbers start first.
    pub priority: usize,
    /// Base duration in days; 0 completes the day it starts, negative parks
    /// the command until an external condition (see `WAIT_FOREVER`).
    pub base_duration: i32,
    /// Whether finish runs every evening rather than only at wait expiry.
    pub poll: bool,
    /// Who may issue this command.
    pub allowed: ActorKinds,
}

impl CommandSpec {
    pub fn new(priority: usize, base_duration: i32) -> Self {
        Self {
            priority,
            base_duration,
            poll: false,
            allowed: ActorKinds::ANY,
        }
    }

    pub fn polled(mut self) -> Self {
        self.poll = true;
        self
    }

    pub fn allowed_to(mut self, allowed: ActorKinds) -> Self {
        self.allowed = allowed;
        self
    }
}

/// Context handed to a command callback.
///
/// Gives the command its owner's record (mutably, so logic may adjust the
/// wait/poll/status knobs mid-flight), the current day, and the read-only
/// world plus the notice sink. Command-specific argument fields live behind
/// the behavior object; the engine never sees them.
pub struct CommandCtx<'a> {
    pub owner: EntityId,
    pub today: Day,
    pub record: &'a mut CommandRecord,
    pub world: &'a dyn WorldOracle,
    pub notices: &'a mut dyn NoticeSink,
}

/// Strategy object implementing one command's game logic.
///
/// The defaults make a no-op command that starts successfully, completes
/// successfully, and tolerates interruption, so trivial commands override
/// nothing.
pub trait CommandBehavior {
    /// Invoked when the day scheduler dispatches the command. Returning
    /// `false` fails the command before it ever runs.
    fn start(&self, _ctx: &mut CommandCtx<'_>) -> bool {
        true
    }

    /// Invoked when the wait expires, or every evening for polled commands.
    /// Returning `false` ends the command immediately, remaining wait or not.
    fn finish(&self, _ctx: &mut CommandCtx<'_>) -> bool {
        true
    }

    /// Invoked on forced termination; the return value becomes the record's
    /// final status.
    fn interrupt(&self, _ctx: &mut CommandCtx<'_>) -> bool {
        true
    }

    /// Cheap completion probe for commands parked on the wait fast-path
    /// list. When it reports true, the engine runs `finish` out of band so
    /// the completion fires even for entities the evening sweep skipped.
    fn wait_satisfied(&self, _record: &CommandRecord, _world: &dyn WorldOracle, _today: Day) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_mask_admits_by_kind() {
        let mask = ActorKinds::FACTION | ActorKinds::NPC;
        assert!(mask.admits(ActorKind::Faction));
        assert!(mask.admits(ActorKind::Npc));
        assert!(!mask.admits(ActorKind::Character));
        assert!(ActorKinds::ANY.admits(ActorKind::Character));
    }

    #[test]
    fn spec_builder_sets_knobs() {
        let spec = CommandSpec::new(2, 3)
            .polled()
            .allowed_to(ActorKinds::CHARACTER);
        assert_eq!(spec.priority, 2);
        assert_eq!(spec.base_duration, 3);
        assert!(spec.poll);
        assert!(!spec.allowed.admits(ActorKind::Faction));
    }
}
