use std::collections::HashMap;

use super::{CommandBehavior, CommandSpec, Opcode};

/// Name of the reserved wait command the turn driver resolves every turn.
pub const WAIT_COMMAND: &str = "wait";

/// One registered command: its static spec plus its behavior strategy.
pub struct CommandEntry {
    pub spec: CommandSpec,
    pub behavior: Box<dyn CommandBehavior>,
}

/// Registry mapping opcodes (and names, for resolution) to command entries.
///
/// The engine is decoupled from the several hundred concrete command
/// implementations: it looks up specs at load time and calls the behavior's
/// three callbacks, nothing else.
#[derive(Default)]
pub struct CommandRegistry {
    entries: HashMap<Opcode, CommandEntry>,
    names: HashMap<String, Opcode>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("opcode {0} registered twice")]
    DuplicateOpcode(Opcode),
    #[error("command name {0:?} registered twice")]
    DuplicateName(String),
    #[error("no command registered under name {0:?}")]
    UnknownName(String),
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        opcode: Opcode,
        spec: CommandSpec,
        behavior: Box<dyn CommandBehavior>,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(&opcode) {
            return Err(RegistryError::DuplicateOpcode(opcode));
        }
        if self.names.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_owned()));
        }
        self.entries.insert(opcode, CommandEntry { spec, behavior });
        self.names.insert(name.to_owned(), opcode);
        Ok(())
    }

    pub fn get(&self, opcode: Opcode) -> Option<&CommandEntry> {
        self.entries.get(&opcode)
    }

    /// Resolves a command name to its opcode, e.g. the reserved wait command.
    pub fn resolve(&self, name: &str) -> Result<Opcode, RegistryError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownName(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl CommandBehavior for Noop {}

    #[test]
    fn register_and_resolve() {
        let mut reg = CommandRegistry::new();
        reg.register(WAIT_COMMAND, Opcode(1), CommandSpec::new(1, -1), Box::new(Noop))
            .unwrap();
        assert_eq!(reg.resolve(WAIT_COMMAND), Ok(Opcode(1)));
        assert!(reg.get(Opcode(1)).is_some());
        assert_eq!(
            reg.resolve("march"),
            Err(RegistryError::UnknownName("march".into()))
        );
    }

    #[test]
    fn duplicate_registration_is_refused() {
        let mut reg = CommandRegistry::new();
        reg.register("a", Opcode(1), CommandSpec::new(0, 0), Box::new(Noop))
            .unwrap();
        assert_eq!(
            reg.register("b", Opcode(1), CommandSpec::new(0, 0), Box::new(Noop)),
            Err(RegistryError::DuplicateOpcode(Opcode(1)))
        );
        assert_eq!(
            reg.register("a", Opcode(2), CommandSpec::new(0, 0), Box::new(Noop)),
            Err(RegistryError::DuplicateName("a".into()))
        );
    }
}
