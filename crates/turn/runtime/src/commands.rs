//! Built-in command behaviors the runtime always registers.

use turn_core::{
    CommandBehavior, CommandCtx, CommandRecord, CommandRegistry, CommandSpec, Day, Opcode,
    RegistryError, WAIT_COMMAND, WAIT_FOREVER, WorldOracle,
};

/// Opcode of the reserved wait command.
pub const WAIT_OPCODE: Opcode = Opcode(1);

/// The reserved wait command: park until a target day, or forever.
///
/// `wait <day>` completes once the simulation reaches that day; a bare
/// `wait` runs until interrupted. The target is read back out of the order
/// line, since the engine keeps command arguments opaque.
#[derive(Debug, Default)]
pub struct WaitBehavior;

fn wait_target(line: &str) -> Option<Day> {
    line.split_whitespace().nth(1)?.parse().ok().map(Day)
}

impl CommandBehavior for WaitBehavior {
    fn finish(&self, ctx: &mut CommandCtx<'_>) -> bool {
        if let Some(target) = wait_target(&ctx.record.line) {
            if ctx.today >= target {
                // reaching the target completes the command this tick
                ctx.record.wait = 0;
            }
        }
        true
    }

    fn wait_satisfied(&self, record: &CommandRecord, _world: &dyn WorldOracle, today: Day) -> bool {
        wait_target(&record.line).is_some_and(|target| today >= target)
    }
}

/// Registry pre-loaded with the reserved commands the turn driver expects.
pub fn base_registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.register(
        WAIT_COMMAND,
        WAIT_OPCODE,
        CommandSpec::new(1, WAIT_FOREVER),
        Box::new(WaitBehavior),
    )?;
    Ok(registry)
}
