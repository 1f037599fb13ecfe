//! Synchronous single-threaded wiring of the engine and its collaborators.

use turn_core::{
    CommandBehavior, CommandSpec, Opcode, RegistryError, Scheduler, SchedulerConfig,
    SchedulerError, SimEnv,
};

use crate::commands::base_registry;
use crate::notices::{DispatchLog, HookLog, NoticeLog};
use crate::orders::OrderBook;
use crate::world::WorldTable;

/// Errors surfaced by the runtime layer.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("turn processing failed: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("command registration failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Bundle owning the scheduler, the command registry, and every in-memory
/// collaborator, with turn- and day-level entry points.
///
/// Fields are public: tests and tools populate the world table and order
/// book directly and read the logs back out.
pub struct SimRuntime {
    scheduler: Scheduler,
    registry: turn_core::CommandRegistry,
    pub orders: OrderBook,
    pub world: WorldTable,
    pub notices: NoticeLog,
    pub hooks: HookLog,
    pub trace: DispatchLog,
}

impl SimRuntime {
    pub fn new() -> Result<Self, RuntimeError> {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Result<Self, RuntimeError> {
        Ok(Self {
            scheduler: Scheduler::new(config),
            registry: base_registry()?,
            orders: OrderBook::new(),
            world: WorldTable::new(),
            notices: NoticeLog::new(),
            hooks: HookLog::new(),
            trace: DispatchLog::new(),
        })
    }

    /// Registers a game command alongside the built-ins.
    pub fn register_command(
        &mut self,
        name: &str,
        opcode: Opcode,
        spec: CommandSpec,
        behavior: Box<dyn CommandBehavior>,
    ) -> Result<(), RuntimeError> {
        self.registry.register(name, opcode, spec, behavior)?;
        Ok(())
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Processes one full game turn.
    pub fn run_turn(&mut self) -> Result<(), RuntimeError> {
        let mut env = SimEnv {
            orders: &mut self.orders,
            world: &self.world,
            notices: &mut self.notices,
            hooks: &mut self.hooks,
            recorder: &mut self.trace,
        };
        self.scheduler.process_orders(&self.registry, &mut env)?;
        Ok(())
    }

    /// Advances exactly one day; for stepped tests and tools.
    pub fn run_day(&mut self) -> Result<(), RuntimeError> {
        let mut env = SimEnv {
            orders: &mut self.orders,
            world: &self.world,
            notices: &mut self.notices,
            hooks: &mut self.hooks,
            recorder: &mut self.trace,
        };
        self.scheduler
            .run_day(&self.registry, &mut env)
            .map_err(SchedulerError::from)?;
        Ok(())
    }

    /// JSON dump of every command record, for debugging turn reports.
    pub fn dump_records(&self) -> serde_json::Value {
        let records: Vec<_> = self.scheduler.records().collect();
        serde_json::to_value(records).unwrap_or(serde_json::Value::Null)
    }

    /// JSON dump of the world table, the other half of a turn report.
    pub fn dump_units(&self) -> serde_json::Value {
        serde_json::to_value(&self.world).unwrap_or(serde_json::Value::Null)
    }
}

/// Installs the process-wide tracing subscriber, honoring `RUST_LOG`.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
