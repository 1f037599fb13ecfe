//! Shared fixtures for the scheduler integration tests.
#![allow(dead_code)]

use turn_core::{CommandBehavior, CommandCtx, SimEnv};
use turn_runtime::{DispatchLog, HookLog, NoticeLog, OrderBook, WorldTable};

/// The engine's collaborators, bundled so each test statement can borrow
/// them as a fresh [`SimEnv`].
#[derive(Default)]
pub struct Collab {
    pub orders: OrderBook,
    pub world: WorldTable,
    pub notices: NoticeLog,
    pub hooks: HookLog,
    pub trace: DispatchLog,
}

impl Collab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(&mut self) -> SimEnv<'_> {
        SimEnv {
            orders: &mut self.orders,
            world: &self.world,
            notices: &mut self.notices,
            hooks: &mut self.hooks,
            recorder: &mut self.trace,
        }
    }
}

/// Command that starts, runs, and ends without any game logic.
pub struct Plain;

impl CommandBehavior for Plain {}

/// Command whose start callback refuses to run.
pub struct FailStart;

impl CommandBehavior for FailStart {
    fn start(&self, _ctx: &mut CommandCtx<'_>) -> bool {
        false
    }
}

/// Command whose finish callback reports failure, ending the command at its
/// first tick regardless of remaining wait.
pub struct FailFinish;

impl CommandBehavior for FailFinish {
    fn finish(&self, _ctx: &mut CommandCtx<'_>) -> bool {
        false
    }
}
