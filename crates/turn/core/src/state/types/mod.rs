mod common;
mod queues;
mod record;

pub use common::{Day, EntityId, Priority};
pub use queues::{LoadQueues, RunQueue};
pub use record::{CommandRecord, CommandState};
