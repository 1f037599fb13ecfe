use crate::config::MAX_PRIORITY;

use super::{EntityId, Priority};

/// One pending-dispatch queue per priority level.
///
/// Holds entity ids, never record copies. Membership invariant: an entity is
/// in `level(p)` iff its record is `Load`/`Error` with `priority == p`. The
/// queues preserve insertion order; the day scheduler sorts a snapshot by
/// precedence key before dispatching, so insertion order is not game-visible.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadQueues {
    levels: [Vec<EntityId>; MAX_PRIORITY],
}

impl LoadQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, priority: Priority, entity: EntityId) {
        debug_assert!(!self.levels[priority].contains(&entity));
        self.levels[priority].push(entity);
    }

    /// Removes `entity` from `priority`'s queue; true if it was present.
    pub fn remove(&mut self, priority: Priority, entity: EntityId) -> bool {
        let level = &mut self.levels[priority];
        match level.iter().position(|&e| e == entity) {
            Some(idx) => {
                level.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, priority: Priority, entity: EntityId) -> bool {
        self.levels[priority].contains(&entity)
    }

    /// Entities queued at `priority`, in insertion order.
    pub fn level(&self, priority: Priority) -> &[EntityId] {
        &self.levels[priority]
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }
}

/// Entities whose command has started and is counting down its wait.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunQueue {
    entities: Vec<EntityId>,
}

impl RunQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: EntityId) {
        debug_assert!(!self.entities.contains(&entity));
        self.entities.push(entity);
    }

    pub fn remove(&mut self, entity: EntityId) -> bool {
        match self.entities.iter().position(|&e| e == entity) {
            Some(idx) => {
                self.entities.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Point-in-time copy for safe iteration while commands re-queue
    /// entities mid-sweep.
    pub fn snapshot(&self) -> Vec<EntityId> {
        self.entities.clone()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_queue_membership_tracks_removal() {
        let mut queues = LoadQueues::new();
        queues.push(2, EntityId(1));
        queues.push(2, EntityId(2));
        assert!(queues.contains(2, EntityId(1)));
        assert!(queues.remove(2, EntityId(1)));
        assert!(!queues.remove(2, EntityId(1)));
        assert_eq!(queues.level(2), &[EntityId(2)]);
    }

    #[test]
    fn run_queue_snapshot_is_detached() {
        let mut run = RunQueue::new();
        run.push(EntityId(3));
        let snap = run.snapshot();
        run.remove(EntityId(3));
        assert_eq!(snap, vec![EntityId(3)]);
        assert!(run.is_empty());
    }
}
