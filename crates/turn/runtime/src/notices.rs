//! Notice log, dispatch trace, and day-hook recorder.
//!
//! These double as the engine's concrete collaborators in production-style
//! wiring and as the spies the ordering tests assert on.

use turn_core::{Day, DayHooks, DispatchEvent, DispatchRecorder, EntityId, Notice, NoticeSink};

/// Collects lifecycle notices per entity.
#[derive(Debug, Default)]
pub struct NoticeLog {
    entries: Vec<(EntityId, Notice)>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(EntityId, Notice)] {
        &self.entries
    }

    pub fn for_entity(&self, entity: EntityId) -> Vec<&Notice> {
        self.entries
            .iter()
            .filter(|(id, _)| *id == entity)
            .map(|(_, notice)| notice)
            .collect()
    }
}

impl NoticeSink for NoticeLog {
    fn notify(&mut self, entity: EntityId, notice: Notice) {
        tracing::info!(%entity, ?notice, "lifecycle notice");
        self.entries.push((entity, notice));
    }
}

/// Records every dispatch event the engine emits, in order.
#[derive(Debug, Default)]
pub struct DispatchLog {
    events: Vec<(Day, EntityId, DispatchEvent)>,
}

impl DispatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[(Day, EntityId, DispatchEvent)] {
        &self.events
    }

    /// Entities in the order their commands started, across all days.
    pub fn start_order(&self) -> Vec<EntityId> {
        self.events
            .iter()
            .filter(|(_, _, event)| matches!(event, DispatchEvent::Started(_)))
            .map(|(_, entity, _)| *entity)
            .collect()
    }

    /// Finish events for one entity, as (day, opcode-bearing event) pairs.
    pub fn finishes_of(&self, entity: EntityId) -> Vec<Day> {
        self.events
            .iter()
            .filter(|(_, id, event)| *id == entity && matches!(event, DispatchEvent::Finished(_)))
            .map(|(day, _, _)| *day)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DispatchRecorder for DispatchLog {
    fn record(&mut self, day: Day, entity: EntityId, event: DispatchEvent) {
        self.events.push((day, entity, event));
    }
}

/// Day-hook recorder: remembers when the hostile sweep and day-end hooks
/// fired.
#[derive(Debug, Default)]
pub struct HookLog {
    pub hostile_sweeps: Vec<Day>,
    pub days_ended: Vec<Day>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DayHooks for HookLog {
    fn on_hostile_sweep(&mut self, day: Day) {
        self.hostile_sweeps.push(day);
    }

    fn on_day_end(&mut self, day: Day) {
        self.days_ended.push(day);
    }
}
