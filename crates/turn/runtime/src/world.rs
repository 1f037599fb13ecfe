//! In-memory world table backing the engine's read-only oracle.

use std::collections::BTreeMap;

use turn_core::{ActorKind, EntityId, WorldOracle};

/// Everything the scheduler may ask about one entity.
#[derive(Clone, Debug, serde::Serialize)]
pub struct UnitInfo {
    pub kind: ActorKind,
    pub alive: bool,
    pub prisoner: bool,
    /// True while the entity itself is mid multi-day transit.
    pub moving: bool,
    /// Stack parent; `None` for leaders and unstacked units.
    pub parent: Option<EntityId>,
    /// Stable position within the entity's location.
    pub position: u32,
}

impl UnitInfo {
    pub fn character(position: u32) -> Self {
        Self {
            kind: ActorKind::Character,
            alive: true,
            prisoner: false,
            moving: false,
            parent: None,
            position,
        }
    }

    pub fn npc(position: u32) -> Self {
        Self {
            kind: ActorKind::Npc,
            ..Self::character(position)
        }
    }

    pub fn stacked_under(mut self, leader: EntityId) -> Self {
        self.parent = Some(leader);
        self
    }
}

/// World store implementing [`WorldOracle`] over plain maps.
///
/// A `BTreeMap` keeps `units()` in deterministic id order, matching the
/// engine's reproducibility requirements.
#[derive(Debug, Default, serde::Serialize)]
pub struct WorldTable {
    units: BTreeMap<EntityId, UnitInfo>,
    factions: Vec<EntityId>,
}

impl WorldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, entity: EntityId, info: UnitInfo) {
        self.units.insert(entity, info);
    }

    pub fn add_faction(&mut self, entity: EntityId) {
        self.factions.push(entity);
        self.units.insert(
            entity,
            UnitInfo {
                kind: ActorKind::Faction,
                ..UnitInfo::character(0)
            },
        );
    }

    pub fn unit_mut(&mut self, entity: EntityId) -> Option<&mut UnitInfo> {
        self.units.get_mut(&entity)
    }

    pub fn set_moving(&mut self, entity: EntityId, moving: bool) {
        if let Some(info) = self.units.get_mut(&entity) {
            info.moving = moving;
        }
    }

    pub fn kill(&mut self, entity: EntityId) {
        if let Some(info) = self.units.get_mut(&entity) {
            info.alive = false;
        }
    }

    fn children(&self, parent: EntityId) -> Vec<EntityId> {
        let mut kids: Vec<_> = self
            .units
            .iter()
            .filter(|(_, info)| info.parent == Some(parent))
            .map(|(&id, info)| (info.position, id))
            .collect();
        kids.sort_unstable();
        kids.into_iter().map(|(_, id)| id).collect()
    }
}

impl WorldOracle for WorldTable {
    fn is_alive(&self, entity: EntityId) -> bool {
        self.units.get(&entity).is_some_and(|info| info.alive)
    }

    fn is_prisoner(&self, entity: EntityId) -> bool {
        self.units.get(&entity).is_some_and(|info| info.prisoner)
    }

    fn is_moving(&self, entity: EntityId) -> bool {
        self.units.get(&entity).is_some_and(|info| info.moving)
    }

    fn actor_kind(&self, entity: EntityId) -> ActorKind {
        self.units
            .get(&entity)
            .map(|info| info.kind)
            .unwrap_or_default()
    }

    fn stack_depth(&self, entity: EntityId) -> u32 {
        let mut depth = 0;
        let mut cursor = entity;
        while let Some(parent) = self.units.get(&cursor).and_then(|info| info.parent) {
            depth += 1;
            cursor = parent;
        }
        depth
    }

    fn location_position(&self, entity: EntityId) -> u32 {
        self.units.get(&entity).map_or(0, |info| info.position)
    }

    fn is_stack_leader(&self, entity: EntityId) -> bool {
        self.units
            .values()
            .any(|info| info.parent == Some(entity))
    }

    fn stack_members(&self, leader: EntityId) -> Vec<EntityId> {
        // depth-first, children in position order, so sub-leaders precede
        // their own members
        let mut members = Vec::new();
        let mut pending = self.children(leader);
        pending.reverse();
        while let Some(member) = pending.pop() {
            members.push(member);
            let mut kids = self.children(member);
            kids.reverse();
            pending.extend(kids);
        }
        members
    }

    fn units(&self) -> Vec<EntityId> {
        self.units
            .iter()
            .filter(|(_, info)| info.kind != ActorKind::Faction)
            .map(|(&id, _)| id)
            .collect()
    }

    fn factions(&self) -> Vec<EntityId> {
        self.factions.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_members_run_depth_first_in_position_order() {
        let mut world = WorldTable::new();
        let leader = EntityId(1);
        world.add_unit(leader, UnitInfo::character(0));
        world.add_unit(EntityId(2), UnitInfo::character(2).stacked_under(leader));
        world.add_unit(EntityId(3), UnitInfo::character(1).stacked_under(leader));
        world.add_unit(EntityId(4), UnitInfo::character(0).stacked_under(EntityId(3)));

        assert_eq!(
            world.stack_members(leader),
            vec![EntityId(3), EntityId(4), EntityId(2)]
        );
        assert!(world.is_stack_leader(leader));
        assert_eq!(world.stack_depth(EntityId(4)), 2);
    }

    #[test]
    fn unit_info_serializes_for_debug_dumps() {
        let info = UnitInfo::npc(3).stacked_under(EntityId(1));
        let value = serde_json::to_value(&info).expect("serializes");
        assert_eq!(value["kind"], "Npc");
        assert_eq!(value["position"], 3);
        assert_eq!(value["parent"], 1);
    }
}
