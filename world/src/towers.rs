//! Authoritative tower state and identifier allocation.

use std::collections::BTreeMap;

use glam::Vec2;
use tower_defence_core::{
    Enhancement, MonsterId, Properties, TileCoord, TileRect, TowerId, TowerInfo,
};
use tower_defence_system_tower_combat::Cooldown;

use crate::catalog::AttackStyle;

/// A tower standing on the grid.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    pub(crate) id: TowerId,
    pub(crate) blueprint: String,
    pub(crate) tier: u8,
    pub(crate) base: Properties,
    pub(crate) enhancement: Enhancement,
    /// Cached `base.enhanced(&enhancement)`; refreshed whenever the enhancement changes.
    pub(crate) effective: Properties,
    pub(crate) style: AttackStyle,
    pub(crate) projectile_speed: f32,
    pub(crate) target: Option<MonsterId>,
    pub(crate) focus: Option<TileCoord>,
    pub(crate) kills: u32,
    pub(crate) position: Vec2,
    pub(crate) footprint: TileRect,
    pub(crate) cooldown: Cooldown,
}

impl Tower {
    /// Folds the enhancement back into the effective properties.
    pub(crate) fn refresh(&mut self) {
        self.effective = self.base.enhanced(&self.enhancement);
    }

    pub(crate) fn info(&self) -> TowerInfo {
        TowerInfo {
            tower: self.id,
            blueprint: self.blueprint.clone(),
            tier: self.tier,
            kills: self.kills,
            properties: self.effective.clone(),
            target: self.target,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Reserves the next unused identifier.
    pub(crate) fn allocate(&mut self) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        id
    }

    /// Stores a tower under its identifier.
    ///
    /// # Panics
    ///
    /// Panics if a tower with the same identifier is already registered.
    pub(crate) fn insert(&mut self, tower: Tower) {
        let id = tower.id;
        if self.entries.insert(id, tower).is_some() {
            panic!("tower {} inserted twice", id.get());
        }
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn ids(&self) -> Vec<TowerId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops `monster` from every tower's target cache.
    pub(crate) fn forget_target(&mut self, monster: MonsterId) {
        for tower in self.entries.values_mut() {
            if tower.target == Some(monster) {
                tower.target = None;
            }
        }
    }

    pub(crate) fn clear_targets(&mut self) {
        for tower in self.entries.values_mut() {
            tower.target = None;
        }
    }
}
