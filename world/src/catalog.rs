//! Tower blueprints injected into the world at construction time.

use std::{collections::BTreeMap, time::Duration};

use tower_defence_core::{DamageRange, DamageTable, DamageType, Effect, Properties};

/// How attacks fired by a tower travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackStyle {
    /// Flies toward the point where the target stood at firing time.
    Fixed,
    /// Follows the target until it hits or the target disappears.
    Homing,
}

/// Stats of one blueprint tier.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerStats {
    /// Base properties before enhancement.
    pub properties: Properties,
    /// Movement policy of fired attacks.
    pub style: AttackStyle,
    /// Attack travel speed in normalized map units per second.
    pub projectile_speed: f32,
    /// Edge length of the square footprint in tiles.
    pub footprint: u32,
}

/// Named tower design with one stat block per tier.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerBlueprint {
    /// Unique blueprint name used by build intents.
    pub name: String,
    /// Stats indexed by tier, starting at tier 1.
    pub tiers: Vec<TowerStats>,
}

/// Registry of buildable tower blueprints.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TowerCatalog {
    blueprints: BTreeMap<String, TowerBlueprint>,
}

impl TowerCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blueprint, replacing any previous one with the same name.
    pub fn insert(&mut self, blueprint: TowerBlueprint) {
        let _ = self.blueprints.insert(blueprint.name.clone(), blueprint);
    }

    /// Builder-style variant of [`TowerCatalog::insert`].
    #[must_use]
    pub fn with(mut self, blueprint: TowerBlueprint) -> Self {
        self.insert(blueprint);
        self
    }

    /// Looks up the stats of a 1-based tier of a blueprint.
    #[must_use]
    pub fn tier(&self, blueprint: &str, tier: u8) -> Option<&TowerStats> {
        let index = usize::from(tier.checked_sub(1)?);
        self.blueprints.get(blueprint)?.tiers.get(index)
    }

    /// Iterates over registered blueprints in name order.
    pub fn blueprints(&self) -> impl Iterator<Item = &TowerBlueprint> {
        self.blueprints.values()
    }

    /// Catalog with the three stock towers: `arrow`, `frost` and `cannon`.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(TowerBlueprint {
                name: "arrow".to_owned(),
                tiers: vec![
                    stock(
                        DamageTable::single(DamageType::Physical, DamageRange::new(6.0, 10.0)),
                        1.5,
                        0.2,
                        AttackStyle::Fixed,
                        1,
                    ),
                    stock(
                        DamageTable::single(DamageType::Physical, DamageRange::new(12.0, 18.0)),
                        2.0,
                        0.25,
                        AttackStyle::Fixed,
                        1,
                    ),
                ],
            })
            .with(TowerBlueprint {
                name: "frost".to_owned(),
                tiers: vec![TowerStats {
                    properties: Properties {
                        on_hit: vec![Effect::Slow {
                            factor: 0.5,
                            duration: Duration::from_secs(2),
                        }],
                        ..stock_properties(
                            DamageTable::single(DamageType::Frost, DamageRange::new(3.0, 5.0)),
                            1.0,
                            0.2,
                        )
                    },
                    style: AttackStyle::Homing,
                    projectile_speed: 0.6,
                    footprint: 1,
                }],
            })
            .with(TowerBlueprint {
                name: "cannon".to_owned(),
                tiers: vec![TowerStats {
                    properties: Properties {
                        on_death: vec![Effect::Burst {
                            kind: DamageType::Fire,
                            amount: 15.0,
                        }],
                        ..stock_properties(
                            DamageTable::single(DamageType::Fire, DamageRange::new(20.0, 30.0)),
                            0.5,
                            0.3,
                        )
                    },
                    style: AttackStyle::Fixed,
                    projectile_speed: 0.4,
                    footprint: 2,
                }],
            })
    }
}

fn stock_properties(damage: DamageTable, attack_speed: f32, range: f32) -> Properties {
    Properties {
        damage,
        attack_speed,
        range,
        crit_chance: 0.05,
        crit_multiplier: 2.0,
        on_hit: Vec::new(),
        on_death: Vec::new(),
    }
}

fn stock(
    damage: DamageTable,
    attack_speed: f32,
    range: f32,
    style: AttackStyle,
    footprint: u32,
) -> TowerStats {
    TowerStats {
        properties: stock_properties(damage, attack_speed, range),
        style,
        projectile_speed: 0.8,
        footprint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_one_based() {
        let catalog = TowerCatalog::standard();
        assert!(catalog.tier("arrow", 0).is_none());
        assert!(catalog.tier("arrow", 1).is_some());
        assert!(catalog.tier("arrow", 2).is_some());
        assert!(catalog.tier("arrow", 3).is_none());
        assert!(catalog.tier("ballista", 1).is_none());
    }

    #[test]
    fn blueprints_iterate_in_name_order() {
        let catalog = TowerCatalog::standard();
        let names: Vec<&str> = catalog
            .blueprints()
            .map(|blueprint| blueprint.name.as_str())
            .collect();
        assert_eq!(names, ["arrow", "cannon", "frost"]);
    }
}
