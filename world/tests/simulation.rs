use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{
    Armor, ArmorKind, DamageRange, DamageTable, DamageType, Effect, Event, Intent,
    ModifierPayload, MonsterId, Properties, RemovalCause, StatModifier, TileCoord, TowerId,
};
use tower_defence_world::{
    apply, query, AttackStyle, GameConfig, MonsterTemplate, TowerBlueprint, TowerCatalog,
    TowerStats, World,
};

const DT: Duration = Duration::from_nanos(33_333_333);

fn config() -> GameConfig {
    GameConfig {
        map_width: 100,
        map_height: 100,
        tile_size: 10,
        spawn: TileCoord::new(0, 9),
        destination: TileCoord::new(9, 9),
        ..GameConfig::default()
    }
}

fn stats(style: AttackStyle) -> TowerStats {
    TowerStats {
        properties: Properties {
            damage: DamageTable::single(DamageType::Physical, DamageRange::fixed(5.0)),
            attack_speed: 1.0,
            range: 0.25,
            crit_chance: 0.0,
            crit_multiplier: 1.0,
            on_hit: Vec::new(),
            on_death: Vec::new(),
        },
        style,
        projectile_speed: 3.0,
        footprint: 1,
    }
}

fn catalog() -> TowerCatalog {
    let mut burst = stats(AttackStyle::Fixed);
    burst.properties.on_death.push(Effect::Burst {
        kind: DamageType::Fire,
        amount: 4.0,
    });
    let mut frost = stats(AttackStyle::Homing);
    frost.properties.on_hit.push(Effect::Slow {
        factor: 0.5,
        duration: Duration::from_secs(3),
    });

    TowerCatalog::new()
        .with(TowerBlueprint {
            name: "bolt".to_owned(),
            tiers: vec![stats(AttackStyle::Homing)],
        })
        .with(TowerBlueprint {
            name: "dart".to_owned(),
            tiers: vec![stats(AttackStyle::Fixed)],
        })
        .with(TowerBlueprint {
            name: "mortar".to_owned(),
            tiers: vec![burst],
        })
        .with(TowerBlueprint {
            name: "frost".to_owned(),
            tiers: vec![frost],
        })
}

fn point(tile: TileCoord) -> Vec2 {
    Vec2::new(
        (tile.column() as f32 + 0.5) / 10.0,
        (tile.row() as f32 + 0.5) / 10.0,
    )
}

fn world() -> World {
    World::new(config(), catalog()).expect("valid configuration")
}

fn build(world: &mut World, blueprint: &str, tile: TileCoord) {
    let mut events = Vec::new();
    apply(
        world,
        Intent::Build {
            blueprint: blueprint.to_owned(),
            tier: 1,
            at: point(tile),
        },
        &mut events,
    )
    .expect("build accepted");
}

fn dummy(health: f32) -> MonsterTemplate {
    MonsterTemplate {
        name: "dummy".to_owned(),
        health,
        speed: 0.0,
        armor: Armor::new(ArmorKind::Light, 0.0),
    }
}

fn spawn(world: &mut World, health: f32, tile: TileCoord) -> MonsterId {
    let mut events = Vec::new();
    world
        .spawn_monster(&dummy(health), tile, &mut events)
        .expect("tile within grid")
}

/// Ticks until every in-flight attack resolved, returning all emitted events.
fn run_until_attacks_resolve(world: &mut World, first_tick: u64) -> Vec<Event> {
    let mut events = Vec::new();
    for tick in first_tick..first_tick + 10 {
        world.cycle_update(tick, DT, &mut events);
        if query::attack_count(world) == 0 {
            break;
        }
    }
    events
}

fn health(world: &World, monster: MonsterId) -> Option<f32> {
    query::monster_info(world, monster).map(|info| info.health)
}

#[test]
fn tower_fires_once_and_deals_hand_computed_damage() {
    let mut world = world();
    build(&mut world, "bolt", TileCoord::new(0, 0));
    let monster = spawn(&mut world, 12.0, TileCoord::new(1, 1));

    let mut events = Vec::new();
    world.cycle_update(1, DT, &mut events);

    let created = events
        .iter()
        .filter(|event| matches!(event, Event::AttackCreated { .. }))
        .count();
    assert_eq!(created, 1);
    assert_eq!(query::attack_count(&world), 1);

    let events = run_until_attacks_resolve(&mut world, 2);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::AttackRemoved { hit: true, .. })));
    assert_eq!(health(&world, monster), Some(12.0 - 5.0 * 1.25));
}

#[test]
fn lethal_hit_removes_monster_once_in_the_same_tick() {
    let mut world = world();
    build(&mut world, "bolt", TileCoord::new(0, 0));
    let monster = spawn(&mut world, 5.0, TileCoord::new(1, 1));

    let mut events = Vec::new();
    world.cycle_update(1, DT, &mut events);
    events.extend(run_until_attacks_resolve(&mut world, 2));

    let removals: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::MonsterRemoved { monster, cause } => Some((*monster, *cause)),
            _ => None,
        })
        .collect();
    assert_eq!(
        removals,
        vec![(
            monster,
            RemovalCause::Killed {
                by: Some(TowerId::new(0))
            }
        )]
    );
    assert_eq!(query::monster_info(&world, monster), None);
    assert!(query::grid(&world)
        .residents(TileCoord::new(1, 1))
        .is_empty());
    let tower = query::tower_info(&world, TowerId::new(0)).expect("tower exists");
    assert_eq!(tower.kills, 1);
    assert_eq!(tower.target, None);
}

#[test]
fn shared_tile_hit_lands_on_earliest_resident() {
    let mut world = world();
    build(&mut world, "dart", TileCoord::new(0, 0));
    let first = spawn(&mut world, 100.0, TileCoord::new(1, 1));
    let second = spawn(&mut world, 100.0, TileCoord::new(1, 1));

    let mut events = Vec::new();
    world.cycle_update(1, DT, &mut events);
    let _ = run_until_attacks_resolve(&mut world, 2);

    assert_eq!(health(&world, first), Some(100.0 - 6.25));
    assert_eq!(health(&world, second), Some(100.0));
}

#[test]
fn homing_attack_without_target_lands_harmlessly() {
    let mut world = world();
    build(&mut world, "bolt", TileCoord::new(0, 0));
    build(&mut world, "bolt", TileCoord::new(2, 0));
    let monster = spawn(&mut world, 5.0, TileCoord::new(1, 1));

    let mut events = Vec::new();
    world.cycle_update(1, DT, &mut events);
    assert_eq!(query::attack_count(&world), 2);
    events.extend(run_until_attacks_resolve(&mut world, 2));

    let outcomes: Vec<bool> = events
        .iter()
        .filter_map(|event| match event {
            Event::AttackRemoved { hit, .. } => Some(*hit),
            _ => None,
        })
        .collect();
    assert_eq!(outcomes, vec![true, false]);
    assert_eq!(query::monster_info(&world, monster), None);
}

#[test]
fn burst_on_death_damages_tile_mates() {
    let mut world = world();
    build(&mut world, "mortar", TileCoord::new(0, 0));
    let victim = spawn(&mut world, 1.0, TileCoord::new(1, 1));
    let bystander = spawn(&mut world, 20.0, TileCoord::new(1, 1));

    let mut events = Vec::new();
    world.cycle_update(1, DT, &mut events);
    let _ = run_until_attacks_resolve(&mut world, 2);

    assert_eq!(query::monster_info(&world, victim), None);
    assert_eq!(health(&world, bystander), Some(20.0 - 4.0 * 1.5));
}

#[test]
fn slow_on_hit_reduces_reported_speed() {
    let mut world = world();
    build(&mut world, "frost", TileCoord::new(0, 0));
    let mut events = Vec::new();
    let template = MonsterTemplate {
        speed: 0.01,
        ..dummy(100.0)
    };
    let monster = world
        .spawn_monster(&template, TileCoord::new(1, 1), &mut events)
        .expect("tile within grid");

    world.cycle_update(1, DT, &mut events);
    let _ = run_until_attacks_resolve(&mut world, 2);

    let info = query::monster_info(&world, monster).expect("monster alive");
    assert_eq!(info.speed, template.speed * 0.5);
    assert!(info.health < 100.0);
}

#[test]
fn decaying_damage_weakens_after_each_hit() {
    let mut world = world();
    build(&mut world, "bolt", TileCoord::new(0, 0));
    let mut events = Vec::new();
    apply(
        &mut world,
        Intent::Modify {
            modifier: ModifierPayload::Single(StatModifier::DecayingDamage {
                kind: DamageType::Physical,
                amount: 4.0,
                decay: 1.5,
            }),
            at: point(TileCoord::new(0, 0)),
        },
        &mut events,
    )
    .expect("modify accepted");
    let monster = spawn(&mut world, 100.0, TileCoord::new(1, 1));

    world.cycle_update(1, DT, &mut events);
    let _ = run_until_attacks_resolve(&mut world, 2);

    assert_eq!(health(&world, monster), Some(100.0 - (5.0 + 4.0) * 1.25));
    let tower = query::tower_info(&world, TowerId::new(0)).expect("tower exists");
    assert_eq!(
        tower.properties.on_hit,
        vec![Effect::DecayingDamage {
            kind: DamageType::Physical,
            amount: 2.5,
            decay: 1.5,
        }]
    );
}

#[test]
fn monster_reaching_destination_leaks() {
    let mut world = world();
    let template = MonsterTemplate {
        speed: 1.0,
        ..dummy(10.0)
    };
    let mut events = Vec::new();
    let monster = world
        .spawn_monster(&template, TileCoord::new(8, 9), &mut events)
        .expect("tile within grid");
    events.clear();

    for tick in 1..=5 {
        world.cycle_update(tick, DT, &mut events);
    }

    let removals: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::MonsterRemoved { .. }))
        .collect();
    assert_eq!(
        removals,
        vec![&Event::MonsterRemoved {
            monster,
            cause: RemovalCause::Leaked,
        }]
    );
    let moves = events
        .iter()
        .filter(|event| matches!(event, Event::MonsterMoved { duration, .. } if *duration == DT))
        .count();
    assert!(moves >= 1);

    let mut snapshot = tower_defence_core::PlayerSnapshot::default();
    query::fill_snapshot(&world, &mut snapshot);
    assert_eq!(snapshot.leaked, 1);
    assert_eq!(snapshot.live_monsters, 0);
}

#[test]
fn walking_monster_updates_tile_residency() {
    let mut world = world();
    let template = MonsterTemplate {
        speed: 0.3,
        ..dummy(10.0)
    };
    let mut events = Vec::new();
    let monster = world
        .spawn_monster(&template, TileCoord::new(0, 9), &mut events)
        .expect("tile within grid");

    for tick in 1..=15 {
        world.cycle_update(tick, DT, &mut events);
    }

    let tile = query::monster_tile(&world, monster).expect("monster alive");
    assert_ne!(tile, TileCoord::new(0, 9));
    assert_eq!(query::grid(&world).residents(tile), &[monster]);
    assert!(query::grid(&world)
        .residents(TileCoord::new(0, 9))
        .is_empty());
}

#[test]
fn wave_releases_first_monster_and_clears_after_kills() {
    let config = GameConfig {
        wave: tower_defence_world::WaveConfig {
            base_count: 2,
            growth_per_round: 0,
            spawn_interval: Duration::from_millis(100),
            health_growth: 1.0,
            monster: MonsterTemplate {
                speed: 2.0,
                ..dummy(1.0)
            },
        },
        ..config()
    };
    let mut world = World::new(config, catalog()).expect("valid configuration");
    assert!(world.begin_round(1));

    let mut events = Vec::new();
    let mut tick = 0;
    while !query::wave_cleared(&world) && tick < 200 {
        tick += 1;
        world.cycle_update(tick, DT, &mut events);
    }

    let names: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::MonsterCreated { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["dummy-r1-1", "dummy-r1-2"]);
    assert!(query::wave_cleared(&world));
}
