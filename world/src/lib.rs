#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for the tower defence core.
//!
//! The [`World`] owns the grid, towers, monsters and in-flight attacks.
//! Intents are applied through [`apply`], simulation time advances through
//! [`World::cycle_update`], and adapters read state through [`query`].

mod attacks;
mod catalog;
mod config;
mod grid;
mod monsters;
mod navigation;
mod towers;
mod waves;

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_defence_core::{
    to_event_space, AttackId, DamageType, Effect, Enhancement, Event, Intent, IntentRejection,
    ModifierPayload, MonsterId, RemovalCause, TileCoord, TileRect, TileRectSize, TowerId,
    UnitInfo,
};
use tower_defence_system_tower_combat::{burst_damage, resolve_damage, Cooldown};
use tower_defence_system_tower_targeting::{Battlefield, TargetRequest, TowerTargeting};

use attacks::{Attack, Flight, Guidance};
use monsters::Monster;
use towers::{Tower, TowerRegistry};
use waves::{PendingMonster, WaveSpawner};

pub use catalog::{AttackStyle, TowerBlueprint, TowerCatalog, TowerStats};
pub use config::{ConfigError, GameConfig, MonsterTemplate, WaveConfig};
pub use grid::{Grid, Tile};
pub use navigation::Pathfinder;

/// Simulation core holding every entity of a game session.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    catalog: TowerCatalog,
    grid: Grid,
    pathfinder: Pathfinder,
    path: Vec<TileCoord>,
    towers: TowerRegistry,
    monsters: BTreeMap<MonsterId, Monster>,
    next_monster_id: u32,
    attacks: Vec<Attack>,
    next_attack_id: u32,
    spawner: WaveSpawner,
    targeting: TowerTargeting,
    rng: ChaCha8Rng,
    round: u32,
    tick: u64,
    kills: u32,
    leaked: u32,
}

impl World {
    /// Creates an empty world laid out according to `config`.
    pub fn new(config: GameConfig, catalog: TowerCatalog) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.columns(), config.rows());
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);

        Ok(Self {
            config,
            catalog,
            grid,
            pathfinder: Pathfinder::new(),
            path: Vec::new(),
            towers: TowerRegistry::new(),
            monsters: BTreeMap::new(),
            next_monster_id: 0,
            attacks: Vec::new(),
            next_attack_id: 0,
            spawner: WaveSpawner::new(),
            targeting: TowerTargeting::new(),
            rng,
            round: 0,
            tick: 0,
            kills: 0,
            leaked: 0,
        })
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Recomputes the monster path and queues the wave of the 1-based `round`.
    ///
    /// Returns `false` when the destination cannot be reached from the spawn
    /// tile, in which case no monsters are queued.
    pub fn begin_round(&mut self, round: u32) -> bool {
        self.round = round;
        if !self.refresh_path() {
            tracing::warn!(round, "destination unreachable from spawn, wave skipped");
            self.spawner.clear();
            return false;
        }

        self.spawner.queue_round(&self.config.wave, round);
        tracing::info!(
            round,
            monsters = self.config.wave.monster_count(round),
            path_length = self.path.len(),
            "wave queued"
        );
        true
    }

    /// Discards in-flight attacks, pending spawns and tower target caches.
    pub fn end_round(&mut self, out: &mut Vec<Event>) {
        for attack in self.attacks.drain(..) {
            out.push(Event::AttackRemoved {
                attack: attack.id,
                hit: false,
            });
        }
        self.spawner.clear();
        self.towers.clear_targets();
    }

    /// Advances the simulation by one tick.
    ///
    /// Pending spawns are released first, then attacks move and resolve, then
    /// towers acquire targets and fire, and finally monsters walk.
    pub fn cycle_update(&mut self, tick: u64, dt: Duration, out: &mut Vec<Event>) {
        self.tick = tick;
        self.release_wave(dt, out);
        self.advance_attacks(dt, out);
        self.advance_towers(dt, out);
        self.advance_monsters(dt, out);
    }

    /// Places a monster derived from `template` on `tile`, routing it toward
    /// the destination.
    ///
    /// Returns `None` when the tile lies outside the grid. A monster with no
    /// route to the destination stands still.
    pub fn spawn_monster(
        &mut self,
        template: &MonsterTemplate,
        tile: TileCoord,
        out: &mut Vec<Event>,
    ) -> Option<MonsterId> {
        if !self.grid.contains(tile) {
            return None;
        }

        let destination = self.config.destination;
        let grid = &self.grid;
        let path = if self.pathfinder.search(
            grid.columns(),
            grid.rows(),
            tile,
            destination,
            |candidate| grid.is_blocked(candidate),
        ) {
            self.pathfinder.path_to(destination).unwrap_or_default()
        } else {
            Vec::new()
        };

        let pending = PendingMonster {
            name: format!("{}-m{}", template.name, self.next_monster_id),
            health: template.health,
            speed: template.speed,
            armor: template.armor,
        };
        Some(self.insert_monster(pending, tile, path, out))
    }

    fn refresh_path(&mut self) -> bool {
        let spawn = self.config.spawn;
        let destination = self.config.destination;
        let grid = &self.grid;
        let reachable = self.pathfinder.search(
            grid.columns(),
            grid.rows(),
            spawn,
            destination,
            |tile| grid.is_blocked(tile),
        );
        self.path = if reachable {
            self.pathfinder.path_to(destination).unwrap_or_default()
        } else {
            Vec::new()
        };
        reachable
    }

    fn release_wave(&mut self, dt: Duration, out: &mut Vec<Event>) {
        for pending in self.spawner.release(dt) {
            let path = self.path.clone();
            let _ = self.insert_monster(pending, self.config.spawn, path, out);
        }
    }

    fn insert_monster(
        &mut self,
        pending: PendingMonster,
        tile: TileCoord,
        path: Vec<TileCoord>,
        out: &mut Vec<Event>,
    ) -> MonsterId {
        let id = MonsterId::new(self.next_monster_id);
        self.next_monster_id = self.next_monster_id.wrapping_add(1);
        let position = self.grid.center(tile);

        out.push(Event::MonsterCreated {
            monster: id,
            name: pending.name.clone(),
            position: to_event_space(position),
        });
        tracing::debug!(monster = id.get(), name = %pending.name, "monster spawned");

        let monster = Monster {
            id,
            name: pending.name,
            position,
            tile,
            destination: self.config.destination,
            path: path.into(),
            health: pending.health,
            max_health: pending.health,
            speed: pending.speed,
            armor: pending.armor,
            slow: None,
            last_tick: self.tick,
        };
        self.grid.add_resident(tile, id);
        if self.monsters.insert(id, monster).is_some() {
            panic!("monster {} inserted twice", id.get());
        }
        id
    }

    fn advance_attacks(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let mut attacks = std::mem::take(&mut self.attacks);
        attacks.retain_mut(|attack| self.step_attack(attack, dt, out));
        self.attacks = attacks;
    }

    /// Moves one attack and resolves its arrival. Returns whether it stays in flight.
    fn step_attack(&mut self, attack: &mut Attack, dt: Duration, out: &mut Vec<Event>) -> bool {
        let monsters = &self.monsters;
        let (flight, delta) = attack.advance(dt, |id| locate(monsters, id));
        if delta != Vec2::ZERO {
            out.push(Event::AttackMoved {
                attack: attack.id,
                delta: to_event_space(delta),
                duration: dt,
            });
        }

        match flight {
            Flight::InFlight => return true,
            Flight::OutOfBounds => attack.hit = false,
            Flight::Arrived => attack.hit = self.resolve_hit(attack, out),
        }
        out.push(Event::AttackRemoved {
            attack: attack.id,
            hit: attack.hit,
        });
        false
    }

    /// Applies an arrived attack to the monster it lands on. Returns whether a
    /// monster was struck.
    fn resolve_hit(&mut self, attack: &Attack, out: &mut Vec<Event>) -> bool {
        let Some(tile) = self.grid.tile_at(attack.position) else {
            return false;
        };
        let Some(victim) = self.select_victim(tile, attack.homing_target()) else {
            tracing::debug!(attack = attack.id.get(), "attack landed on an empty tile");
            return false;
        };
        let Some(monster) = self.monsters.get_mut(&victim) else {
            panic!("monster {} resident on a tile but not alive", victim.get());
        };

        let outcome = resolve_damage(&attack.properties, monster.armor, &mut self.rng);
        monster.health -= outcome.amount;
        for effect in &attack.properties.on_hit {
            if let Effect::Slow { factor, duration } = *effect {
                monster.apply_slow(factor, duration);
            }
        }
        let killed = monster.health <= 0.0;
        tracing::trace!(
            attack = attack.id.get(),
            monster = victim.get(),
            amount = outcome.amount,
            critical = outcome.critical,
            "attack hit"
        );

        let decays = attack
            .properties
            .on_hit
            .iter()
            .any(|effect| matches!(effect, Effect::DecayingDamage { .. }));
        if decays {
            let tower = self.tower_mut(attack.tower);
            tower.enhancement.decay_on_hit();
            tower.refresh();
        }

        if killed {
            let cause = RemovalCause::Killed {
                by: Some(attack.tower),
            };
            self.remove_monster(victim, cause, out);
            for effect in &attack.properties.on_death {
                if let Effect::Burst { kind, amount } = *effect {
                    self.burst(tile, kind, amount, attack.tower, out);
                }
            }
        }
        true
    }

    fn select_victim(&self, tile: TileCoord, homing: Option<MonsterId>) -> Option<MonsterId> {
        let residents = self.grid.residents(tile);
        if let Some(target) = homing {
            if residents.contains(&target) && locate(&self.monsters, target).is_some() {
                return Some(target);
            }
        }
        residents
            .iter()
            .copied()
            .find(|id| locate(&self.monsters, *id).is_some())
    }

    /// Damages every live resident of `tile`. Monsters killed by the burst do
    /// not trigger further bursts.
    fn burst(
        &mut self,
        tile: TileCoord,
        kind: DamageType,
        amount: f32,
        tower: TowerId,
        out: &mut Vec<Event>,
    ) {
        let bystanders: Vec<MonsterId> = self.grid.residents(tile).to_vec();
        for id in bystanders {
            let Some(monster) = self.monsters.get_mut(&id) else {
                continue;
            };
            if !monster.in_play() {
                continue;
            }
            monster.health -= burst_damage(kind, amount, monster.armor);
            if monster.health <= 0.0 {
                self.remove_monster(id, RemovalCause::Killed { by: Some(tower) }, out);
            }
        }
    }

    fn remove_monster(&mut self, id: MonsterId, cause: RemovalCause, out: &mut Vec<Event>) {
        let Some(monster) = self.monsters.remove(&id) else {
            panic!("monster {} removed twice", id.get());
        };
        if !self.grid.remove_resident(monster.tile, id) {
            panic!(
                "monster {} was not registered on tile ({}, {})",
                id.get(),
                monster.tile.column(),
                monster.tile.row()
            );
        }
        self.towers.forget_target(id);

        match cause {
            RemovalCause::Killed { by } => {
                self.kills = self.kills.saturating_add(1);
                if let Some(tower) = by {
                    let tower = self.tower_mut(tower);
                    tower.kills = tower.kills.saturating_add(1);
                }
            }
            RemovalCause::Leaked => self.leaked = self.leaked.saturating_add(1),
        }

        tracing::debug!(monster = id.get(), name = %monster.name, ?cause, "monster removed");
        out.push(Event::MonsterRemoved { monster: id, cause });
    }

    fn advance_towers(&mut self, dt: Duration, out: &mut Vec<Event>) {
        for id in self.towers.ids() {
            let Some(tower) = self.towers.get(id) else {
                continue;
            };
            let request = TargetRequest {
                footprint: tower.footprint,
                center: tower.position,
                range: tower.effective.range,
                cached: tower.target,
                focus: tower.focus,
            };
            let field = Field {
                grid: &self.grid,
                monsters: &self.monsters,
            };
            let target = self.targeting.acquire(&field, &request);

            let Some(tower) = self.towers.get_mut(id) else {
                continue;
            };
            tower.target = target;
            let attack_speed = tower.effective.attack_speed;
            if !tower.cooldown.advance(dt, attack_speed) {
                continue;
            }
            let Some(target) = target else {
                continue;
            };
            let Some(aim) = locate(&self.monsters, target) else {
                continue;
            };
            tower.cooldown.trigger(attack_speed);

            let attack = AttackId::new(self.next_attack_id);
            self.next_attack_id = self.next_attack_id.wrapping_add(1);
            let guidance = match tower.style {
                AttackStyle::Fixed => Guidance::Fixed { destination: aim },
                AttackStyle::Homing => Guidance::Homing {
                    target,
                    last_known: aim,
                },
            };
            out.push(Event::AttackCreated {
                attack,
                tower: id,
                position: to_event_space(tower.position),
            });
            self.attacks.push(Attack {
                id: attack,
                tower: id,
                guidance,
                properties: tower.effective.clone(),
                position: tower.position,
                speed: tower.projectile_speed,
                hit: false,
            });
        }
    }

    fn advance_monsters(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let ids: Vec<MonsterId> = self.monsters.keys().copied().collect();
        for id in ids {
            let Some(monster) = self.monsters.get_mut(&id) else {
                continue;
            };
            if monster.last_tick >= self.tick {
                continue;
            }
            monster.last_tick = self.tick;

            let stride = monster.advance(dt, &self.grid);
            let previous = monster.tile;
            let current = self.grid.tile_at(monster.position).unwrap_or(previous);
            monster.tile = current;

            if stride.delta != Vec2::ZERO {
                out.push(Event::MonsterMoved {
                    monster: id,
                    delta: to_event_space(stride.delta),
                    duration: dt,
                });
            }
            if current != previous {
                if !self.grid.remove_resident(previous, id) {
                    panic!(
                        "monster {} left tile ({}, {}) without being registered there",
                        id.get(),
                        previous.column(),
                        previous.row()
                    );
                }
                self.grid.add_resident(current, id);
            }
            if stride.arrived {
                self.remove_monster(id, RemovalCause::Leaked, out);
            }
        }
    }

    fn build(
        &mut self,
        blueprint: &str,
        tier: u8,
        at: Vec2,
        out: &mut Vec<Event>,
    ) -> Result<(), IntentRejection> {
        let stats = self
            .catalog
            .tier(blueprint, tier)
            .cloned()
            .ok_or(IntentRejection::UnknownBlueprint)?;
        let origin = self.grid.tile_at(at).ok_or(IntentRejection::OutOfBounds)?;
        let footprint = TileRect::from_origin_and_size(
            origin,
            TileRectSize::new(stats.footprint, stats.footprint),
        );
        if !self.grid.contains_rect(footprint) {
            return Err(IntentRejection::OutOfBounds);
        }
        if footprint.tiles().any(|tile| self.grid.is_blocked(tile)) {
            return Err(IntentRejection::Occupied);
        }
        let spawn = self.config.spawn;
        let destination = self.config.destination;
        if footprint.contains(spawn) || footprint.contains(destination) {
            return Err(IntentRejection::ReservedTile);
        }
        let grid = &self.grid;
        let reachable = self.pathfinder.search(
            grid.columns(),
            grid.rows(),
            spawn,
            destination,
            |tile| footprint.contains(tile) || grid.is_blocked(tile),
        );
        if !reachable {
            return Err(IntentRejection::BlocksPath);
        }

        let id = self.towers.allocate();
        let position = self.grid.rect_center(footprint);
        self.grid.occupy(footprint, id);
        out.push(Event::TowerCreated {
            tower: id,
            blueprint: blueprint.to_owned(),
            tier,
            position: to_event_space(position),
            footprint,
        });
        tracing::info!(tower = id.get(), blueprint, tier, "tower built");

        self.towers.insert(Tower {
            id,
            blueprint: blueprint.to_owned(),
            tier,
            effective: stats.properties.clone(),
            base: stats.properties,
            enhancement: Enhancement::new(),
            style: stats.style,
            projectile_speed: stats.projectile_speed,
            target: None,
            focus: None,
            kills: 0,
            position,
            footprint,
            cooldown: Cooldown::primed(),
        });
        Ok(())
    }

    fn modify(
        &mut self,
        modifier: ModifierPayload,
        at: Vec2,
        out: &mut Vec<Event>,
    ) -> Result<(), IntentRejection> {
        let id = self.tower_at_point(at)?;
        let tower = self.tower_mut(id);
        let mut enhancement = tower.enhancement.clone();
        match modifier {
            ModifierPayload::Single(modifier) => enhancement.apply(modifier),
            ModifierPayload::Accumulated(other) => enhancement.merge(&other),
        }
        if !enhancement.is_finite() {
            return Err(IntentRejection::InvalidModifier);
        }
        tower.enhancement = enhancement;
        tower.refresh();
        out.push(Event::TowerModified {
            tower: id,
            properties: tower.effective.clone(),
        });
        Ok(())
    }

    fn focus(&mut self, at: Vec2, target: Vec2) -> Result<(), IntentRejection> {
        let id = self.tower_at_point(at)?;
        let tile = self
            .grid
            .tile_at(target)
            .ok_or(IntentRejection::OutOfBounds)?;
        let center = self.grid.center(tile);
        let tower = self.tower_mut(id);
        if tower.position.distance(center) > tower.effective.range {
            return Err(IntentRejection::OutOfRange);
        }
        tower.focus = Some(tile);
        tower.target = None;
        tracing::debug!(
            tower = id.get(),
            column = tile.column(),
            row = tile.row(),
            "tower focus set"
        );
        Ok(())
    }

    fn print_info(&self, at: Vec2, out: &mut Vec<Event>) -> Result<(), IntentRejection> {
        let tile = self.grid.tile_at(at).ok_or(IntentRejection::OutOfBounds)?;
        let info = if let Some(tower) = self
            .grid
            .tile(tile)
            .and_then(Tile::occupant)
            .and_then(|id| self.towers.get(id))
        {
            UnitInfo::Tower(tower.info())
        } else {
            let monster = self
                .grid
                .residents(tile)
                .iter()
                .filter_map(|id| self.monsters.get(id))
                .find(|monster| monster.in_play())
                .ok_or(IntentRejection::EmptyTile)?;
            UnitInfo::Monster(monster.info())
        };
        out.push(Event::UnitInformation(info));
        Ok(())
    }

    fn tower_at_point(&self, at: Vec2) -> Result<TowerId, IntentRejection> {
        let tile = self.grid.tile_at(at).ok_or(IntentRejection::OutOfBounds)?;
        self.grid
            .tile(tile)
            .and_then(Tile::occupant)
            .ok_or(IntentRejection::NoTower)
    }

    fn tower_mut(&mut self, id: TowerId) -> &mut Tower {
        match self.towers.get_mut(id) {
            Some(tower) => tower,
            None => panic!("tower {} referenced but not registered", id.get()),
        }
    }
}

/// Applies an intent to the world.
///
/// Rejected intents leave the world untouched, emit
/// [`Event::IntentRejected`] and return the reason.
pub fn apply(
    world: &mut World,
    intent: Intent,
    out: &mut Vec<Event>,
) -> Result<(), IntentRejection> {
    let kind = intent.kind();
    let result = match intent {
        Intent::Build {
            blueprint,
            tier,
            at,
        } => world.build(&blueprint, tier, at, out),
        Intent::Modify { modifier, at } => world.modify(modifier, at, out),
        Intent::Target { at, target } => world.focus(at, target),
        Intent::PrintInfo { at } => world.print_info(at, out),
    };

    if let Err(reason) = result {
        tracing::debug!(?kind, %reason, "intent rejected");
        out.push(Event::IntentRejected {
            intent: kind,
            reason,
        });
    }
    result
}

/// Resolves a monster that is still in play.
fn locate(monsters: &BTreeMap<MonsterId, Monster>, id: MonsterId) -> Option<Vec2> {
    monsters
        .get(&id)
        .filter(|monster| monster.in_play())
        .map(|monster| monster.position)
}

struct Field<'a> {
    grid: &'a Grid,
    monsters: &'a BTreeMap<MonsterId, Monster>,
}

impl Battlefield for Field<'_> {
    fn dimensions(&self) -> (u32, u32) {
        (self.grid.columns(), self.grid.rows())
    }

    fn tile_extent(&self) -> Vec2 {
        self.grid.extent()
    }

    fn tile_center(&self, tile: TileCoord) -> Vec2 {
        self.grid.center(tile)
    }

    fn residents(&self, tile: TileCoord) -> &[MonsterId] {
        self.grid.residents(tile)
    }

    fn locate(&self, monster: MonsterId) -> Option<Vec2> {
        locate(self.monsters, monster)
    }
}

/// Read-only queries adapters use to observe the world.
pub mod query {
    use glam::Vec2;
    use tower_defence_core::{MonsterId, MonsterInfo, PlayerSnapshot, TileCoord, TowerId, TowerInfo};

    use super::{Grid, Tile, World};

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Route computed at the start of the current round, excluding the spawn tile.
    #[must_use]
    pub fn path(world: &World) -> &[TileCoord] {
        &world.path
    }

    /// Current 1-based round number; zero before the first wave.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Number of towers standing on the grid.
    #[must_use]
    pub fn tower_count(world: &World) -> usize {
        world.towers.len()
    }

    /// Tower whose footprint covers `tile`.
    #[must_use]
    pub fn tower_at(world: &World, tile: TileCoord) -> Option<TowerId> {
        world.grid.tile(tile).and_then(Tile::occupant)
    }

    /// Describes a tower.
    #[must_use]
    pub fn tower_info(world: &World, tower: TowerId) -> Option<TowerInfo> {
        world.towers.get(tower).map(|tower| tower.info())
    }

    /// Identifiers of all live monsters in ascending order.
    #[must_use]
    pub fn monster_ids(world: &World) -> Vec<MonsterId> {
        world.monsters.keys().copied().collect()
    }

    /// Describes a live monster.
    #[must_use]
    pub fn monster_info(world: &World, monster: MonsterId) -> Option<MonsterInfo> {
        world.monsters.get(&monster).map(|monster| monster.info())
    }

    /// Position of a monster that is still in play.
    #[must_use]
    pub fn monster_position(world: &World, monster: MonsterId) -> Option<Vec2> {
        super::locate(&world.monsters, monster)
    }

    /// Tile a live monster is registered on.
    #[must_use]
    pub fn monster_tile(world: &World, monster: MonsterId) -> Option<TileCoord> {
        world.monsters.get(&monster).map(|monster| monster.tile)
    }

    /// Number of monsters currently on the map.
    #[must_use]
    pub fn live_monsters(world: &World) -> usize {
        world.monsters.len()
    }

    /// Number of attacks in flight.
    #[must_use]
    pub fn attack_count(world: &World) -> usize {
        world.attacks.len()
    }

    /// Reports whether every monster of the round has spawned and left the map.
    #[must_use]
    pub fn wave_cleared(world: &World) -> bool {
        world.monsters.is_empty() && world.spawner.is_empty()
    }

    /// Copies the world's tallies into a player snapshot.
    pub fn fill_snapshot(world: &World, snapshot: &mut PlayerSnapshot) {
        snapshot.round = world.round;
        snapshot.live_monsters = u32::try_from(world.monsters.len()).unwrap_or(u32::MAX);
        snapshot.towers = u32::try_from(world.towers.len()).unwrap_or(u32::MAX);
        snapshot.kills = world.kills;
        snapshot.leaked = world.leaked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::{
        Armor, ArmorKind, DamageRange, DamageTable, IntentKind, Properties, StatModifier,
    };

    fn config() -> GameConfig {
        GameConfig {
            map_width: 100,
            map_height: 100,
            tile_size: 10,
            spawn: TileCoord::new(0, 5),
            destination: TileCoord::new(9, 5),
            ..GameConfig::default()
        }
    }

    fn catalog() -> TowerCatalog {
        TowerCatalog::new().with(TowerBlueprint {
            name: "bolt".to_owned(),
            tiers: vec![TowerStats {
                properties: Properties {
                    damage: DamageTable::single(DamageType::Physical, DamageRange::fixed(5.0)),
                    attack_speed: 1.0,
                    range: 0.25,
                    crit_chance: 0.0,
                    crit_multiplier: 1.0,
                    on_hit: Vec::new(),
                    on_death: Vec::new(),
                },
                style: AttackStyle::Homing,
                projectile_speed: 3.0,
                footprint: 1,
            }],
        })
    }

    fn point(tile: TileCoord) -> Vec2 {
        Vec2::new(
            (tile.column() as f32 + 0.5) / 10.0,
            (tile.row() as f32 + 0.5) / 10.0,
        )
    }

    fn build(world: &mut World, tile: TileCoord) -> Result<(), IntentRejection> {
        let mut events = Vec::new();
        apply(
            world,
            Intent::Build {
                blueprint: "bolt".to_owned(),
                tier: 1,
                at: point(tile),
            },
            &mut events,
        )
    }

    #[test]
    fn build_emits_creation_and_occupies_footprint() {
        let mut world = World::new(config(), catalog()).expect("valid config");
        let mut events = Vec::new();

        apply(
            &mut world,
            Intent::Build {
                blueprint: "bolt".to_owned(),
                tier: 1,
                at: point(TileCoord::new(3, 3)),
            },
            &mut events,
        )
        .expect("build accepted");

        assert!(matches!(
            events.as_slice(),
            [Event::TowerCreated { tower, tier: 1, .. }] if *tower == TowerId::new(0)
        ));
        assert_eq!(
            query::tower_at(&world, TileCoord::new(3, 3)),
            Some(TowerId::new(0))
        );
    }

    #[test]
    fn rejected_build_emits_diagnostic_without_state_change() {
        let mut world = World::new(config(), catalog()).expect("valid config");
        build(&mut world, TileCoord::new(3, 3)).expect("first build");
        let mut events = Vec::new();

        let result = apply(
            &mut world,
            Intent::Build {
                blueprint: "bolt".to_owned(),
                tier: 1,
                at: point(TileCoord::new(3, 3)),
            },
            &mut events,
        );

        assert_eq!(result, Err(IntentRejection::Occupied));
        assert_eq!(
            events,
            vec![Event::IntentRejected {
                intent: IntentKind::Build,
                reason: IntentRejection::Occupied,
            }]
        );
        assert_eq!(query::tower_count(&world), 1);
    }

    #[test]
    fn modify_refreshes_effective_properties() {
        let mut world = World::new(config(), catalog()).expect("valid config");
        build(&mut world, TileCoord::new(3, 3)).expect("build");
        let mut events = Vec::new();

        apply(
            &mut world,
            Intent::Modify {
                modifier: ModifierPayload::Single(StatModifier::FlatDamage(3.0)),
                at: point(TileCoord::new(3, 3)),
            },
            &mut events,
        )
        .expect("modify accepted");

        let info = query::tower_info(&world, TowerId::new(0)).expect("tower exists");
        assert_eq!(
            info.properties.damage.get(DamageType::Physical),
            DamageRange::fixed(8.0)
        );
        assert!(matches!(events.as_slice(), [Event::TowerModified { .. }]));
    }

    #[test]
    fn non_finite_modifier_is_rejected_without_changing_the_tower() {
        let mut world = World::new(config(), catalog()).expect("valid config");
        build(&mut world, TileCoord::new(3, 3)).expect("build");
        let before = query::tower_info(&world, TowerId::new(0)).expect("tower exists");
        let mut events = Vec::new();

        let result = apply(
            &mut world,
            Intent::Modify {
                modifier: ModifierPayload::Single(StatModifier::FlatDamage(f32::NAN)),
                at: point(TileCoord::new(3, 3)),
            },
            &mut events,
        );

        assert_eq!(result, Err(IntentRejection::InvalidModifier));
        assert_eq!(
            events,
            vec![Event::IntentRejected {
                intent: IntentKind::Modify,
                reason: IntentRejection::InvalidModifier,
            }]
        );
        let after = query::tower_info(&world, TowerId::new(0)).expect("tower exists");
        assert_eq!(after.properties, before.properties);
    }

    #[test]
    fn modify_without_tower_is_rejected() {
        let mut world = World::new(config(), catalog()).expect("valid config");
        let mut events = Vec::new();

        let result = apply(
            &mut world,
            Intent::Modify {
                modifier: ModifierPayload::Single(StatModifier::FlatRange(0.1)),
                at: point(TileCoord::new(1, 1)),
            },
            &mut events,
        );

        assert_eq!(result, Err(IntentRejection::NoTower));
    }

    #[test]
    fn target_intent_enforces_range() {
        let mut world = World::new(config(), catalog()).expect("valid config");
        build(&mut world, TileCoord::new(3, 3)).expect("build");
        let mut events = Vec::new();

        let near = apply(
            &mut world,
            Intent::Target {
                at: point(TileCoord::new(3, 3)),
                target: point(TileCoord::new(4, 4)),
            },
            &mut events,
        );
        let far = apply(
            &mut world,
            Intent::Target {
                at: point(TileCoord::new(3, 3)),
                target: point(TileCoord::new(9, 9)),
            },
            &mut events,
        );

        assert_eq!(near, Ok(()));
        assert_eq!(far, Err(IntentRejection::OutOfRange));
    }

    #[test]
    fn print_info_describes_tower_then_monster() {
        let mut world = World::new(config(), catalog()).expect("valid config");
        build(&mut world, TileCoord::new(3, 3)).expect("build");
        let template = MonsterTemplate {
            name: "probe".to_owned(),
            health: 12.0,
            speed: 0.0,
            armor: Armor::new(ArmorKind::Heavy, 1.0),
        };
        let mut events = Vec::new();
        let monster = world
            .spawn_monster(&template, TileCoord::new(6, 6), &mut events)
            .expect("tile in bounds");
        events.clear();

        apply(&mut world, Intent::PrintInfo { at: point(TileCoord::new(3, 3)) }, &mut events)
            .expect("tower info");
        apply(&mut world, Intent::PrintInfo { at: point(TileCoord::new(6, 6)) }, &mut events)
            .expect("monster info");
        let empty = apply(
            &mut world,
            Intent::PrintInfo {
                at: point(TileCoord::new(1, 1)),
            },
            &mut events,
        );

        assert!(matches!(
            &events[0],
            Event::UnitInformation(UnitInfo::Tower(info)) if info.blueprint == "bolt"
        ));
        assert!(matches!(
            &events[1],
            Event::UnitInformation(UnitInfo::Monster(info))
                if info.monster == monster && info.max_health == 12.0
        ));
        assert_eq!(empty, Err(IntentRejection::EmptyTile));
    }

    #[test]
    fn begin_round_computes_path_and_queues_wave() {
        let mut world = World::new(config(), catalog()).expect("valid config");

        assert!(world.begin_round(1));

        let path = query::path(&world);
        assert_eq!(path.len(), 9);
        assert_eq!(path.last(), Some(&TileCoord::new(9, 5)));
        assert_eq!(path[0].manhattan_distance(TileCoord::new(0, 5)), 1);
        assert!(!query::wave_cleared(&world));
    }

    #[test]
    fn first_wave_monster_spawns_on_first_tick_without_moving() {
        let mut world = World::new(config(), catalog()).expect("valid config");
        assert!(world.begin_round(1));
        let mut events = Vec::new();

        world.cycle_update(1, Duration::from_millis(33), &mut events);

        let created: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::MonsterCreated { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(created, ["grunt-r1-1"]);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::MonsterMoved { .. })));
        assert_eq!(query::live_monsters(&world), 1);
    }
}
