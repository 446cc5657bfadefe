//! Session configuration values injected into the world and the loop driver.

use std::time::Duration;

use thiserror::Error;
use tower_defence_core::{Armor, ArmorKind, TileCoord};

/// Errors raised while validating configuration values.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Map dimensions or tile size were zero.
    #[error("map width, map height and tile size must be non-zero")]
    EmptyMap,
    /// The tile size does not divide a map dimension.
    #[error("tile size {tile_size} does not evenly divide map {dimension} {length}")]
    UnevenTiles {
        /// Name of the offending dimension.
        dimension: &'static str,
        /// Length of the offending dimension in world units.
        length: u32,
        /// Configured tile size in world units.
        tile_size: u32,
    },
    /// The spawn tile lies outside the grid.
    #[error("spawn tile ({}, {}) lies outside the grid", .0.column(), .0.row())]
    SpawnOutOfBounds(TileCoord),
    /// The destination tile lies outside the grid.
    #[error("destination tile ({}, {}) lies outside the grid", .0.column(), .0.row())]
    DestinationOutOfBounds(TileCoord),
    /// The monster template cannot produce living monsters.
    #[error("monster template health must be positive and finite, got {0}")]
    InvalidHealth(f32),
    /// The monster template speed is negative or not finite.
    #[error("monster template speed must be finite and non-negative, got {0}")]
    InvalidSpeed(f32),
    /// Per-round health growth is negative or not finite.
    #[error("health growth must be finite and non-negative, got {0}")]
    InvalidHealthGrowth(f32),
    /// The loop tick rate was zero.
    #[error("tick rate must be at least 1 Hz")]
    ZeroTickRate,
    /// A presentation queue capacity was zero.
    #[error("queue capacity must be non-zero")]
    ZeroQueueCapacity,
}

/// Stat block every monster of a wave is derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterTemplate {
    /// Base name; spawned monsters are named `<name>-r<round>-<n>`.
    pub name: String,
    /// Health in round one.
    pub health: f32,
    /// Movement speed in normalized map units per second.
    pub speed: f32,
    /// Armor worn by every monster of the wave.
    pub armor: Armor,
}

impl Default for MonsterTemplate {
    fn default() -> Self {
        Self {
            name: "grunt".to_owned(),
            health: 40.0,
            speed: 0.1,
            armor: Armor::new(ArmorKind::Light, 0.0),
        }
    }
}

/// Wave sizing and pacing.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveConfig {
    /// Monsters spawned in round one.
    pub base_count: u32,
    /// Additional monsters per subsequent round.
    pub growth_per_round: u32,
    /// Delay between consecutive spawns.
    pub spawn_interval: Duration,
    /// Health multiplier compounded every round.
    pub health_growth: f32,
    /// Template every monster is derived from.
    pub monster: MonsterTemplate,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_count: 8,
            growth_per_round: 2,
            spawn_interval: Duration::from_millis(750),
            health_growth: 1.15,
            monster: MonsterTemplate::default(),
        }
    }
}

impl WaveConfig {
    /// Number of monsters spawned in the 1-based `round`.
    #[must_use]
    pub fn monster_count(&self, round: u32) -> u32 {
        let extra = self
            .growth_per_round
            .saturating_mul(round.saturating_sub(1));
        self.base_count.saturating_add(extra)
    }

    /// Health of every monster spawned in the 1-based `round`.
    ///
    /// Compounding is clamped to the positive finite range so late rounds
    /// never spawn monsters that are already dead.
    #[must_use]
    pub fn monster_health(&self, round: u32) -> f32 {
        let exponent = i32::try_from(round.saturating_sub(1)).unwrap_or(i32::MAX);
        let health = self.monster.health * self.health_growth.powi(exponent);
        if health.is_nan() {
            return f32::MIN_POSITIVE;
        }
        health.clamp(f32::MIN_POSITIVE, f32::MAX)
    }
}

/// Static layout of a game session.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Map width in world units.
    pub map_width: u32,
    /// Map height in world units.
    pub map_height: u32,
    /// Edge length of a square tile in world units.
    pub tile_size: u32,
    /// Tile monsters enter the map from.
    pub spawn: TileCoord,
    /// Tile monsters walk toward.
    pub destination: TileCoord,
    /// Wave sizing and pacing.
    pub wave: WaveConfig,
    /// Seed for damage rolls.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 640,
            map_height: 640,
            tile_size: 32,
            spawn: TileCoord::new(0, 10),
            destination: TileCoord::new(19, 10),
            wave: WaveConfig::default(),
            rng_seed: 0x7d_5eed,
        }
    }
}

impl GameConfig {
    /// Number of tile columns described by the configuration.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.map_width.checked_div(self.tile_size).unwrap_or(0)
    }

    /// Number of tile rows described by the configuration.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.map_height.checked_div(self.tile_size).unwrap_or(0)
    }

    /// Checks that the configuration describes a playable map.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_width == 0 || self.map_height == 0 || self.tile_size == 0 {
            return Err(ConfigError::EmptyMap);
        }
        for (dimension, length) in [("width", self.map_width), ("height", self.map_height)] {
            if length % self.tile_size != 0 {
                return Err(ConfigError::UnevenTiles {
                    dimension,
                    length,
                    tile_size: self.tile_size,
                });
            }
        }

        let (columns, rows) = (self.columns(), self.rows());
        let inside = |tile: TileCoord| tile.column() < columns && tile.row() < rows;
        if !inside(self.spawn) {
            return Err(ConfigError::SpawnOutOfBounds(self.spawn));
        }
        if !inside(self.destination) {
            return Err(ConfigError::DestinationOutOfBounds(self.destination));
        }

        let monster = &self.wave.monster;
        if !(monster.health.is_finite() && monster.health > 0.0) {
            return Err(ConfigError::InvalidHealth(monster.health));
        }
        if !(monster.speed.is_finite() && monster.speed >= 0.0) {
            return Err(ConfigError::InvalidSpeed(monster.speed));
        }
        let growth = self.wave.health_growth;
        let second_round = monster.health * growth;
        if !(growth.is_finite() && growth > 0.0 && second_round.is_finite() && second_round > 0.0)
        {
            return Err(ConfigError::InvalidHealthGrowth(growth));
        }

        Ok(())
    }
}
