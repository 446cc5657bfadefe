//! Monster state and path following.

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use tower_defence_core::{within_map, Armor, MonsterId, MonsterInfo, TileCoord};

use crate::grid::Grid;

/// Speed reduction applied by an on-hit effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Slow {
    pub(crate) factor: f32,
    pub(crate) remaining: Duration,
}

/// A monster walking toward the destination.
#[derive(Clone, Debug)]
pub(crate) struct Monster {
    pub(crate) id: MonsterId,
    pub(crate) name: String,
    pub(crate) position: Vec2,
    /// Tile the monster is registered on; matches the tile under `position` between ticks.
    pub(crate) tile: TileCoord,
    pub(crate) destination: TileCoord,
    pub(crate) path: VecDeque<TileCoord>,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) speed: f32,
    pub(crate) armor: Armor,
    pub(crate) slow: Option<Slow>,
    pub(crate) last_tick: u64,
}

/// Outcome of advancing a monster for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Stride {
    pub(crate) delta: Vec2,
    pub(crate) arrived: bool,
}

impl Monster {
    /// Alive and on the map. Every consumer of monster references uses this
    /// single predicate.
    pub(crate) fn in_play(&self) -> bool {
        self.health > 0.0 && within_map(self.position)
    }

    /// Movement speed after slows.
    pub(crate) fn current_speed(&self) -> f32 {
        match self.slow {
            Some(slow) => self.speed * slow.factor,
            None => self.speed,
        }
    }

    /// Applies a slow, keeping the strongest factor and the longest duration.
    pub(crate) fn apply_slow(&mut self, factor: f32, duration: Duration) {
        let factor = factor.clamp(0.0, 1.0);
        self.slow = Some(match self.slow {
            Some(current) => Slow {
                factor: current.factor.min(factor),
                remaining: current.remaining.max(duration),
            },
            None => Slow {
                factor,
                remaining: duration,
            },
        });
    }

    /// Walks along the path for `dt`, consuming path tiles as their centers
    /// are reached.
    pub(crate) fn advance(&mut self, dt: Duration, grid: &Grid) -> Stride {
        let start = self.position;
        let mut budget = self.current_speed() * dt.as_secs_f32();

        while budget > 0.0 {
            let Some(&next) = self.path.front() else {
                break;
            };
            let waypoint = grid.center(next);
            let offset = waypoint - self.position;
            let distance = offset.length();
            if distance <= budget {
                self.position = waypoint;
                budget -= distance;
                let _ = self.path.pop_front();
            } else {
                self.position += offset / distance * budget;
                budget = 0.0;
            }
        }

        if let Some(slow) = self.slow.as_mut() {
            slow.remaining = slow.remaining.saturating_sub(dt);
            if slow.remaining.is_zero() {
                self.slow = None;
            }
        }

        let arrived =
            self.path.is_empty() && grid.tile_at(self.position) == Some(self.destination);
        Stride {
            delta: self.position - start,
            arrived,
        }
    }

    pub(crate) fn info(&self) -> MonsterInfo {
        MonsterInfo {
            monster: self.id,
            name: self.name.clone(),
            health: self.health,
            max_health: self.max_health,
            speed: self.current_speed(),
            armor: self.armor,
        }
    }
}
