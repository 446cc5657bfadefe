//! Paced release of the monsters queued for a round.

use std::{collections::VecDeque, time::Duration};

use tower_defence_core::Armor;

use crate::config::WaveConfig;

/// Monster waiting to enter the map.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PendingMonster {
    pub(crate) name: String,
    pub(crate) health: f32,
    pub(crate) speed: f32,
    pub(crate) armor: Armor,
}

/// Duration accumulator releasing one queued monster per spawn interval.
#[derive(Debug, Default)]
pub(crate) struct WaveSpawner {
    pending: VecDeque<PendingMonster>,
    spawn_interval: Duration,
    accumulator: Duration,
}

impl WaveSpawner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replaces the queue with the monsters of the 1-based `round`.
    ///
    /// The accumulator starts primed so the first monster is released on the
    /// next call to [`WaveSpawner::release`].
    pub(crate) fn queue_round(&mut self, wave: &WaveConfig, round: u32) {
        let health = wave.monster_health(round);
        self.pending = (1..=wave.monster_count(round))
            .map(|n| PendingMonster {
                name: format!("{}-r{round}-{n}", wave.monster.name),
                health,
                speed: wave.monster.speed,
                armor: wave.monster.armor,
            })
            .collect();
        self.spawn_interval = wave.spawn_interval;
        self.accumulator = wave.spawn_interval;
    }

    /// Advances the accumulator by `dt` and drains the monsters due for release.
    pub(crate) fn release(&mut self, dt: Duration) -> Vec<PendingMonster> {
        if self.pending.is_empty() {
            self.accumulator = Duration::ZERO;
            return Vec::new();
        }
        if self.spawn_interval.is_zero() {
            return self.pending.drain(..).collect();
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let mut released = Vec::new();
        while self.accumulator >= self.spawn_interval {
            let Some(monster) = self.pending.pop_front() else {
                break;
            };
            self.accumulator -= self.spawn_interval;
            released.push(monster);
        }
        released
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
        self.accumulator = Duration::ZERO;
    }
}
