//! Round finite state machine wrapping the simulation core.

use std::time::Duration;

use tower_defence_core::{Event, Intent, PlayerSnapshot, RoundState};
use tower_defence_world::{self as world, query, World};

use crate::channels::Channels;

/// Round pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundConfig {
    /// Build phase length between waves.
    pub idle_duration: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            idle_duration: Duration::from_secs(5),
        }
    }
}

/// Drives the world through Paused, Idle and Active phases.
#[derive(Debug)]
pub struct RoundMachine {
    world: World,
    config: RoundConfig,
    state: RoundState,
    idle_elapsed: Duration,
    next_round: u32,
    tick: u64,
    snapshot: PlayerSnapshot,
    held: Option<Intent>,
}

impl RoundMachine {
    /// Creates a paused machine around `world`.
    #[must_use]
    pub fn new(world: World, config: RoundConfig) -> Self {
        Self {
            world,
            config,
            state: RoundState::Paused,
            idle_elapsed: Duration::ZERO,
            next_round: 1,
            tick: 0,
            snapshot: PlayerSnapshot::default(),
            held: None,
        }
    }

    /// Current round state.
    #[must_use]
    pub const fn state(&self) -> RoundState {
        self.state
    }

    /// Read-only access to the simulation core.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Working copy of the player snapshot as of the last tick.
    #[must_use]
    pub const fn snapshot(&self) -> &PlayerSnapshot {
        &self.snapshot
    }

    /// Runs one tick and returns the state the machine is in afterwards.
    ///
    /// Intents are applied in submission order. While idle every queued
    /// intent is applied. In other states leading info requests are answered
    /// and the first mutating intent is held, with everything behind it,
    /// until the next idle phase.
    pub fn cycle_update(
        &mut self,
        dt: Duration,
        channels: &Channels,
        out: &mut Vec<Event>,
    ) -> RoundState {
        self.tick = self.tick.saturating_add(1);

        if self.state == RoundState::Idle {
            self.apply_queued(channels, out);
        } else {
            self.answer_info_requests(channels, out);
        }

        let next = match self.state {
            RoundState::Paused => RoundState::Idle,
            RoundState::Idle => {
                self.idle_elapsed = self.idle_elapsed.saturating_add(dt);
                if self.idle_elapsed >= self.config.idle_duration {
                    RoundState::Active
                } else {
                    RoundState::Idle
                }
            }
            RoundState::Active => {
                self.world.cycle_update(self.tick, dt, out);
                if query::wave_cleared(&self.world) {
                    RoundState::Idle
                } else {
                    RoundState::Active
                }
            }
        };
        self.enter_state(next, out);

        query::fill_snapshot(&self.world, &mut self.snapshot);
        self.snapshot.tick = self.tick;
        self.snapshot.state = self.state;
        self.state
    }

    fn apply_queued(&mut self, channels: &Channels, out: &mut Vec<Event>) {
        let held = self.held.take();
        for intent in held.into_iter().chain(channels.intents().drain_ready()) {
            let _ = world::apply(&mut self.world, intent, out);
        }
    }

    fn answer_info_requests(&mut self, channels: &Channels, out: &mut Vec<Event>) {
        while self.held.is_none() {
            let Some(intent) = channels.intents().pop(Duration::ZERO) else {
                return;
            };
            match intent {
                Intent::PrintInfo { .. } => {
                    let _ = world::apply(&mut self.world, intent, out);
                }
                Intent::Build { .. } | Intent::Modify { .. } | Intent::Target { .. } => {
                    self.held = Some(intent);
                }
            }
        }
    }

    /// Transitions to `next`, running its entry setup once.
    ///
    /// Entering Active queues the next wave; leaving Active for Idle clears
    /// the battlefield and advances the round counter. Requesting the current
    /// state does nothing.
    pub fn enter_state(&mut self, next: RoundState, out: &mut Vec<Event>) {
        if next == self.state {
            return;
        }
        let from = self.state;

        match next {
            RoundState::Active => {
                let _ = self.world.begin_round(self.next_round);
            }
            RoundState::Idle => {
                if from == RoundState::Active {
                    self.world.end_round(out);
                    self.next_round = self.next_round.saturating_add(1);
                }
                self.idle_elapsed = Duration::ZERO;
            }
            RoundState::Paused => {}
        }

        self.state = next;
        let round = query::round(&self.world);
        tracing::info!(?from, to = ?next, round, "round state changed");
        out.push(Event::RoundStateChanged {
            from,
            to: next,
            round,
        });
    }
}
