//! Fixed-rate game loop thread.

use std::{
    io,
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use thiserror::Error;
use tower_defence_core::{Event, Intent};
use tower_defence_world::ConfigError;

use crate::{channels::Channels, machine::RoundMachine, snapshot::SharedSnapshot};

/// Loop pacing and queue sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    /// Ticks per second.
    pub tick_rate_hz: u32,
    /// Capacity of every inbound and outbound queue.
    pub queue_capacity: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30,
            queue_capacity: 256,
        }
    }
}

impl LoopConfig {
    /// Rejects a zero tick rate or zero queue capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }

    /// Wall-clock length of one tick.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }
}

/// Failures starting or stopping the game loop.
#[derive(Debug, Error)]
pub enum LoopError {
    /// The loop configuration was rejected.
    #[error("invalid loop configuration")]
    Config(#[from] ConfigError),
    /// The operating system refused to start the loop thread.
    #[error("failed to spawn the game loop thread")]
    Spawn(#[source] io::Error),
    /// The loop thread panicked before it could be joined.
    #[error("game loop thread panicked")]
    Panicked,
}

/// Handle to a running game loop thread.
///
/// Dropping the handle stops and joins the thread.
#[derive(Debug)]
pub struct GameLoop {
    channels: Channels,
    snapshot: SharedSnapshot,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<RoundMachine>>,
}

impl GameLoop {
    /// Starts ticking `machine` on a dedicated thread.
    pub fn spawn(machine: RoundMachine, config: LoopConfig) -> Result<Self, LoopError> {
        config.validate()?;
        let capacity =
            NonZeroUsize::new(config.queue_capacity).ok_or(ConfigError::ZeroQueueCapacity)?;

        let channels = Channels::with_capacity(capacity);
        let snapshot = SharedSnapshot::new();
        let stop = Arc::new(AtomicBool::new(false));

        let runner = Runner {
            machine,
            channels: channels.clone(),
            snapshot: snapshot.clone(),
            stop: Arc::clone(&stop),
            tick: config.tick_duration(),
        };
        let handle = thread::Builder::new()
            .name("game-loop".to_owned())
            .spawn(move || runner.run())
            .map_err(LoopError::Spawn)?;
        tracing::info!(tick_rate_hz = config.tick_rate_hz, "game loop started");

        Ok(Self {
            channels,
            snapshot,
            stop,
            handle: Some(handle),
        })
    }

    /// Queues shared with the loop thread.
    #[must_use]
    pub const fn channels(&self) -> &Channels {
        &self.channels
    }

    /// Snapshot published by the loop thread after every tick.
    #[must_use]
    pub const fn snapshot(&self) -> &SharedSnapshot {
        &self.snapshot
    }

    /// Sends an intent to the loop thread.
    pub fn submit(&self, intent: Intent) {
        self.channels.submit(intent);
    }

    /// Signals the loop to finish its current tick and returns the machine.
    pub fn stop(mut self) -> Result<RoundMachine, LoopError> {
        self.stop.store(true, Ordering::Release);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| LoopError::Panicked),
            None => Err(LoopError::Panicked),
        }
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("game loop thread panicked");
            }
        }
    }
}

struct Runner {
    machine: RoundMachine,
    channels: Channels,
    snapshot: SharedSnapshot,
    stop: Arc<AtomicBool>,
    tick: Duration,
}

impl Runner {
    fn run(mut self) -> RoundMachine {
        let mut events = Vec::new();
        while !self.stop.load(Ordering::Acquire) {
            let _ = self.step(&mut events);
        }
        tracing::info!(tick = self.machine.snapshot().tick, "game loop stopped");
        self.machine
    }

    /// Runs and publishes one tick, then sleeps out the rest of its budget.
    /// Returns `true` when the tick overran and the next one starts at once.
    fn step(&mut self, events: &mut Vec<Event>) -> bool {
        let started = Instant::now();

        let _ = self.machine.cycle_update(self.tick, &self.channels, events);
        for event in events.drain(..) {
            self.channels.route(event);
        }
        self.snapshot.publish(self.machine.snapshot());

        let elapsed = started.elapsed();
        match self.tick.checked_sub(elapsed) {
            Some(remaining) => {
                thread::sleep(remaining);
                false
            }
            None => {
                tracing::warn!(
                    elapsed = ?elapsed,
                    budget = ?self.tick,
                    "tick overran its budget"
                );
                true
            }
        }
    }
}
