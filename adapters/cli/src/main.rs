#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that runs a scripted tower defence session.

use std::{
    thread,
    time::{Duration, Instant},
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tower_defence_core::{
    Event, EventCategory, Intent, ModifierPayload, StatModifier, TileCoord, UnitInfo,
};
use tower_defence_runtime::{GameLoop, LoopConfig, RoundConfig, RoundMachine};
use tower_defence_world::{query, GameConfig, Grid, TowerCatalog, World};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CATEGORIES: [EventCategory; 6] = [
    EventCategory::Towers,
    EventCategory::Attacks,
    EventCategory::Monsters,
    EventCategory::UnitInfo,
    EventCategory::Rounds,
    EventCategory::Diagnostics,
];

/// Runs a headless tower defence session and logs what happens.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Wall-clock seconds to run before shutting down.
    #[arg(short, long, default_value_t = 20.0)]
    seconds: f64,
    /// Seed for damage and critical hit rolls.
    #[arg(long, default_value_t = 0x7d_5eed)]
    seed: u64,
    /// Simulation ticks per second.
    #[arg(long, default_value_t = 30)]
    tick_rate: u32,
    /// Build phase length between waves, in seconds.
    #[arg(long, default_value_t = 5.0)]
    idle_seconds: f64,
    /// Capacity of every event queue.
    #[arg(long, default_value_t = 256)]
    queue_capacity: usize,
    /// Log every event instead of only round and unit information.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    ensure!(args.seconds > 0.0, "--seconds must be positive");
    ensure!(args.idle_seconds >= 0.0, "--idle-seconds must not be negative");

    let config = GameConfig {
        rng_seed: args.seed,
        ..GameConfig::default()
    };
    let world = World::new(config, TowerCatalog::standard())
        .context("failed to build the game world")?;
    let script = opening(query::grid(&world));
    let machine = RoundMachine::new(
        world,
        RoundConfig {
            idle_duration: Duration::from_secs_f64(args.idle_seconds),
        },
    );
    let game = GameLoop::spawn(
        machine,
        LoopConfig {
            tick_rate_hz: args.tick_rate,
            queue_capacity: args.queue_capacity,
        },
    )
    .context("failed to start the game loop")?;

    for intent in script {
        game.submit(intent);
    }

    let deadline = Instant::now() + Duration::from_secs_f64(args.seconds);
    while Instant::now() < deadline {
        drain_events(&game);
        thread::sleep(Duration::from_millis(100));
    }
    drain_events(&game);

    let machine = game.stop().context("failed to stop the game loop")?;
    let snapshot = machine.snapshot();
    tracing::info!(
        tick = snapshot.tick,
        round = snapshot.round,
        state = ?snapshot.state,
        towers = snapshot.towers,
        live_monsters = snapshot.live_monsters,
        kills = snapshot.kills,
        leaked = snapshot.leaked,
        "session finished"
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Towers placed around the default route before the first wave, plus a
/// few follow-up requests exercising every intent kind.
fn opening(grid: &Grid) -> Vec<Intent> {
    let point = |column, row| grid.center(TileCoord::new(column, row));
    let build = |blueprint: &str, column, row| Intent::Build {
        blueprint: blueprint.to_owned(),
        tier: 1,
        at: point(column, row),
    };

    vec![
        build("arrow", 5, 9),
        build("frost", 9, 11),
        build("cannon", 13, 8),
        build("arrow", 16, 11),
        Intent::Modify {
            modifier: ModifierPayload::Single(StatModifier::EnhancedDamage(0.5)),
            at: point(5, 9),
        },
        Intent::Target {
            at: point(16, 11),
            target: point(17, 10),
        },
        Intent::PrintInfo { at: point(5, 9) },
    ]
}

fn drain_events(game: &GameLoop) {
    for category in CATEGORIES {
        for event in game.channels().outbound(category).drain_ready() {
            report(&event);
        }
    }
}

fn report(event: &Event) {
    match event {
        Event::RoundStateChanged { from, to, round } => {
            tracing::info!(?from, ?to, round, "round");
        }
        Event::UnitInformation(UnitInfo::Tower(info)) => {
            tracing::info!(
                tower = info.tower.get(),
                blueprint = %info.blueprint,
                tier = info.tier,
                kills = info.kills,
                range = info.properties.range,
                "tower info"
            );
        }
        Event::UnitInformation(UnitInfo::Monster(info)) => {
            tracing::info!(
                monster = info.monster.get(),
                name = %info.name,
                health = info.health,
                speed = info.speed,
                "monster info"
            );
        }
        Event::IntentRejected { intent, reason } => {
            tracing::warn!(?intent, %reason, "intent rejected");
        }
        Event::MonsterRemoved { monster, cause } => {
            tracing::info!(monster = monster.get(), ?cause, "monster removed");
        }
        other => tracing::debug!(event = ?other, "event"),
    }
}
