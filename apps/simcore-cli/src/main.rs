use anyhow::Context;
use clap::{Parser, Subcommand};
use simcore_kernel::{
    EntityCount, Game, GameConfig, PeerId, PositionOf, SetVelocity, Velocity,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simcore-cli", about = "Drive a simcore world from the command line")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML file with game configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and the effective configuration
    Info,
    /// Run a tick thread alongside simulated client threads
    Simulate {
        /// Ticks per second driven by the tick thread
        #[arg(long, default_value = "30")]
        tick_rate: u32,
        /// Wall-clock seconds to run
        #[arg(short, long, default_value = "2")]
        seconds: u64,
        /// Number of client threads issuing spawns, commands and queries
        #[arg(long, default_value = "4")]
        clients: i32,
    },
    /// Spawn one character, give it Velocity(1, 0) and step half a second
    Scenario,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("simcore-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", simcore_common::crate_info());
            println!("ecs: {}", simcore_ecs::crate_info());
            println!("kernel: {}", simcore_kernel::crate_info());
            println!("config: {config:?}");
        }
        Commands::Simulate {
            tick_rate,
            seconds,
            clients,
        } => simulate(config, tick_rate, Duration::from_secs(seconds), clients)?,
        Commands::Scenario => {
            let game = Game::new(config);
            let entity = game.spawn_player_character(PeerId(1))?;
            game.command(SetVelocity {
                entity,
                velocity: Velocity::new(1.0, 0.0),
            })?;
            game.step(Duration::from_millis(500))?;
            let position = game.query(PositionOf(entity))?;
            println!("peer#1 -> {entity} at ({}, {})", position.0.x, position.0.y);
        }
    }

    Ok(())
}

fn simulate(config: GameConfig, tick_rate: u32, run_for: Duration, clients: i32) -> anyhow::Result<()> {
    anyhow::ensure!(tick_rate > 0, "tick rate must be positive");
    let period = Duration::from_secs(1) / tick_rate;
    let game = Arc::new(Game::new(config));
    let stop = Arc::new(AtomicBool::new(false));

    let ticker = {
        let game = game.clone();
        let stop = stop.clone();
        thread::spawn(move || -> anyhow::Result<u64> {
            let mut ticks = 0;
            let mut next = Instant::now();
            while !stop.load(Ordering::Relaxed) {
                let delta = game.update()?;
                ticks += 1;
                tracing::trace!(ticks, delta_ms = delta.as_secs_f64() * 1e3, "tick");
                next += period;
                thread::sleep(next.saturating_duration_since(Instant::now()));
            }
            Ok(ticks)
        })
    };

    let workers: Vec<_> = (0..clients)
        .map(|peer| {
            let game = game.clone();
            let stop = stop.clone();
            thread::spawn(move || -> anyhow::Result<u64> {
                let peer = PeerId(peer);
                let mut requests = 0;
                while !stop.load(Ordering::Relaxed) {
                    // Respawn every so often to exercise mapping replacement.
                    let entity = match game.get_player_character(peer) {
                        Ok(entity) if requests % 200 != 0 => entity,
                        _ => game.spawn_player_character(peer)?,
                    };
                    let angle = requests as f32 * 0.1;
                    game.command(SetVelocity {
                        entity,
                        velocity: Velocity::new(angle.cos(), angle.sin()),
                    })?;
                    let position = game.query(PositionOf(entity))?;
                    tracing::trace!(%peer, %entity, x = position.0.x, y = position.0.y, "client observed");
                    requests += 1;
                    thread::sleep(Duration::from_millis(5));
                }
                Ok(requests)
            })
        })
        .collect();

    thread::sleep(run_for);
    stop.store(true, Ordering::Relaxed);

    let ticks = ticker
        .join()
        .map_err(|_| anyhow::anyhow!("tick thread panicked"))??;
    let mut requests = 0;
    for worker in workers {
        requests += worker
            .join()
            .map_err(|_| anyhow::anyhow!("client thread panicked"))??;
    }

    println!(
        "ticks={ticks} client_requests={requests} peers={} entities={}",
        game.peer_count()?,
        game.query(EntityCount)?
    );
    Ok(())
}
