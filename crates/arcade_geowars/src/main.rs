//! GeoWars, run headless.
//!
//! Enemies arrive at random, the player steers and fires from a replay
//! script, and the final score is logged when the run ends.

mod config;
mod game;
mod spawner;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use glam::Vec2;

use arcade_core::driver::run_headless;
use arcade_core::render::HeadlessFrontend;
use arcade_core::replay::load_replay_from_path;

use config::{load_config_from_path, GameConfig};
use game::{GeoWarsGame, Kind};

#[derive(Parser)]
#[command(name = "geowars")]
#[command(about = "GeoWars on a fixed-timestep loop, without a window")]
struct Args {
    /// Game config JSON file. Built-in tunables are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay script of action events to feed in.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Seconds of game time to run.
    #[arg(long, default_value_t = 30.0)]
    seconds: f32,

    /// Spawner seed. Overrides the config file's seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("GeoWars starting...");

    let config = match &args.config {
        Some(path) => load_config_from_path(path),
        None => Ok(GameConfig::default()),
    }
    .inspect_err(|e| log::error!("{e}"))?;

    let replay = args
        .replay
        .as_deref()
        .map(load_replay_from_path)
        .transpose()
        .inspect_err(|e| log::error!("{e}"))?;

    if !args.seconds.is_finite() || args.seconds < 0.0 {
        return Err(format!("--seconds must be a non-negative number, got {}", args.seconds));
    }

    let seed = args.seed.or(config.seed).unwrap_or_else(|| {
        let seed = rand::random();
        log::info!("No seed given, using {}", seed);
        seed
    });

    log::debug!("HUD uses font '{}' at {}px", config.font.path, config.font.size);
    let view = Vec2::new(config.window.width, config.window.height);
    let mut game = GeoWarsGame::new(config, seed);
    let mut frontend = HeadlessFrontend::new(view);
    let summary = run_headless(
        &mut game,
        replay.as_ref(),
        Duration::from_secs_f32(args.seconds),
        &mut frontend,
    );

    log::info!(
        "Final: score {}, {} large and {} small enemies on screen, {} frame(s)",
        game.score(),
        game.store().count(Some(Kind::LargeEnemy)),
        game.store().count(Some(Kind::SmallEnemy)),
        summary.frames
    );
    Ok(())
}
