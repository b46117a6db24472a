//! Frogger, run headless.
//!
//! There is no window: the scene is driven by the fixed-timestep loop for a
//! set amount of time, optionally fed by a replay script of action events,
//! and the final session state is logged.

mod assets;
mod lanes;
mod level;
mod scene;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use glam::Vec2;

use arcade_core::driver::run_headless;
use arcade_core::render::HeadlessFrontend;
use arcade_core::replay::load_replay_from_path;

use level::{load_level_from_path, LevelFile};
use scene::FroggerScene;

#[derive(Parser)]
#[command(name = "frogger")]
#[command(about = "Frogger on a fixed-timestep loop, without a window")]
struct Args {
    /// Level JSON file. The built-in level is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay script of action events to feed in.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Seconds of game time to run.
    #[arg(long, default_value_t = 30.0)]
    seconds: f32,
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Frogger starting...");

    let level = match &args.config {
        Some(path) => load_level_from_path(path),
        None => Ok(LevelFile::default()),
    }
    .inspect_err(|e| log::error!("{e}"))?;

    let library = assets::load_animations(&level).inspect_err(|e| log::error!("{e}"))?;
    let replay = args
        .replay
        .as_deref()
        .map(load_replay_from_path)
        .transpose()
        .inspect_err(|e| log::error!("{e}"))?;

    if !args.seconds.is_finite() || args.seconds < 0.0 {
        return Err(format!("--seconds must be a non-negative number, got {}", args.seconds));
    }

    let mut scene = FroggerScene::new(&level, library)?;
    let mut frontend = HeadlessFrontend::new(Vec2::new(level.view.width, level.view.height));
    let summary = run_headless(
        &mut scene,
        replay.as_ref(),
        Duration::from_secs_f32(args.seconds),
        &mut frontend,
    );

    log::info!(
        "Final: score {}, lives {}, goals {}, {} frame(s), {} sound(s)",
        scene.score(),
        scene.lives().max(0),
        scene.goals_reached(),
        summary.frames,
        frontend.sounds_played.len()
    );
    Ok(())
}
