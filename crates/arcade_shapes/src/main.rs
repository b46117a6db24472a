//! Bouncing shapes, run headless.

mod config;
mod sample;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use glam::Vec2;

use arcade_core::driver::run_headless;
use arcade_core::render::HeadlessFrontend;
use arcade_core::replay::load_replay_from_path;

use config::{load_config_from_path, ShapesConfig};
use sample::ShapesSample;

#[derive(Parser)]
#[command(name = "shapes")]
#[command(about = "Named shapes bouncing inside the window, without a window")]
struct Args {
    /// Shapes JSON file. A built-in set is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay script of action events to feed in.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Seconds of game time to run.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from_path(path),
        None => Ok(ShapesConfig::default()),
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

    log::debug!("Labels use font '{}' at {}px", config.font.path, config.font.size);
    let mut sample = ShapesSample::new(&config);
    let mut frontend = HeadlessFrontend::new(Vec2::new(config.window.width, config.window.height));
    run_headless(
        &mut sample,
        replay.as_ref(),
        Duration::from_secs_f32(args.seconds),
        &mut frontend,
    );

    for e in sample.store().alive(None) {
        if let (Some(label), Some(t)) = (&e.components.label, e.components.transform) {
            log::info!("{} ends at ({:.1}, {:.1})", label.0, t.pos.x, t.pos.y);
        }
    }
    Ok(())
}
