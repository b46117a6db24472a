//! Enemy arrivals.
//!
//! Arrivals form a renewal process: the gap before the next enemy is drawn
//! from an exponential distribution whose mean is the configured spawn
//! interval. The countdown starts at zero, so the first enemy appears on the
//! first tick.

use std::time::Duration;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arcade_core::math::unit_from_bearing;
use arcade_core::render::{Color, Rect};

use crate::config::EnemyConfig;

/// Everything needed to place one large enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyRoll {
    pub pos: Vec2,
    pub vel: Vec2,
    pub vertices: u32,
    pub fill: Color,
}

pub struct EnemySpawner {
    rng: StdRng,
    countdown: Duration,
    mean: f32,
}

impl EnemySpawner {
    pub fn new(seed: u64, mean_interval_secs: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            countdown: Duration::ZERO,
            mean: mean_interval_secs,
        }
    }

    /// Count down by `dt`. Returns true when an enemy is due; the next gap
    /// is drawn at the same time.
    pub fn tick(&mut self, dt: Duration) -> bool {
        // Due once the countdown would go below zero; landing exactly on zero waits a tick.
        match self.countdown.checked_sub(dt) {
            Some(rest) => {
                self.countdown = rest;
                false
            }
            None => {
                self.countdown = self.next_gap();
                log::trace!("next enemy in {:.2}s", self.countdown.as_secs_f32());
                true
            }
        }
    }

    /// Inverse-CDF sample of an exponential with the configured mean.
    fn next_gap(&mut self) -> Duration {
        let u: f32 = self.rng.gen_range(0.0..1.0);
        let secs = -self.mean * (1.0 - u).ln();
        Duration::try_from_secs_f32(secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Pick position, heading, speed, vertex count and colour for a new
    /// enemy that fits entirely inside `bounds`.
    pub fn roll(&mut self, cfg: &EnemyConfig, bounds: Rect) -> EnemyRoll {
        let r = cfg.collision_radius;
        let pos = Vec2::new(
            self.rng.gen_range(bounds.left + r..=bounds.right() - r),
            self.rng.gen_range(bounds.top + r..=bounds.bottom() - r),
        );
        let vertices = self.rng.gen_range(cfg.vertices_min..=cfg.vertices_max);
        let fill = Color::rgb(self.rng.gen(), self.rng.gen(), self.rng.gen());
        let heading = self.rng.gen_range(0.0..360.0);
        let speed = self.rng.gen_range(cfg.speed_min..=cfg.speed_max);
        EnemyRoll {
            pos,
            vel: unit_from_bearing(heading) * speed,
            vertices,
            fill,
        }
    }
}
