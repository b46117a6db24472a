//! GeoWars tunables.
//!
//! Speeds are pixels per second, angular speeds degrees per second, and
//! lifespans and the spawn interval are seconds.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use arcade_core::components::MIN_VERTICES;
use arcade_core::render::Color;

/// Upper bound for any configured span of seconds.
pub const MAX_SECONDS: f32 = 1.0e6;

#[derive(Debug, Deserialize, Clone)]
pub struct GameConfig {
    pub version: String,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub font: FontConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub enemy: EnemyConfig,
    #[serde(default)]
    pub bullet: BulletConfig,
    /// Spawner seed. A fresh one is picked per run when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub unknown: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 768.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FontConfig {
    #[serde(default = "default_font_path")]
    pub path: String,
    #[serde(default = "default_font_size")]
    pub size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: default_font_path(),
            size: default_font_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub shape_radius: f32,
    pub collision_radius: f32,
    pub speed: f32,
    pub angular_speed: f32,
    pub fill: Color,
    pub outline: Color,
    pub outline_thickness: f32,
    pub vertices: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            shape_radius: 32.0,
            collision_radius: 32.0,
            speed: 300.0,
            angular_speed: 90.0,
            fill: Color::rgb(5, 5, 5),
            outline: Color::rgb(255, 0, 0),
            outline_thickness: 4.0,
            vertices: 8,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnemyConfig {
    pub shape_radius: f32,
    pub collision_radius: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub outline: Color,
    pub outline_thickness: f32,
    pub vertices_min: u32,
    pub vertices_max: u32,
    /// Lifespan of the fragments a destroyed enemy breaks into.
    pub lifespan: f32,
    /// Mean seconds between arrivals.
    pub spawn_interval: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            shape_radius: 32.0,
            collision_radius: 32.0,
            speed_min: 60.0,
            speed_max: 180.0,
            outline: Color::rgb(255, 255, 255),
            outline_thickness: 2.0,
            vertices_min: 3,
            vertices_max: 8,
            lifespan: 1.5,
            spawn_interval: 2.0,
        }
    }
}

impl EnemyConfig {
    pub fn fragment_lifespan(&self) -> Duration {
        Duration::from_secs_f32(self.lifespan)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BulletConfig {
    pub shape_radius: f32,
    pub collision_radius: f32,
    pub speed: f32,
    pub fill: Color,
    pub outline: Color,
    pub outline_thickness: f32,
    pub vertices: u32,
    pub lifespan: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            shape_radius: 10.0,
            collision_radius: 10.0,
            speed: 600.0,
            fill: Color::rgb(255, 255, 255),
            outline: Color::rgb(255, 0, 0),
            outline_thickness: 2.0,
            vertices: 20,
            lifespan: 1.0,
        }
    }
}

impl BulletConfig {
    pub fn lifespan(&self) -> Duration {
        Duration::from_secs_f32(self.lifespan)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            window: WindowConfig::default(),
            font: FontConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            bullet: BulletConfig::default(),
            seed: None,
            unknown: HashMap::new(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    for key in config.unknown.keys() {
        log::warn!("Config {}: ignoring unknown key '{}'", path.display(), key);
    }
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.version != "0.1" {
        return Err(format!(
            "Config validation failed: unsupported version '{}'",
            config.version
        ));
    }
    let e = &config.enemy;
    if e.vertices_min < MIN_VERTICES {
        return Err(format!(
            "Config validation failed: enemy vertices_min {} is below {}",
            e.vertices_min, MIN_VERTICES
        ));
    }
    if e.vertices_min > e.vertices_max {
        return Err(format!(
            "Config validation failed: enemy vertices_min {} exceeds vertices_max {}",
            e.vertices_min, e.vertices_max
        ));
    }
    if e.speed_min < 0.0 || e.speed_min > e.speed_max {
        return Err(format!(
            "Config validation failed: enemy speed range {}..{} is invalid",
            e.speed_min, e.speed_max
        ));
    }
    for (what, secs) in [
        ("enemy spawn_interval", e.spawn_interval),
        ("enemy lifespan", e.lifespan),
        ("bullet lifespan", config.bullet.lifespan),
    ] {
        if secs.is_nan() || secs <= 0.0 || secs > MAX_SECONDS {
            return Err(format!(
                "Config validation failed: {what} must be in (0, {MAX_SECONDS}] seconds, got {secs}"
            ));
        }
    }
    for (what, radius) in [
        ("player collision_radius", config.player.collision_radius),
        ("enemy collision_radius", e.collision_radius),
        ("bullet collision_radius", config.bullet.collision_radius),
    ] {
        if radius <= 0.0 {
            return Err(format!("Config validation failed: {what} must be > 0"));
        }
    }
    let w = &config.window;
    if w.width <= 2.0 * e.collision_radius || w.height <= 2.0 * e.collision_radius {
        return Err(format!(
            "Config validation failed: window {}x{} too small for enemies of radius {}",
            w.width, w.height, e.collision_radius
        ));
    }
    if config.player.vertices < MIN_VERTICES || config.bullet.vertices < MIN_VERTICES {
        log::warn!("Player or bullet vertex count below {}, will be raised", MIN_VERTICES);
    }
    Ok(())
}

fn default_font_path() -> String {
    "fonts/arial.ttf".to_string()
}

const fn default_font_size() -> u32 {
    24
}
