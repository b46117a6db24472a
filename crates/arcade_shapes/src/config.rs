use glam::Vec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use arcade_core::render::Color;

/// Window, font and the shapes to bounce. Positions are centres, velocities
/// are pixels per second.
#[derive(Debug, Deserialize, Clone)]
pub struct ShapesConfig {
    pub version: String,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub font: FontConfig,
    #[serde(default)]
    pub circles: Vec<CircleSpec>,
    #[serde(default)]
    pub rects: Vec<RectSpec>,
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
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FontConfig {
    #[serde(default = "default_font_path")]
    pub path: String,
    #[serde(default = "default_font_size")]
    pub size: u32,
    #[serde(default = "default_font_color")]
    pub color: Color,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: default_font_path(),
            size: default_font_size(),
            color: default_font_color(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CircleSpec {
    pub name: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub radius: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RectSpec {
    pub name: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub size: Vec2,
}

impl Default for ShapesConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            window: WindowConfig::default(),
            font: FontConfig::default(),
            circles: vec![
                CircleSpec {
                    name: "CGreen".to_string(),
                    pos: Vec2::new(100.0, 100.0),
                    vel: Vec2::new(-180.0, 120.0),
                    color: Color::rgb(0, 255, 0),
                    radius: 50.0,
                },
                CircleSpec {
                    name: "CBlue".to_string(),
                    pos: Vec2::new(200.0, 200.0),
                    vel: Vec2::new(120.0, 240.0),
                    color: Color::rgb(0, 0, 255),
                    radius: 100.0,
                },
                CircleSpec {
                    name: "CPurple".to_string(),
                    pos: Vec2::new(300.0, 300.0),
                    vel: Vec2::new(-120.0, -60.0),
                    color: Color::rgb(255, 0, 255),
                    radius: 75.0,
                },
            ],
            rects: vec![
                RectSpec {
                    name: "RRed".to_string(),
                    pos: Vec2::new(200.0, 200.0),
                    vel: Vec2::new(600.0, 300.0),
                    color: Color::rgb(255, 0, 0),
                    size: Vec2::new(50.0, 25.0),
                },
                RectSpec {
                    name: "RGrey".to_string(),
                    pos: Vec2::new(300.0, 250.0),
                    vel: Vec2::new(-120.0, 120.0),
                    color: Color::rgb(100, 100, 100),
                    size: Vec2::new(50.0, 100.0),
                },
                RectSpec {
                    name: "RTeal".to_string(),
                    pos: Vec2::new(25.0, 100.0),
                    vel: Vec2::new(-120.0, -120.0),
                    color: Color::rgb(0, 255, 255),
                    size: Vec2::new(100.0, 100.0),
                },
            ],
            unknown: HashMap::new(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<ShapesConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: ShapesConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    for key in config.unknown.keys() {
        log::warn!("Config {}: ignoring unknown key '{}'", path.display(), key);
    }
    Ok(config)
}

pub fn validate_config(config: &ShapesConfig) -> Result<(), String> {
    if config.version != "0.1" {
        return Err(format!(
            "Config validation failed: unsupported version '{}'",
            config.version
        ));
    }
    if config.window.width <= 0.0 || config.window.height <= 0.0 {
        return Err("Config validation failed: window size must be positive".to_string());
    }
    if config.font.size == 0 {
        return Err("Config validation failed: font size must be > 0".to_string());
    }
    for c in &config.circles {
        if c.radius <= 0.0 {
            return Err(format!(
                "Config validation failed: circle '{}' radius must be > 0",
                c.name
            ));
        }
    }
    for r in &config.rects {
        if r.size.x <= 0.0 || r.size.y <= 0.0 {
            return Err(format!(
                "Config validation failed: rect '{}' size must be positive",
                r.name
            ));
        }
    }
    Ok(())
}

fn default_font_path() -> String {
    "fonts/arial.ttf".to_string()
}

const fn default_font_size() -> u32 {
    18
}

const fn default_font_color() -> Color {
    Color::rgb(255, 255, 255)
}
