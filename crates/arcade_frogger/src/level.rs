use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Level description: view size, session tunables and the static background
/// placements. Lane traffic is fixed and lives in `lanes`.
#[derive(Debug, Deserialize, Clone)]
pub struct LevelFile {
    pub version: String,
    #[serde(default = "default_level_id")]
    pub level_id: String,
    #[serde(default)]
    pub view: ViewSize,
    #[serde(default = "default_timer_seconds")]
    pub timer_seconds: u64,
    #[serde(default = "default_lives")]
    pub lives: u32,
    #[serde(default = "default_goals_to_win")]
    pub goals_to_win: u32,
    #[serde(default)]
    pub backgrounds: Vec<Background>,
    /// Extra animation files layered over the built-in clips.
    #[serde(default)]
    pub animation_files: Vec<PathBuf>,
    #[serde(flatten)]
    pub unknown: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ViewSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewSize {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 600.0,
        }
    }
}

/// Whole texture positioned by its top-left corner.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Background {
    pub texture: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl Default for LevelFile {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            level_id: default_level_id(),
            view: ViewSize::default(),
            timer_seconds: default_timer_seconds(),
            lives: default_lives(),
            goals_to_win: default_goals_to_win(),
            backgrounds: vec![Background {
                texture: "background".to_string(),
                x: 0.0,
                y: 0.0,
            }],
            animation_files: Vec::new(),
            unknown: HashMap::new(),
        }
    }
}

pub fn load_level_from_path(path: &Path) -> Result<LevelFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level file {}: {e}", path.display()))?;
    let mut level: LevelFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", path.display()))?;
    validate_level(&level)?;
    for key in level.unknown.keys() {
        log::warn!("Level '{}': ignoring unknown key '{}'", level.level_id, key);
    }

    // Animation files are listed relative to the level file.
    if let Some(dir) = path.parent() {
        for file in &mut level.animation_files {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }
    }
    Ok(level)
}

pub const MAX_LIVES: u32 = 99;
pub const MAX_TIMER_SECONDS: u64 = 3600;

pub fn validate_level(level: &LevelFile) -> Result<(), String> {
    if level.version != "0.1" {
        return Err(format!(
            "Level validation failed: unsupported version '{}'",
            level.version
        ));
    }
    if level.view.width <= 0.0 || level.view.height <= 0.0 {
        return Err(format!(
            "Level validation failed: view size {}x{} must be positive",
            level.view.width, level.view.height
        ));
    }
    if level.timer_seconds == 0 || level.timer_seconds > MAX_TIMER_SECONDS {
        return Err(format!(
            "Level validation failed: timer_seconds {} must be in 1..={}",
            level.timer_seconds, MAX_TIMER_SECONDS
        ));
    }
    if level.lives == 0 || level.lives > MAX_LIVES {
        return Err(format!(
            "Level validation failed: lives {} must be in 1..={}",
            level.lives, MAX_LIVES
        ));
    }
    if level.goals_to_win == 0 || level.goals_to_win > 5 {
        return Err(format!(
            "Level validation failed: goals_to_win {} must be in 1..=5",
            level.goals_to_win
        ));
    }
    for (i, bkg) in level.backgrounds.iter().enumerate() {
        if bkg.texture.is_empty() {
            return Err(format!(
                "Level validation failed: background {} has empty texture name",
                i
            ));
        }
    }
    Ok(())
}

fn default_level_id() -> String {
    "frogger".to_string()
}

const fn default_timer_seconds() -> u64 {
    60
}

const fn default_lives() -> u32 {
    3
}

const fn default_goals_to_win() -> u32 {
    5
}
