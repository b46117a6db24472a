//! Animation clips and sound names used by the Frogger scene.
//!
//! Every clip the scene asks for has a built-in default, so the game runs
//! without any asset files. Animation files named by the level replace
//! defaults clip by clip.

use std::sync::Arc;

use arcade_core::animation::{AnimationClip, AnimationFrame, AnimationLibrary};

use crate::level::LevelFile;

pub const SOUND_HOP: &str = "hop";
pub const SOUND_DEATH: &str = "death";

/// Frame of the turtle cycle during which the turtles are under water.
pub const TURTLE_SUBMERGED_FRAME: usize = 3;

pub const REQUIRED_CLIPS: &[&str] = &[
    "up", "down", "left", "right", "die", "raceCarL", "raceCarR", "tractor", "car", "truck",
    "3turtles", "2turtles", "tree1", "tree2", "lillyPad", "frogIcon", "lives",
];

/// Surface, sink, under, rise.
fn turtle_clip(prefix: &str) -> AnimationClip {
    AnimationClip {
        frames: vec![
            AnimationFrame::new(&format!("{prefix}0"), 1200),
            AnimationFrame::new(&format!("{prefix}1"), 300),
            AnimationFrame::new(&format!("{prefix}2"), 300),
            AnimationFrame::new(&format!("{prefix}3"), 900),
            AnimationFrame::new(&format!("{prefix}4"), 300),
        ],
        looping: true,
    }
}

pub fn default_animations() -> AnimationLibrary {
    let mut lib = AnimationLibrary::new();
    for dir in ["up", "down", "left", "right"] {
        lib.insert(dir, AnimationClip::uniform(&format!("frog_{dir}"), 2, 60, false));
    }
    lib.insert("die", AnimationClip::uniform("frog_die", 4, 150, false));
    for vehicle in ["raceCarL", "raceCarR", "tractor", "car", "truck"] {
        lib.insert(vehicle, AnimationClip::still(vehicle));
    }
    lib.insert("3turtles", turtle_clip("turtles3_"));
    lib.insert("2turtles", turtle_clip("turtles2_"));
    lib.insert("tree1", AnimationClip::still("tree1"));
    lib.insert("tree2", AnimationClip::still("tree2"));
    lib.insert("lillyPad", AnimationClip::still("lillyPad"));
    lib.insert("frogIcon", AnimationClip::still("frogIcon"));
    lib.insert("lives", AnimationClip::still("lives"));
    lib
}

/// Built-in clips plus whatever the level's animation files provide.
pub fn load_animations(level: &LevelFile) -> Result<AnimationLibrary, String> {
    let mut lib = default_animations();
    for path in &level.animation_files {
        lib.load_file(path)?;
    }
    validate_library(&lib)?;
    Ok(lib)
}

pub fn validate_library(lib: &AnimationLibrary) -> Result<(), String> {
    for name in REQUIRED_CLIPS {
        if !lib.contains(name) {
            return Err(format!("Animation '{}' is required but missing", name));
        }
    }
    if let Some(die) = lib.get("die") {
        if die.looping {
            return Err("Animation 'die' must not loop".to_string());
        }
    }
    for turtles in ["3turtles", "2turtles"] {
        if let Some(clip) = lib.get(turtles) {
            if clip.frames.len() <= TURTLE_SUBMERGED_FRAME {
                return Err(format!(
                    "Animation '{}' needs at least {} frames",
                    turtles,
                    TURTLE_SUBMERGED_FRAME + 1
                ));
            }
        }
    }
    Ok(())
}

/// Look up a clip the scene relies on.
pub fn clip(lib: &AnimationLibrary, name: &str) -> Result<Arc<AnimationClip>, String> {
    lib.get(name)
        .ok_or_else(|| format!("Animation '{}' is not loaded", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "arcade_frogger_assets_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_cover_every_required_clip() {
        let lib = default_animations();
        assert!(validate_library(&lib).is_ok());
        assert_eq!(lib.len(), REQUIRED_CLIPS.len());
    }

    #[test]
    fn death_animation_ends() {
        let lib = default_animations();
        let die = clip(&lib, "die").expect("die clip");
        assert!(!die.looping);
        assert_eq!(die.total_duration_us(), 600_000);
    }

    #[test]
    fn level_animation_file_overrides_default() {
        let path = temp_file_path("override");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "animation_id": "frogger_hd",
              "animations": {
                "die": {
                  "frames": [
                    { "sprite_id": "splat_a", "duration_ms": 100 },
                    { "sprite_id": "splat_b", "duration_ms": 100 }
                  ]
                }
              }
            }"#,
        )
        .expect("write animation file");

        let level = LevelFile {
            animation_files: vec![path.clone()],
            ..LevelFile::default()
        };
        let lib = load_animations(&level).expect("animations should load");
        let die = clip(&lib, "die").expect("die clip");
        assert_eq!(die.frames[0].sprite_id, "splat_a");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn looping_death_is_rejected() {
        let mut lib = default_animations();
        lib.insert("die", AnimationClip::uniform("x", 2, 100, true));
        let err = validate_library(&lib).expect_err("looping die should fail");
        assert!(err.contains("must not loop"));
    }
}
