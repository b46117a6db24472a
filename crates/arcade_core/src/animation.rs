//! Sprite-frame clips, a playback cursor, and the named clip library.
//!
//! Frame timing is integer microseconds so that playback driven by the fixed
//! step lands on the same frame on every run. Files give `duration_ms`.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnimationFrame {
    pub sprite_id: String,
    #[serde(rename = "duration_ms", deserialize_with = "millis_as_micros")]
    pub duration_us: u64,
}

impl AnimationFrame {
    pub fn new(sprite_id: &str, duration_ms: u64) -> Self {
        Self {
            sprite_id: sprite_id.to_string(),
            duration_us: duration_ms * 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnimationClip {
    pub frames: Vec<AnimationFrame>,
    /// A non-looping clip holds its last frame once played through.
    #[serde(default)]
    pub looping: bool,
}

impl AnimationClip {
    /// `count` frames named `{prefix}{i}`, all with the same duration.
    pub fn uniform(prefix: &str, count: usize, frame_ms: u64, looping: bool) -> Self {
        Self {
            frames: (0..count)
                .map(|i| AnimationFrame::new(&format!("{prefix}{i}"), frame_ms))
                .collect(),
            looping,
        }
    }

    pub fn still(sprite_id: &str) -> Self {
        Self {
            frames: vec![AnimationFrame::new(sprite_id, 1000)],
            looping: true,
        }
    }

    pub fn total_duration_us(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_us).sum()
    }
}

/// Where one entity is within a clip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Playback {
    pub frame: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl Playback {
    /// Move forward by `dt_us`, crossing as many frame boundaries as the
    /// time covers. Returns the frame now showing.
    pub fn advance(&mut self, dt_us: u64, clip: &AnimationClip) -> usize {
        let last = match clip.frames.len() {
            0 => return self.frame,
            n => n - 1,
        };
        if self.finished {
            return self.frame;
        }

        self.elapsed_us += dt_us;
        while let Some(frame) = clip.frames.get(self.frame) {
            if self.elapsed_us < frame.duration_us {
                break;
            }
            self.elapsed_us -= frame.duration_us;
            if self.frame < last {
                self.frame += 1;
            } else if clip.looping {
                self.frame = 0;
            } else {
                self.elapsed_us = 0;
                self.finished = true;
                break;
            }
        }
        self.frame
    }
}

/// On-disk animation set.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationFile {
    pub version: String,
    pub animation_id: String,
    pub animations: HashMap<String, AnimationClip>,
}

fn millis_as_micros<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(ms.saturating_mul(1000))
}

pub fn load_animation_file(path: &Path) -> Result<AnimationFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read animation file {}: {e}", path.display()))?;
    let file: AnimationFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse animation file {}: {e}", path.display()))?;
    validate_animation_file(&file)?;
    Ok(file)
}

pub fn validate_animation_file(file: &AnimationFile) -> Result<(), String> {
    if file.version != "0.1" {
        return Err(format!(
            "Animation validation failed: unsupported version '{}'",
            file.version
        ));
    }
    if file.animation_id.is_empty() {
        return Err("Animation validation failed: animation_id is empty".to_string());
    }
    for (name, clip) in &file.animations {
        if clip.frames.is_empty() {
            return Err(format!("Animation validation failed: clip '{}' has no frames", name));
        }
        if let Some(i) = clip.frames.iter().position(|f| f.sprite_id.is_empty()) {
            return Err(format!(
                "Animation validation failed: clip '{}' frame {} has empty sprite_id",
                name, i
            ));
        }
        if let Some(i) = clip.frames.iter().position(|f| f.duration_us == 0) {
            return Err(format!(
                "Animation validation failed: clip '{}' frame {} has zero duration",
                name, i
            ));
        }
    }
    Ok(())
}

/// Clips by name. Clips are shared, so attaching one to many entities does
/// not copy frames.
#[derive(Debug, Default)]
pub struct AnimationLibrary {
    clips: HashMap<String, Arc<AnimationClip>>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, clip: AnimationClip) {
        if self.clips.insert(name.to_string(), Arc::new(clip)).is_some() {
            log::debug!("Animation '{}' replaced", name);
        }
    }

    /// Add every clip in an animation file, replacing same-named clips.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, String> {
        let file = load_animation_file(path)?;
        let count = file.animations.len();
        for (name, clip) in file.animations {
            self.insert(&name, clip);
        }
        log::info!(
            "Loaded {} animation(s) from '{}' ({})",
            count,
            file.animation_id,
            path.display()
        );
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<Arc<AnimationClip>> {
        self.clips.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    const TICK_US: u64 = 16_667;

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "arcade_anim_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn clip_ms(durations: &[u64], looping: bool) -> AnimationClip {
        AnimationClip {
            frames: durations
                .iter()
                .enumerate()
                .map(|(i, &ms)| AnimationFrame::new(&format!("f{i}"), ms))
                .collect(),
            looping,
        }
    }

    #[test]
    fn frame_changes_exactly_at_its_duration() {
        let clip = clip_ms(&[100, 100, 100], true);
        let mut p = Playback::default();
        assert_eq!(p.advance(99_999, &clip), 0);
        assert_eq!(p.advance(1, &clip), 1);
        assert_eq!(p.elapsed_us, 0);
    }

    #[test]
    fn one_long_step_crosses_several_frames() {
        let clip = clip_ms(&[50, 200, 100], true);
        let mut p = Playback::default();
        assert_eq!(p.advance(260_000, &clip), 2);
        assert_eq!(p.elapsed_us, 10_000);
    }

    #[test]
    fn looping_clip_wraps_to_first_frame() {
        let clip = clip_ms(&[100, 100], true);
        let mut p = Playback::default();
        assert_eq!(p.advance(250_000, &clip), 0);
        assert_eq!(p.elapsed_us, 50_000);
        assert!(!p.finished);
    }

    #[test]
    fn one_shot_clip_holds_last_frame() {
        let clip = AnimationClip::uniform("frog_die", 4, 150, false);
        let mut p = Playback::default();
        let mut ticks = 0;
        while !p.finished {
            p.advance(TICK_US, &clip);
            ticks += 1;
        }
        // 600 ms of frames at 16.667 ms per tick.
        assert_eq!(ticks, 36);
        assert_eq!(p.frame, 3);
        assert_eq!(p.advance(1_000_000, &clip), 3);
    }

    #[test]
    fn empty_clip_is_a_no_op() {
        let clip = AnimationClip {
            frames: Vec::new(),
            looping: true,
        };
        let mut p = Playback::default();
        assert_eq!(p.advance(TICK_US, &clip), 0);
        assert_eq!(p, Playback::default());
    }

    #[test]
    fn turtle_cycle_is_the_same_every_run() {
        let clip = clip_ms(&[1200, 300, 300, 900, 300], true);
        let run = || {
            let mut p = Playback::default();
            (0..600).map(|_| p.advance(TICK_US, &clip)).collect::<Vec<_>>()
        };
        let frames = run();
        assert_eq!(frames, run());
        assert!(frames.contains(&3));
    }

    #[test]
    fn file_durations_are_read_as_milliseconds() {
        let path = temp_file_path("valid");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "animation_id": "frogger",
              "animations": {
                "2turtles": {
                  "frames": [
                    { "sprite_id": "turtle-0", "duration_ms": 400 },
                    { "sprite_id": "turtle-1", "duration_ms": 250 }
                  ],
                  "looping": true
                },
                "die": { "frames": [{ "sprite_id": "splat-0", "duration_ms": 150 }] }
              }
            }"#,
        )
        .expect("write temp file");

        let file = load_animation_file(&path).expect("should parse");
        assert_eq!(file.animation_id, "frogger");
        let turtles = &file.animations["2turtles"];
        assert!(turtles.looping);
        assert_eq!(turtles.frames[1], AnimationFrame::new("turtle-1", 250));
        assert_eq!(turtles.total_duration_us(), 650_000);
        assert!(!file.animations["die"].looping);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn bad_files_are_rejected() {
        let cases = [
            ("version", r#"{ "version": "9.9", "animation_id": "x", "animations": {} }"#, "unsupported version"),
            ("no_id", r#"{ "version": "0.1", "animation_id": "", "animations": {} }"#, "animation_id is empty"),
            (
                "no_frames",
                r#"{ "version": "0.1", "animation_id": "x", "animations": { "up": { "frames": [] } } }"#,
                "has no frames",
            ),
            (
                "zero",
                r#"{ "version": "0.1", "animation_id": "x", "animations": { "up": { "frames": [{ "sprite_id": "a", "duration_ms": 0 }] } } }"#,
                "zero duration",
            ),
        ];
        for (hint, body, expected) in cases {
            let path = temp_file_path(hint);
            fs::write(&path, body).expect("write temp file");
            let err = load_animation_file(&path).expect_err("bad file should fail");
            assert!(err.contains(expected), "{hint}: {err}");
            let _ = fs::remove_file(path);
        }
    }

    #[test]
    fn library_overrides_and_shares_clips() {
        let path = temp_file_path("library");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "animation_id": "traffic",
              "animations": {
                "car": { "frames": [{ "sprite_id": "car-0", "duration_ms": 100 }], "looping": true },
                "truck": { "frames": [{ "sprite_id": "truck-0", "duration_ms": 100 }], "looping": true }
              }
            }"#,
        )
        .expect("write temp file");

        let mut lib = AnimationLibrary::new();
        lib.insert("car", AnimationClip::still("placeholder"));
        assert_eq!(lib.load_file(&path).expect("should load"), 2);
        assert_eq!(lib.len(), 2);

        let a = lib.get("car").expect("car clip");
        let b = lib.get("car").expect("car clip");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.frames[0].sprite_id, "car-0");
        assert!(lib.get("tree1").is_none());

        let _ = fs::remove_file(path);
    }
}
