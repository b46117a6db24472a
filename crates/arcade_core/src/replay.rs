//! Replay scripts: logical action events laid out over real frames.
//!
//! ```json
//! { "frame_dt": 0.016667,
//!   "frames": [ { "events": [{ "action": "up", "kind": "start" }], "repeat": 30 } ] }
//! ```
//!
//! A step's events fire on its first frame; the other `repeat - 1` frames
//! carry no events.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::input::ActionEvent;

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    /// Seconds of real time per frame.
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,
    #[serde(rename = "frames")]
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayStep {
    #[serde(default)]
    pub events: Vec<ActionEvent>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

const fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

impl ReplayScript {
    pub fn frame_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.frame_dt).unwrap_or(crate::time::FIXED_DT)
    }

    /// Frames covered by the script; later frames are quiet.
    pub fn frame_count(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.repeat)).sum()
    }

    /// Events scheduled for real frame `frame` (0-based).
    pub fn events_at(&self, frame: u64) -> &[ActionEvent] {
        let mut start = 0u64;
        for step in &self.steps {
            if frame == start {
                return &step.events;
            }
            start += u64::from(step.repeat);
            if frame < start {
                break;
            }
        }
        &[]
    }

    /// Events per frame in order, quiet frames included.
    pub fn frames(&self) -> impl Iterator<Item = &[ActionEvent]> + '_ {
        self.steps.iter().flat_map(|step| {
            std::iter::once(step.events.as_slice())
                .chain(std::iter::repeat(&[][..]).take(step.repeat.saturating_sub(1) as usize))
        })
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplayScript, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read replay {}: {e}", path.display()))?;
    let script: ReplayScript = serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse replay {}: {e}", path.display()))?;
    validate_replay(&script)?;
    log::debug!(
        "Replay {}: {} frame(s) at {:.4}s",
        path.display(),
        script.frame_count(),
        script.frame_dt
    );
    Ok(script)
}

pub fn validate_replay(script: &ReplayScript) -> Result<(), String> {
    if !script.frame_dt.is_finite() || script.frame_dt <= 0.0 {
        return Err(format!(
            "Replay validation failed: frame_dt must be a positive number, got {}",
            script.frame_dt
        ));
    }
    if script.steps.is_empty() {
        return Err("Replay validation failed: no frames".to_string());
    }
    if let Some(i) = script.steps.iter().position(|s| s.repeat == 0) {
        return Err(format!("Replay validation failed: frame {} has repeat 0", i));
    }
    Ok(())
}
