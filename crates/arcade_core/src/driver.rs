//! Fixed-timestep frame driver.
//!
//! One call to `GameLoop::frame` is one real frame:
//!
//!   1. hand this frame's action events to the scene and the `ActionState`
//!   2. feed the real delta into the accumulator
//!   3. `while should_step()` run one simulation tick at the fixed dt
//!   4. render once from the latest state, then present
//!   5. play whatever sounds the ticks queued
//!
//! Edge-triggered action state is cleared only on frames that ran at least
//! one tick, so a press never falls between two ticks unseen.

use std::time::Duration;

use crate::input::{ActionEvent, ActionState};
use crate::render::{Renderer, SoundCue, SoundPlayer};
use crate::replay::ReplayScript;
use crate::time::{TimeState, FIXED_DT};

pub trait Scene {
    /// Called once per event, before this frame's ticks. Pause and quit are
    /// handled here so they work while the simulation is paused.
    fn on_action(&mut self, _event: &ActionEvent) {}

    /// One simulation tick.
    fn update(&mut self, dt: Duration, actions: &ActionState);

    fn render(&self, renderer: &mut dyn Renderer);

    /// Drain sounds queued since the last call.
    fn take_sounds(&mut self) -> Vec<SoundCue> {
        Vec::new()
    }

    fn is_finished(&self) -> bool {
        false
    }

    /// Called once per real frame after ticking, before rendering.
    fn frame_stats(&mut self, _time: &TimeState) {}
}

pub struct GameLoop {
    pub time: TimeState,
    pub actions: ActionState,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            time: TimeState::new(),
            actions: ActionState::new(),
        }
    }

    /// Run one real frame. Returns the number of ticks taken.
    pub fn frame<S, F>(&mut self, scene: &mut S, real_dt: Duration, events: &[ActionEvent], frontend: &mut F) -> u32
    where
        S: Scene + ?Sized,
        F: Renderer + SoundPlayer,
    {
        for event in events {
            self.actions.apply(event);
            scene.on_action(event);
        }

        self.time.advance(real_dt);
        while self.time.should_step() {
            scene.update(self.time.fixed_dt, &self.actions);
            if scene.is_finished() {
                break;
            }
        }
        self.time.end_frame();
        if self.time.steps_this_frame > 0 {
            self.actions.end_frame();
        }
        scene.frame_stats(&self.time);

        scene.render(frontend);
        frontend.present();

        for cue in scene.take_sounds() {
            frontend.play(&cue);
        }
        self.time.steps_this_frame
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub steps: u64,
    pub finished: bool,
}

/// Drive a scene without a window for `duration` of simulated real time,
/// feeding scripted events when a replay is given. Stops early when the
/// scene finishes.
pub fn run_headless<S, F>(
    scene: &mut S,
    replay: Option<&ReplayScript>,
    duration: Duration,
    frontend: &mut F,
) -> RunSummary
where
    S: Scene + ?Sized,
    F: Renderer + SoundPlayer,
{
    let frame_dt = replay.map_or(FIXED_DT, |r| r.frame_duration());
    let mut game = GameLoop::new();
    let mut summary = RunSummary::default();
    let mut elapsed = Duration::ZERO;

    while elapsed < duration && !scene.is_finished() {
        let events = replay.map_or(&[][..], |r| r.events_at(summary.frames));
        summary.steps += u64::from(game.frame(scene, frame_dt, events, frontend));
        summary.frames += 1;
        elapsed += frame_dt;
    }
    summary.finished = scene.is_finished();
    log::info!(
        "Headless run: {} frame(s), {} tick(s), {:.2}s simulated{}",
        summary.frames,
        summary.steps,
        game.time.total_time.as_secs_f64(),
        if summary.finished { ", scene finished" } else { "" }
    );
    summary
}
