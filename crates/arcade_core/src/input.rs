//! Logical input actions and their held / edge state.
//!
//! Scenes never see devices. A frontend (or a replay script) produces
//! `ActionEvent`s keyed by logical `Action`, and `ActionState` folds them
//! into two kinds of query:
//!
//! - **Level-triggered (held):** `is_held(action)` is true every frame between
//!   a `Start` and its `End`. GeoWars movement reads this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only for the frame
//!   the transition happened, cleared by `end_frame()`. The driver calls
//!   `end_frame()` only after at least one simulation step has run, so a press
//!   arriving on a zero-step frame is not lost.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Pause,
    Quit,
    Back,
    ToggleCollision,
    Fire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Start,
    End,
}

/// One logical input transition. `target` carries a world-space point for
/// pointer actions such as `Fire`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub action: Action,
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec2>,
}

impl ActionEvent {
    pub fn start(action: Action) -> Self {
        Self {
            action,
            kind: ActionKind::Start,
            target: None,
        }
    }

    pub fn end(action: Action) -> Self {
        Self {
            action,
            kind: ActionKind::End,
            target: None,
        }
    }

    pub fn at(mut self, target: Vec2) -> Self {
        self.target = Some(target);
        self
    }
}

pub struct ActionState {
    held: HashSet<Action>,
    just_pressed: HashSet<Action>,
    just_released: HashSet<Action>,

    /// Last target point seen on any event.
    pub target: Option<Vec2>,
}

impl ActionState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            target: None,
        }
    }

    pub fn apply(&mut self, event: &ActionEvent) {
        if event.target.is_some() {
            self.target = event.target;
        }
        match event.kind {
            ActionKind::Start => self.press(event.action),
            ActionKind::End => self.release(event.action),
        }
    }

    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        if self.held.remove(&action) {
            self.just_released.insert(action);
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn is_just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    pub fn is_just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for ActionState {
    fn default() -> Self {
        Self::new()
    }
}
