//! Component types attached to entities.
//!
//! Every component is optional on every entity; `Components` is a plain bag
//! of `Option` fields. Systems gate on presence (`if let Some(..)`) rather
//! than assuming a kind implies a component set.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;

use crate::animation::{AnimationClip, Playback};
use crate::render::Color;
use crate::state::{GoalState, PlayerState};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub pos: Vec2,
    pub prev_pos: Vec2,
    pub vel: Vec2,
    /// Degrees.
    pub angle: f32,
    /// Degrees per second.
    pub ang_vel: f32,
}

impl Transform {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            prev_pos: pos,
            ..Default::default()
        }
    }

    pub fn moving(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            prev_pos: pos,
            vel,
            ..Default::default()
        }
    }

    pub fn with_spin(mut self, ang_vel: f32) -> Self {
        self.ang_vel = ang_vel;
        self
    }

    /// Snapshot the previous position, then integrate one step.
    pub fn integrate(&mut self, dt: f32) {
        self.prev_pos = self.pos;
        self.pos += self.vel * dt;
        self.angle += self.ang_vel * dt;
    }

    /// Horizontal distance covered during the last integration.
    pub fn step_dx(&self) -> f32 {
        self.pos.x - self.prev_pos.x
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub size: Vec2,
    pub half_size: Vec2,
}

impl BoundingBox {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            half_size: size * 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionRadius(pub f32);

/// Directional intent. Frogger sets exactly one direction per press and
/// clears it once the hop is taken; GeoWars keeps all four as held flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Input {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Input {
    pub fn set(&mut self, dir: Direction, on: bool) {
        match dir {
            Direction::Up => self.up = on,
            Direction::Down => self.down = on,
            Direction::Left => self.left = on,
            Direction::Right => self.right = on,
        }
    }

    /// Replace whatever was pending with a single direction.
    pub fn set_exclusive(&mut self, dir: Direction) {
        *self = Self::default();
        self.set(dir, true);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }

    /// Raw (not normalized) axis vector, screen-space y down.
    pub fn axis(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        if self.up {
            v.y -= 1.0;
        }
        if self.down {
            v.y += 1.0;
        }
        v
    }
}

/// A playing animation. Attaching a new `Animation` always starts at frame 0.
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: String,
    pub clip: Arc<AnimationClip>,
    pub playback: Playback,
    /// When false the animation holds its current frame.
    pub playing: bool,
}

impl Animation {
    pub fn new(name: &str, clip: Arc<AnimationClip>) -> Self {
        Self {
            name: name.to_string(),
            clip,
            playback: Playback::default(),
            playing: true,
        }
    }

    pub fn paused(mut self) -> Self {
        self.playing = false;
        self
    }

    pub fn update(&mut self, dt: Duration) {
        if self.playing {
            self.playback.advance(dt.as_micros() as u64, &self.clip);
        }
    }

    pub fn current_frame(&self) -> usize {
        self.playback.frame
    }

    pub fn sprite_id(&self) -> &str {
        self.clip
            .frames
            .get(self.playback.frame)
            .map(|f| f.sprite_id.as_str())
            .unwrap_or("")
    }

    pub fn has_ended(&self) -> bool {
        self.playback.finished
    }
}

pub const MIN_VERTICES: u32 = 3;

/// Regular polygon drawn centred on the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub radius: f32,
    pub vertices: u32,
    pub fill: Color,
    pub outline: Color,
    pub outline_thickness: f32,
}

impl Shape {
    /// Vertex counts below three are raised to three.
    pub fn new(radius: f32, vertices: u32, fill: Color, outline: Color, outline_thickness: f32) -> Self {
        Self {
            radius,
            vertices: vertices.max(MIN_VERTICES),
            fill,
            outline,
            outline_thickness,
        }
    }
}

/// Axis-aligned filled rectangle drawn centred on the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectShape {
    pub size: Vec2,
    pub fill: Color,
}

/// Text drawn centred on the entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(pub String);

/// A whole texture placed by its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub texture: String,
    pub top_left: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifespan {
    pub total: Duration,
    pub remaining: Duration,
}

impl Lifespan {
    pub fn new(total: Duration) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    /// Count down by `dt`. Returns true once the lifespan is used up.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Fade factor in `[0, 1]` for rendering.
    pub fn alpha(&self) -> f32 {
        if self.total.is_zero() {
            return 0.0;
        }
        (self.remaining.as_secs_f32() / self.total.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Components {
    pub transform: Option<Transform>,
    pub bounding_box: Option<BoundingBox>,
    pub collision_radius: Option<CollisionRadius>,
    pub input: Option<Input>,
    pub animation: Option<Animation>,
    pub shape: Option<Shape>,
    pub rect: Option<RectShape>,
    pub label: Option<Label>,
    pub sprite: Option<Sprite>,
    pub player_state: Option<PlayerState>,
    pub goal_state: Option<GoalState>,
    pub score: Option<Score>,
    pub lifespan: Option<Lifespan>,
}
