//! The narrow surface scenes draw and play sounds through.
//!
//! Scenes emit `DrawCommand`s in painter's order and queue `SoundCue`s while
//! simulating. A frontend decides what drawing or playing actually means; the
//! only frontend in this workspace is `HeadlessFrontend`, which counts and
//! logs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::Shape;

/// Axis-aligned rectangle in view space, y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_size(size: Vec2) -> Self {
        Self::new(0.0, 0.0, size.x, size.y)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

const fn opaque() -> u8 {
    255
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same colour with alpha scaled by `factor` in `[0, 1]`.
    pub fn faded(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    /// Whole texture placed by its top-left corner.
    Sprite { texture: String, top_left: Vec2 },
    /// Current frame of an animation, centred.
    AnimationFrame {
        sprite_id: String,
        center: Vec2,
        angle: f32,
    },
    /// Regular polygon. `alpha` multiplies both fill and outline.
    Shape {
        shape: Shape,
        center: Vec2,
        angle: f32,
        alpha: f32,
    },
    Rectangle { center: Vec2, size: Vec2, color: Color },
    Text {
        text: String,
        pos: Vec2,
        size: u32,
        color: Color,
        centered: bool,
    },
    DebugBox { center: Vec2, half: Vec2, color: Color },
    DebugCircle { center: Vec2, radius: f32, color: Color },
}

pub trait Renderer {
    fn view_bounds(&self) -> Rect;
    fn draw(&mut self, cmd: DrawCommand);
    fn present(&mut self);
}

/// A named sound, optionally positioned in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundCue {
    pub name: String,
    pub position: Option<Vec2>,
}

impl SoundCue {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            position: None,
        }
    }

    pub fn at(name: &str, position: Vec2) -> Self {
        Self {
            name: name.to_string(),
            position: Some(position),
        }
    }
}

pub trait SoundPlayer {
    fn play(&mut self, cue: &SoundCue);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub clears: u32,
    pub sprites: u32,
    pub animation_frames: u32,
    pub shapes: u32,
    pub texts: u32,
    pub debug: u32,
}

impl DrawStats {
    pub fn total(&self) -> u32 {
        self.clears + self.sprites + self.animation_frames + self.shapes + self.texts + self.debug
    }
}

/// Frontend with no window and no audio device.
///
/// Keeps the stats and text lines of the frame being built, plus a copy of
/// the last presented frame so callers can inspect it.
pub struct HeadlessFrontend {
    bounds: Rect,
    current: DrawStats,
    current_texts: Vec<String>,
    pub last_frame: DrawStats,
    pub last_texts: Vec<String>,
    pub frames_presented: u64,
    pub sounds_played: Vec<String>,
}

impl HeadlessFrontend {
    pub fn new(view_size: Vec2) -> Self {
        Self {
            bounds: Rect::from_size(view_size),
            current: DrawStats::default(),
            current_texts: Vec::new(),
            last_frame: DrawStats::default(),
            last_texts: Vec::new(),
            frames_presented: 0,
            sounds_played: Vec::new(),
        }
    }

    pub fn sound_count(&self, name: &str) -> usize {
        self.sounds_played.iter().filter(|s| s.as_str() == name).count()
    }
}

impl Renderer for HeadlessFrontend {
    fn view_bounds(&self) -> Rect {
        self.bounds
    }

    fn draw(&mut self, cmd: DrawCommand) {
        log::trace!("draw {:?}", cmd);
        match cmd {
            DrawCommand::Clear(_) => self.current.clears += 1,
            DrawCommand::Sprite { .. } => self.current.sprites += 1,
            DrawCommand::AnimationFrame { .. } => self.current.animation_frames += 1,
            DrawCommand::Shape { .. } | DrawCommand::Rectangle { .. } => self.current.shapes += 1,
            DrawCommand::Text { text, .. } => {
                self.current.texts += 1;
                self.current_texts.push(text);
            }
            DrawCommand::DebugBox { .. } | DrawCommand::DebugCircle { .. } => {
                self.current.debug += 1
            }
        }
    }

    fn present(&mut self) {
        self.frames_presented += 1;
        self.last_frame = std::mem::take(&mut self.current);
        self.last_texts = std::mem::take(&mut self.current_texts);
        log::trace!(
            "present frame {} ({} draw(s))",
            self.frames_presented,
            self.last_frame.total()
        );
    }
}

impl SoundPlayer for HeadlessFrontend {
    fn play(&mut self, cue: &SoundCue) {
        match cue.position {
            Some(p) => log::debug!("sound '{}' at ({:.1}, {:.1})", cue.name, p.x, p.y),
            None => log::debug!("sound '{}'", cue.name),
        }
        self.sounds_played.push(cue.name.clone());
    }
}
