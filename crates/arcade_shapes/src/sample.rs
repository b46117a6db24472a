//! Named circles and rectangles drifting around the window, bouncing off
//! its edges, each labelled with its name.

use std::time::Duration;

use glam::Vec2;

use arcade_core::collision::bounce_box_in_bounds;
use arcade_core::components::{Label, RectShape, Shape, Transform};
use arcade_core::driver::Scene;
use arcade_core::entity::EntityStore;
use arcade_core::input::{Action, ActionEvent, ActionKind, ActionState};
use arcade_core::render::{Color, DrawCommand, Rect, Renderer};
use arcade_core::time::TimeState;

use crate::config::{FontConfig, ShapesConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Circle,
    Rect,
}

/// Polygon resolution used to draw a circle.
const CIRCLE_POINTS: u32 = 30;
const BACKGROUND: Color = Color::rgb(100, 100, 255);
const STATS_INTERVAL: Duration = Duration::from_secs(1);
const STATS_TEXT_SIZE: u32 = 20;

pub struct ShapesSample {
    store: EntityStore<Kind>,
    bounds: Rect,
    font: FontConfig,
    paused: bool,
    finished: bool,
    stats: String,
    stats_elapsed: Duration,
    stats_frames: u32,
}

impl ShapesSample {
    pub fn new(config: &ShapesConfig) -> Self {
        let mut store = EntityStore::new();
        for circle in &config.circles {
            let id = store.create(Kind::Circle);
            if let Some(c) = store.components_mut(id) {
                c.transform = Some(Transform::moving(circle.pos, circle.vel));
                c.shape = Some(Shape::new(circle.radius, CIRCLE_POINTS, circle.color, circle.color, 0.0));
                c.label = Some(Label(circle.name.clone()));
            }
        }
        for rect in &config.rects {
            let id = store.create(Kind::Rect);
            if let Some(c) = store.components_mut(id) {
                c.transform = Some(Transform::moving(rect.pos, rect.vel));
                c.rect = Some(RectShape {
                    size: rect.size,
                    fill: rect.color,
                });
                c.label = Some(Label(rect.name.clone()));
            }
        }
        log::info!(
            "Shapes sample: {} circle(s), {} rect(s)",
            config.circles.len(),
            config.rects.len()
        );

        Self {
            store,
            bounds: Rect::new(0.0, 0.0, config.window.width, config.window.height),
            font: config.font.clone(),
            paused: false,
            finished: false,
            stats: "FPS: 0".to_string(),
            stats_elapsed: Duration::ZERO,
            stats_frames: 0,
        }
    }

    pub fn store(&self) -> &EntityStore<Kind> {
        &self.store
    }
}

impl Scene for ShapesSample {
    fn on_action(&mut self, event: &ActionEvent) {
        if event.kind != ActionKind::Start {
            return;
        }
        match event.action {
            Action::Pause => self.paused = !self.paused,
            Action::Quit | Action::Back => self.finished = true,
            _ => {}
        }
    }

    fn update(&mut self, dt: Duration, _actions: &ActionState) {
        if self.paused {
            return;
        }
        let bounds = self.bounds;
        let secs = dt.as_secs_f32();
        self.store.for_each_alive_mut(|e| {
            let c = &mut e.components;
            let half = match (c.shape, c.rect) {
                (Some(shape), _) => Vec2::splat(shape.radius),
                (None, Some(rect)) => rect.size * 0.5,
                (None, None) => return,
            };
            if let Some(t) = c.transform.as_mut() {
                t.integrate(secs);
                bounce_box_in_bounds(t, half, bounds);
            }
        });
    }

    fn render(&self, renderer: &mut dyn Renderer) {
        renderer.draw(DrawCommand::Clear(BACKGROUND));
        for e in self.store.alive(None) {
            let c = &e.components;
            let Some(t) = c.transform else {
                continue;
            };
            if let Some(shape) = c.shape {
                renderer.draw(DrawCommand::Shape {
                    shape,
                    center: t.pos,
                    angle: t.angle,
                    alpha: 1.0,
                });
            }
            if let Some(rect) = c.rect {
                renderer.draw(DrawCommand::Rectangle {
                    center: t.pos,
                    size: rect.size,
                    color: rect.fill,
                });
            }
            if let Some(label) = &c.label {
                renderer.draw(DrawCommand::Text {
                    text: label.0.clone(),
                    pos: t.pos,
                    size: self.font.size,
                    color: self.font.color,
                    centered: true,
                });
            }
        }
        renderer.draw(DrawCommand::Text {
            text: self.stats.clone(),
            pos: Vec2::new(15.0, 15.0),
            size: STATS_TEXT_SIZE,
            color: Color::WHITE,
            centered: false,
        });
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    /// Frames counted over each whole second of real time.
    fn frame_stats(&mut self, time: &TimeState) {
        self.stats_elapsed += time.real_dt;
        self.stats_frames += 1;
        if self.stats_elapsed >= STATS_INTERVAL {
            self.stats = format!("FPS: {}", self.stats_frames);
            log::debug!("{}", self.stats);
            self.stats_elapsed -= STATS_INTERVAL;
            self.stats_frames = 0;
        }
    }
}
