//! The Frogger scene: session state plus the per-tick systems.
//!
//! Tick order (skipped entirely while paused):
//!
//!   1. level-end check (out of lives, or every goal claimed)
//!   2. countdown timer; running out kills the frog
//!   3. player state (a finished death animation resets the frog)
//!   4. animation
//!   5. movement (frog hop, then traffic integration)
//!   6. collisions (clamp, wrap, then the first matching rule)
//!   7. progress score
//!   8. sweep destroyed entities

use std::time::Duration;

use glam::Vec2;

use arcade_core::animation::AnimationLibrary;
use arcade_core::collision::{clamp_in_bounds, wrap_horizontal, Aabb};
use arcade_core::components::{Animation, BoundingBox, Direction, Input, Sprite, Transform};
use arcade_core::driver::Scene;
use arcade_core::entity::{EntityId, EntityStore};
use arcade_core::input::{Action, ActionEvent, ActionKind, ActionState};
use arcade_core::render::{Color, DrawCommand, Rect, Renderer, SoundCue};
use arcade_core::state::{GoalOutcome, PlayerEvent, PlayerState};

use crate::assets::{clip, SOUND_DEATH, SOUND_HOP, TURTLE_SUBMERGED_FRAME};
use crate::lanes::{spawn_goals, spawn_lanes, spawn_lives};
use crate::level::LevelFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Player,
    Car,
    Turtles,
    Tree,
    Goal,
    Lives,
    Bkg,
}

const HOP: f32 = 40.0;
const PLAYER_SIZE: f32 = 15.0;
/// Half extent used to keep the frog on screen. Larger than its box.
const PLAYER_CLAMP_HALF: f32 = 20.0;
const WRAP_MARGIN: f32 = 20.0;
/// Rows below this line (larger y) are road; above it is the river.
const SAFE_LINE_RISE: f32 = 280.0;
/// The grass strip between road and river earns no progress points.
const MEDIAN_RISE: f32 = 260.0;
const PROGRESS_POINTS: i32 = 10;
const GOAL_POINTS_PER_SECOND: i32 = 10;

const HUD_TEXT_SIZE: u32 = 15;
const AABB_COLOR: Color = Color::GREEN;

pub struct FroggerScene {
    store: EntityStore<Kind>,
    library: AnimationLibrary,
    player: EntityId,
    view: Vec2,
    spawn: Vec2,
    timer: Duration,
    timer_total: Duration,
    max_height: f32,
    score: i32,
    lives: i32,
    goals_reached: u32,
    goals_to_win: u32,
    paused: bool,
    draw_aabb: bool,
    finished: bool,
    sounds: Vec<SoundCue>,
}

impl FroggerScene {
    pub fn new(level: &LevelFile, library: AnimationLibrary) -> Result<Self, String> {
        let lives = i32::try_from(level.lives).map_err(|_| format!("Lives {} out of range", level.lives))?;
        let view = Vec2::new(level.view.width, level.view.height);
        let mut store = EntityStore::new();

        for bkg in &level.backgrounds {
            let id = store.create(Kind::Bkg);
            if let Some(c) = store.components_mut(id) {
                c.sprite = Some(Sprite {
                    texture: bkg.texture.clone(),
                    top_left: Vec2::new(bkg.x, bkg.y),
                });
            }
        }
        spawn_lanes(&mut store, &library, view)?;
        spawn_goals(&mut store, &library, view)?;
        spawn_lives(&mut store, &library, view, level.lives)?;

        // Middle of the bottom row.
        let spawn = Vec2::new(view.x / 2.0, view.y - HOP / 2.0);
        let player = store.create(Kind::Player);
        let up = clip(&library, "up")?;
        if let Some(c) = store.components_mut(player) {
            c.transform = Some(Transform::at(spawn));
            c.bounding_box = Some(BoundingBox::new(Vec2::splat(PLAYER_SIZE)));
            c.input = Some(Input::default());
            c.animation = Some(Animation::new("up", up));
            c.player_state = Some(PlayerState::Alive);
        }

        let timer_total = Duration::from_secs(level.timer_seconds);
        log::info!(
            "Frogger level '{}' ready: {} entities, {} lives, {}s timer",
            level.level_id,
            store.len(),
            level.lives,
            level.timer_seconds
        );

        Ok(Self {
            store,
            library,
            player,
            view,
            spawn,
            timer: timer_total,
            timer_total,
            max_height: spawn.y,
            score: 0,
            lives,
            goals_reached: 0,
            goals_to_win: level.goals_to_win,
            paused: false,
            draw_aabb: false,
            finished: false,
            sounds: Vec::new(),
        })
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn goals_reached(&self) -> u32 {
        self.goals_reached
    }

    pub fn timer(&self) -> Duration {
        self.timer
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn store(&self) -> &EntityStore<Kind> {
        &self.store
    }

    pub fn player_pos(&self) -> Vec2 {
        self.store.transform(self.player).map_or(self.spawn, |t| t.pos)
    }

    pub fn player_state(&self) -> PlayerState {
        self.store
            .components(self.player)
            .and_then(|c| c.player_state)
            .unwrap_or_default()
    }

    fn view_rect(&self) -> Rect {
        Rect::from_size(self.view)
    }

    fn set_animation(&mut self, id: EntityId, name: &str) {
        match clip(&self.library, name) {
            Ok(anim) => {
                if let Some(c) = self.store.components_mut(id) {
                    c.animation = Some(Animation::new(name, anim));
                }
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    /// Whole seconds left, rounded up.
    fn timer_seconds_ceil(&self) -> i32 {
        i32::try_from(self.timer.as_micros().div_ceil(1_000_000)).unwrap_or(i32::MAX)
    }

    fn set_player_direction(&mut self, dir: Direction) {
        if let Some(input) = self.store.components_mut(self.player).and_then(|c| c.input.as_mut()) {
            input.set_exclusive(dir);
        }
    }

    fn clear_player_direction(&mut self) {
        if let Some(input) = self.store.components_mut(self.player).and_then(|c| c.input.as_mut()) {
            input.clear();
        }
    }

    fn check_player_state(&mut self) {
        let Some(c) = self.store.components(self.player) else {
            return;
        };
        let state = c.player_state.unwrap_or_default();
        let ended = c.animation.as_ref().is_some_and(|a| a.has_ended());
        if state.is_dead() && ended {
            log::debug!("Death animation finished, respawning");
            self.reset_player(state.on(PlayerEvent::DeathAnimationFinished));
        }
    }

    fn animate(&mut self, dt: Duration) {
        self.store.for_each_alive_mut(|e| {
            if let Some(anim) = e.components.animation.as_mut() {
                anim.update(dt);
            }
        });
    }

    fn movement(&mut self, dt: Duration) {
        self.player_movement();

        let dt = dt.as_secs_f32();
        self.store.for_each_alive_mut(|e| {
            // Input-driven entities move by hops, not velocity.
            if e.components.input.is_some() {
                return;
            }
            if let Some(t) = e.components.transform.as_mut() {
                t.integrate(dt);
            }
        });
    }

    fn player_movement(&mut self) {
        if self.player_state().is_dead() {
            return;
        }
        let Some(c) = self.store.components_mut(self.player) else {
            return;
        };
        let Some(input) = c.input else {
            return;
        };
        if input.is_empty() {
            return;
        }

        let mut anim = None;
        let mut pos = c.transform.map_or(self.spawn, |t| t.pos);
        for (on, name, step) in [
            (input.up, "up", Vec2::new(0.0, -HOP)),
            (input.down, "down", Vec2::new(0.0, HOP)),
            (input.left, "left", Vec2::new(-HOP, 0.0)),
            (input.right, "right", Vec2::new(HOP, 0.0)),
        ] {
            if on {
                pos += step;
                anim = Some(name);
            }
        }
        if let Some(t) = c.transform.as_mut() {
            t.pos = pos;
        }
        if let Some(i) = c.input.as_mut() {
            i.clear();
        }
        if let Some(name) = anim {
            self.set_animation(self.player, name);
        }
        self.sounds.push(SoundCue::at(SOUND_HOP, pos));
    }

    /// First live entity of `kind` whose box overlaps `player_box`.
    fn first_hit(&self, kind: Kind, player_box: &Aabb) -> Option<EntityId> {
        self.store
            .alive(Some(kind))
            .find(|e| {
                let c = &e.components;
                match (c.transform, c.bounding_box) {
                    (Some(t), Some(b)) => player_box.intersects(&Aabb::new(t.pos, b.half_size)),
                    _ => false,
                }
            })
            .map(|e| e.id())
    }

    fn ride(&mut self, platform: EntityId) {
        let dx = self.store.transform(platform).map_or(0.0, |t| t.step_dx());
        if let Some(t) = self.store.transform_mut(self.player) {
            t.pos.x += dx;
        }
    }

    fn collisions(&mut self) {
        let bounds = self.view_rect();
        let half = Vec2::splat(PLAYER_CLAMP_HALF);
        if let Some(t) = self.store.transform_mut(self.player) {
            t.pos = clamp_in_bounds(t.pos, half, bounds);
        }

        let view_w = self.view.x;
        self.store.for_each_alive_mut(|e| {
            let c = &mut e.components;
            if let (Some(t), Some(b)) = (c.transform.as_mut(), c.bounding_box) {
                wrap_horizontal(t, b.half_size.x, view_w, WRAP_MARGIN);
            }
        });

        if self.player_state().is_dead() {
            return;
        }
        let Some(c) = self.store.components(self.player) else {
            return;
        };
        let (Some(t), Some(b)) = (c.transform, c.bounding_box) else {
            return;
        };
        let player_box = Aabb::new(t.pos, b.half_size);

        if t.pos.y > self.view.y - SAFE_LINE_RISE {
            if self.first_hit(Kind::Car, &player_box).is_some() {
                self.kill_player("hit by traffic");
            }
            return;
        }

        if let Some(turtles) = self.first_hit(Kind::Turtles, &player_box) {
            let submerged = self
                .store
                .components(turtles)
                .and_then(|c| c.animation.as_ref())
                .is_some_and(|a| a.current_frame() == TURTLE_SUBMERGED_FRAME);
            if submerged {
                self.kill_player("turtles dived");
            } else {
                self.ride(turtles);
            }
            return;
        }

        if let Some(tree) = self.first_hit(Kind::Tree, &player_box) {
            self.ride(tree);
            return;
        }

        if let Some(goal) = self.first_hit(Kind::Goal, &player_box) {
            self.reach_goal(goal);
            return;
        }

        self.kill_player("fell in the water");
    }

    fn reach_goal(&mut self, goal: EntityId) {
        let state = self
            .store
            .components(goal)
            .and_then(|c| c.goal_state)
            .unwrap_or_default();
        let (next, outcome) = state.touch();
        match outcome {
            GoalOutcome::Occupied => self.kill_player("goal already taken"),
            GoalOutcome::Claimed => {
                if let Some(c) = self.store.components_mut(goal) {
                    c.goal_state = Some(next);
                }
                self.set_animation(goal, "frogIcon");
                let points = self.timer_seconds_ceil().saturating_mul(GOAL_POINTS_PER_SECOND);
                self.score += points;
                self.goals_reached += 1;
                log::info!(
                    "Goal reached ({}/{}), +{} points, score {}",
                    self.goals_reached,
                    self.goals_to_win,
                    points,
                    self.score
                );
                self.reset_player(PlayerState::Alive);
            }
        }
    }

    /// Lose a life. Does nothing if the frog is already dead.
    fn kill_player(&mut self, cause: &str) {
        let state = self.player_state();
        if state.is_dead() {
            return;
        }
        if let Some(&icon) = self.store.alive_ids(Some(Kind::Lives)).last() {
            self.store.destroy(icon);
        }
        self.lives -= 1;
        self.set_animation(self.player, "die");
        if let Some(c) = self.store.components_mut(self.player) {
            c.player_state = Some(state.on(PlayerEvent::Killed));
            if let Some(input) = c.input.as_mut() {
                input.clear();
            }
        }
        self.sounds.push(SoundCue::new(SOUND_DEATH));
        log::info!("Frog died ({}), {} lives left", cause, self.lives);
    }

    fn reset_player(&mut self, state: PlayerState) {
        self.set_animation(self.player, "up");
        if let Some(c) = self.store.components_mut(self.player) {
            c.transform = Some(Transform::at(self.spawn));
            c.player_state = Some(state);
            if let Some(input) = c.input.as_mut() {
                input.clear();
            }
        }
        self.timer = self.timer_total;
        self.max_height = self.spawn.y;
    }

    /// Award points for each row higher than the best so far this life.
    fn update_score(&mut self) {
        if self.player_state().is_dead() {
            return;
        }
        let y = self.player_pos().y;
        if y < self.max_height {
            self.max_height = y;
            if (y - (self.view.y - MEDIAN_RISE)).abs() > 0.001 {
                self.score += PROGRESS_POINTS;
            }
        }
    }
}

impl Scene for FroggerScene {
    fn on_action(&mut self, event: &ActionEvent) {
        let direction = match event.action {
            Action::Up => Some(Direction::Up),
            Action::Down => Some(Direction::Down),
            Action::Left => Some(Direction::Left),
            Action::Right => Some(Direction::Right),
            _ => None,
        };

        match event.kind {
            ActionKind::Start => match event.action {
                Action::Pause => {
                    self.paused = !self.paused;
                    log::info!("Frogger {}", if self.paused { "paused" } else { "resumed" });
                }
                Action::Quit | Action::Back => {
                    log::info!("Frogger level left by {:?}", event.action);
                    self.finished = true;
                }
                Action::ToggleCollision => self.draw_aabb = !self.draw_aabb,
                _ => {
                    if let Some(dir) = direction {
                        self.set_player_direction(dir);
                    }
                }
            },
            // One direction at a time; any release cancels the pending hop.
            ActionKind::End => {
                if direction.is_some() {
                    self.clear_player_direction();
                }
            }
        }
    }

    fn update(&mut self, dt: Duration, _actions: &ActionState) {
        if self.finished {
            return;
        }
        if self.lives <= 0 || self.goals_reached >= self.goals_to_win {
            self.finished = true;
            log::info!(
                "Frogger over: score {}, {} goal(s), {} lives left",
                self.score,
                self.goals_reached,
                self.lives.max(0)
            );
            return;
        }
        if self.paused {
            return;
        }

        self.timer = self.timer.saturating_sub(dt);
        if self.timer.is_zero() {
            self.kill_player("out of time");
        }

        self.check_player_state();
        self.animate(dt);
        self.movement(dt);
        self.collisions();
        self.update_score();
        self.store.sweep();
    }

    fn render(&self, renderer: &mut dyn Renderer) {
        renderer.draw(DrawCommand::Clear(Color::BLACK));

        for e in self.store.alive(Some(Kind::Bkg)) {
            if let Some(sprite) = &e.components.sprite {
                renderer.draw(DrawCommand::Sprite {
                    texture: sprite.texture.clone(),
                    top_left: sprite.top_left,
                });
            }
        }

        for e in self.store.alive(None) {
            let c = &e.components;
            let (Some(anim), Some(t)) = (&c.animation, c.transform) else {
                continue;
            };
            renderer.draw(DrawCommand::AnimationFrame {
                sprite_id: anim.sprite_id().to_string(),
                center: t.pos,
                angle: t.angle,
            });
            if self.draw_aabb {
                if let Some(b) = c.bounding_box {
                    renderer.draw(DrawCommand::DebugBox {
                        center: t.pos,
                        half: b.half_size,
                        color: AABB_COLOR,
                    });
                }
            }
        }

        renderer.draw(DrawCommand::Text {
            text: format!("score  {}", self.score),
            pos: Vec2::new(5.0, -5.0),
            size: HUD_TEXT_SIZE,
            color: Color::WHITE,
            centered: false,
        });
        renderer.draw(DrawCommand::Text {
            text: format!("time  {}", self.timer_seconds_ceil()),
            pos: Vec2::new(5.0, 22.5),
            size: HUD_TEXT_SIZE,
            color: Color::WHITE,
            centered: false,
        });
    }

    fn take_sounds(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.sounds)
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
