//! The GeoWars scene.
//!
//! Tick order (skipped while paused):
//!
//!   1. enemy spawner
//!   2. lifespan countdown
//!   3. movement, then boundaries (player clamped, everything else bounces)
//!   4. collisions
//!   5. player respawn, then sweep

use std::time::Duration;

use glam::Vec2;

use arcade_core::collision::{bounce_in_bounds, clamp_in_bounds, Circle};
use arcade_core::components::{CollisionRadius, Direction, Input, Lifespan, Score, Shape, Transform};
use arcade_core::driver::Scene;
use arcade_core::entity::{EntityId, EntityStore};
use arcade_core::input::{Action, ActionEvent, ActionKind, ActionState};
use arcade_core::math::{normalize, unit_from_bearing};
use arcade_core::render::{Color, DrawCommand, Rect, Renderer};
use arcade_core::time::TimeState;

use crate::config::GameConfig;
use crate::spawner::{EnemyRoll, EnemySpawner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Player,
    LargeEnemy,
    SmallEnemy,
    Bullet,
}

const DEATH_PENALTY: i32 = 500;
const FRAGMENT_SCORE_FACTOR: i32 = 10;

const BACKGROUND: Color = Color::rgb(100, 100, 255);
const BACKGROUND_PAUSED: Color = Color::rgb(200, 200, 255);
const COLLISION_COLOR: Color = Color::GREEN;
const STATS_TEXT_SIZE: u32 = 15;

pub struct GeoWarsGame {
    config: GameConfig,
    store: EntityStore<Kind>,
    spawner: EnemySpawner,
    player: EntityId,
    bounds: Rect,
    score: i32,
    paused: bool,
    draw_collision: bool,
    finished: bool,
    stats: String,
}

impl GeoWarsGame {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let bounds = Rect::new(0.0, 0.0, config.window.width, config.window.height);
        let spawner = EnemySpawner::new(seed, config.enemy.spawn_interval);
        let mut store = EntityStore::new();
        let player = spawn_player(&mut store, &config, bounds.center(), Input::default());
        log::info!(
            "GeoWars ready: {}x{} window, seed {}",
            bounds.width,
            bounds.height,
            seed
        );
        Self {
            config,
            store,
            spawner,
            player,
            bounds,
            score: 0,
            paused: false,
            draw_collision: false,
            finished: false,
            stats: String::new(),
        }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn store(&self) -> &EntityStore<Kind> {
        &self.store
    }

    fn set_player_direction(&mut self, dir: Direction, on: bool) {
        if let Some(input) = self
            .store
            .components_mut(self.player)
            .and_then(|c| c.input.as_mut())
        {
            input.set(dir, on);
        }
    }

    /// A bullet leaves the player toward `target`.
    pub fn fire_at(&mut self, target: Vec2) -> Option<EntityId> {
        if !self.store.is_alive(self.player) {
            return None;
        }
        let from = self.store.transform(self.player)?.pos;
        let b = &self.config.bullet;
        let id = self.store.create(Kind::Bullet);
        if let Some(c) = self.store.components_mut(id) {
            c.transform = Some(Transform::moving(from, normalize(target - from) * b.speed));
            c.shape = Some(Shape::new(b.shape_radius, b.vertices, b.fill, b.outline, b.outline_thickness));
            c.collision_radius = Some(CollisionRadius(b.collision_radius));
            c.lifespan = Some(Lifespan::new(b.lifespan()));
        }
        Some(id)
    }

    fn spawn_enemy(&mut self, roll: EnemyRoll) -> EntityId {
        let e = &self.config.enemy;
        let id = self.store.create(Kind::LargeEnemy);
        if let Some(c) = self.store.components_mut(id) {
            c.transform = Some(Transform::moving(roll.pos, roll.vel));
            c.shape = Some(Shape::new(e.shape_radius, roll.vertices, roll.fill, e.outline, e.outline_thickness));
            c.collision_radius = Some(CollisionRadius(e.collision_radius));
            c.score = Some(Score(roll.vertices as i32));
        }
        log::debug!(
            "enemy {:?}: {} vertices at ({:.0}, {:.0})",
            id,
            roll.vertices,
            roll.pos.x,
            roll.pos.y
        );
        id
    }

    /// Break a large enemy into one fragment per vertex, spread evenly
    /// around the parent's position.
    fn split_enemy(&mut self, parent: EntityId) {
        let Some(c) = self.store.components(parent) else {
            return;
        };
        let (Some(t), Some(shape), Some(radius)) = (c.transform, c.shape, c.collision_radius) else {
            return;
        };
        let points = c.score.map_or(0, |s| s.0) * FRAGMENT_SCORE_FACTOR;
        let speed = self.config.enemy.speed_max;
        let lifespan = self.config.enemy.fragment_lifespan();
        let step = 360.0 / shape.vertices as f32;

        for i in 0..shape.vertices {
            let id = self.store.create(Kind::SmallEnemy);
            if let Some(c) = self.store.components_mut(id) {
                c.transform = Some(Transform::moving(t.pos, unit_from_bearing(i as f32 * step) * speed));
                c.shape = Some(Shape {
                    radius: shape.radius / 2.0,
                    ..shape
                });
                c.collision_radius = Some(CollisionRadius(radius.0 / 2.0));
                c.score = Some(Score(points));
                c.lifespan = Some(Lifespan::new(lifespan));
            }
        }
    }

    fn spawn(&mut self, dt: Duration) {
        if self.spawner.tick(dt) {
            let roll = self.spawner.roll(&self.config.enemy, self.bounds);
            self.spawn_enemy(roll);
        }
    }

    fn lifespan(&mut self, dt: Duration) {
        let mut expired = Vec::new();
        self.store.for_each_alive_mut(|e| {
            if let Some(life) = e.components.lifespan.as_mut() {
                if life.tick(dt) {
                    expired.push(e.id());
                }
            }
        });
        for id in expired {
            self.store.destroy(id);
        }
    }

    fn movement(&mut self, dt: Duration) {
        let speed = self.config.player.speed;
        let player_half = Vec2::splat(self.config.player.collision_radius);
        let bounds = self.bounds;
        let secs = dt.as_secs_f32();

        self.store.for_each_alive_mut(|e| {
            let is_player = e.kind() == Kind::Player;
            let c = &mut e.components;
            let Some(t) = c.transform.as_mut() else {
                return;
            };
            if is_player {
                if let Some(input) = c.input {
                    t.vel = normalize(input.axis()) * speed;
                }
            }
            t.integrate(secs);
            if is_player {
                t.pos = clamp_in_bounds(t.pos, player_half, bounds);
            } else if let Some(r) = c.collision_radius {
                bounce_in_bounds(t, r.0, bounds);
            }
        });
    }

    fn circle_of(&self, id: EntityId) -> Option<Circle> {
        let c = self.store.components(id)?;
        Some(Circle::new(c.transform?.pos, c.collision_radius?.0))
    }

    fn first_hit(&self, circle: &Circle, kind: Kind) -> Option<EntityId> {
        self.store
            .alive(Some(kind))
            .map(|e| e.id())
            .find(|&id| self.circle_of(id).is_some_and(|other| circle.intersects(&other)))
    }

    fn points_of(&self, id: EntityId) -> i32 {
        self.store
            .components(id)
            .and_then(|c| c.score)
            .map_or(0, |s| s.0)
    }

    fn collisions(&mut self) {
        if self.store.is_alive(self.player) {
            if let Some(body) = self.circle_of(self.player) {
                if let Some(enemy) = self.first_hit(&body, Kind::LargeEnemy) {
                    self.store.destroy(enemy);
                    self.store.destroy(self.player);
                    self.score -= DEATH_PENALTY;
                    log::info!("Player destroyed, score {}", self.score);
                }
            }
        }

        for bullet in self.store.alive_ids(Some(Kind::Bullet)) {
            let Some(body) = self.circle_of(bullet) else {
                continue;
            };
            if let Some(enemy) = self.first_hit(&body, Kind::LargeEnemy) {
                self.store.destroy(bullet);
                self.store.destroy(enemy);
                self.score += self.points_of(enemy);
                self.split_enemy(enemy);
            }
        }

        for bullet in self.store.alive_ids(Some(Kind::Bullet)) {
            if !self.store.is_alive(bullet) {
                continue;
            }
            let Some(body) = self.circle_of(bullet) else {
                continue;
            };
            if let Some(enemy) = self.first_hit(&body, Kind::SmallEnemy) {
                self.store.destroy(bullet);
                self.store.destroy(enemy);
                self.score += self.points_of(enemy);
            }
        }
    }

    /// A destroyed player comes back in the middle of the view, keeping
    /// whatever directions are still held.
    fn respawn_player(&mut self) {
        if self.store.is_alive(self.player) {
            return;
        }
        let held = self
            .store
            .components(self.player)
            .and_then(|c| c.input)
            .unwrap_or_default();
        self.player = spawn_player(&mut self.store, &self.config, self.bounds.center(), held);
        log::info!("Player respawned");
    }
}

fn spawn_player(store: &mut EntityStore<Kind>, config: &GameConfig, pos: Vec2, input: Input) -> EntityId {
    let p = &config.player;
    let id = store.create(Kind::Player);
    if let Some(c) = store.components_mut(id) {
        c.transform = Some(Transform::at(pos).with_spin(p.angular_speed));
        c.shape = Some(Shape::new(p.shape_radius, p.vertices, p.fill, p.outline, p.outline_thickness));
        c.collision_radius = Some(CollisionRadius(p.collision_radius));
        c.input = Some(input);
    }
    id
}

impl Scene for GeoWarsGame {
    fn on_action(&mut self, event: &ActionEvent) {
        let direction = match event.action {
            Action::Up => Some(Direction::Up),
            Action::Down => Some(Direction::Down),
            Action::Left => Some(Direction::Left),
            Action::Right => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = direction {
            self.set_player_direction(dir, event.kind == ActionKind::Start);
            return;
        }
        if event.kind != ActionKind::Start {
            return;
        }

        match event.action {
            Action::Pause => {
                self.paused = !self.paused;
                log::info!("GeoWars {}", if self.paused { "paused" } else { "resumed" });
            }
            Action::Quit | Action::Back => {
                log::info!("GeoWars quit, final score {}", self.score);
                self.finished = true;
            }
            Action::ToggleCollision => self.draw_collision = !self.draw_collision,
            Action::Fire if !self.paused => match event.target {
                Some(target) => {
                    self.fire_at(target);
                }
                None => log::debug!("Fire without a target ignored"),
            },
            _ => {}
        }
    }

    fn update(&mut self, dt: Duration, _actions: &ActionState) {
        if self.paused || self.finished {
            return;
        }
        self.spawn(dt);
        self.lifespan(dt);
        self.movement(dt);
        self.collisions();
        self.respawn_player();
        self.store.sweep();
    }

    fn render(&self, renderer: &mut dyn Renderer) {
        renderer.draw(DrawCommand::Clear(if self.paused {
            BACKGROUND_PAUSED
        } else {
            BACKGROUND
        }));

        for e in self.store.alive(None) {
            let c = &e.components;
            let (Some(shape), Some(t)) = (c.shape, c.transform) else {
                continue;
            };
            renderer.draw(DrawCommand::Shape {
                shape,
                center: t.pos,
                angle: t.angle,
                alpha: c.lifespan.map_or(1.0, |l| l.alpha()),
            });
        }

        if self.draw_collision {
            for e in self.store.alive(None) {
                if let (Some(r), Some(t)) = (e.components.collision_radius, e.components.transform) {
                    renderer.draw(DrawCommand::DebugCircle {
                        center: t.pos,
                        radius: r.0,
                        color: COLLISION_COLOR,
                    });
                }
            }
        }

        renderer.draw(DrawCommand::Text {
            text: format!("Score: {}", self.score),
            pos: Vec2::new(5.0, 30.0),
            size: self.config.font.size,
            color: Color::WHITE,
            centered: false,
        });
        if !self.stats.is_empty() {
            renderer.draw(DrawCommand::Text {
                text: self.stats.clone(),
                pos: Vec2::new(15.0, 15.0),
                size: STATS_TEXT_SIZE,
                color: Color::WHITE,
                centered: false,
            });
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn frame_stats(&mut self, time: &TimeState) {
        self.stats = format!(
            "FPS: {:.0}  frame {:.2} ms  ticks {}",
            time.smoothed_fps, time.smoothed_frame_time_ms, time.fixed_step_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::driver::{run_headless, GameLoop};
    use arcade_core::math::{bearing, length};
    use arcade_core::render::HeadlessFrontend;
    use arcade_core::time::FIXED_DT;

    const EPS: f32 = 0.001;

    /// A game whose spawner has used up its opening arrival and will not
    /// produce another for a very long time.
    fn quiet_game() -> GeoWarsGame {
        let mut config = GameConfig::default();
        config.enemy.spawn_interval = 1.0e6;
        let mut game = GeoWarsGame::new(config, 42);
        assert!(game.spawner.tick(FIXED_DT));
        game
    }

    fn roll(pos: Vec2, vertices: u32) -> EnemyRoll {
        EnemyRoll {
            pos,
            vel: Vec2::ZERO,
            vertices,
            fill: Color::rgb(10, 200, 30),
        }
    }

    fn place(game: &mut GeoWarsGame, id: EntityId, pos: Vec2) {
        if let Some(t) = game.store.transform_mut(id) {
            t.pos = pos;
        }
    }

    #[test]
    fn bullet_splits_large_enemy_into_fragments() {
        let mut game = quiet_game();
        let enemy = game.spawn_enemy(roll(Vec2::new(900.0, 384.0), 5));
        let bullet = game.fire_at(Vec2::new(900.0, 384.0)).expect("player can fire");
        place(&mut game, bullet, Vec2::new(895.0, 384.0));

        game.collisions();
        assert!(!game.store.is_alive(enemy));
        assert!(!game.store.is_alive(bullet));
        game.store.sweep();

        assert_eq!(game.score(), 5);
        assert!(game.store.get(enemy).is_none());
        assert_eq!(game.store.count(Some(Kind::Bullet)), 0);
        assert_eq!(game.store.count(Some(Kind::LargeEnemy)), 0);
        let fragments: Vec<_> = game.store.alive(Some(Kind::SmallEnemy)).collect();
        assert_eq!(fragments.len(), 5);
        assert!(fragments.iter().all(|e| e.components.score == Some(Score(50))));
    }

    #[test]
    fn fired_bullet_splits_enemy_during_a_real_tick() {
        let mut game = quiet_game();
        let target = Vec2::new(900.0, 384.0);
        let enemy = game.spawn_enemy(roll(target, 5));
        let mut looper = GameLoop::new();
        let mut fe = HeadlessFrontend::new(Vec2::new(1280.0, 768.0));

        looper.frame(&mut game, FIXED_DT, &[ActionEvent::start(Action::Fire).at(target)], &mut fe);
        assert_eq!(game.store.count(Some(Kind::Bullet)), 1);

        let mut frames = 1;
        while game.store.is_alive(enemy) && frames < 60 {
            looper.frame(&mut game, FIXED_DT, &[], &mut fe);
            frames += 1;
        }
        // 218 px to close at 600 px/s.
        assert!(frames > 15 && frames < 30, "hit after {frames} frames");

        assert!(game.store.get(enemy).is_none());
        assert_eq!(game.score(), 5);
        assert_eq!(game.store.count(Some(Kind::Bullet)), 0);
        assert_eq!(game.store.count(Some(Kind::LargeEnemy)), 0);
        let fragments: Vec<_> = game.store.alive(Some(Kind::SmallEnemy)).collect();
        assert_eq!(fragments.len(), 5);
        for e in &fragments {
            let c = &e.components;
            assert_eq!(c.score, Some(Score(50)));
            // Made after movement and lifespan ran, so untouched this tick.
            assert_eq!(c.transform.map(|t| t.pos), Some(target));
            assert!(c.lifespan.is_some_and(|l| l.remaining == l.total));
        }
    }

    #[test]
    fn fragments_spread_evenly_with_half_radius() {
        let mut game = quiet_game();
        let enemy = game.spawn_enemy(roll(Vec2::new(300.0, 200.0), 4));
        game.split_enemy(enemy);

        let speed_max = game.config.enemy.speed_max;
        let fragments: Vec<_> = game.store.alive(Some(Kind::SmallEnemy)).collect();
        assert_eq!(fragments.len(), 4);
        for (i, e) in fragments.iter().enumerate() {
            let c = &e.components;
            let t = c.transform.expect("transform");
            assert_eq!(t.pos, Vec2::new(300.0, 200.0));
            assert!((length(t.vel) - speed_max).abs() < EPS);
            let expected = i as f32 * 90.0;
            let heading = bearing(t.vel).rem_euclid(360.0);
            assert!((heading - expected).abs() < 0.01, "fragment {i} heading {heading}");

            let shape = c.shape.expect("shape");
            assert_eq!(shape.radius, 16.0);
            assert_eq!(shape.vertices, 4);
            assert_eq!(shape.fill, Color::rgb(10, 200, 30));
            assert_eq!(c.collision_radius, Some(CollisionRadius(16.0)));
            assert!(c.lifespan.is_some());
        }
    }

    #[test]
    fn fragments_fade_and_expire() {
        let mut game = quiet_game();
        let enemy = game.spawn_enemy(roll(Vec2::new(640.0, 100.0), 3));
        game.split_enemy(enemy);
        game.store.destroy(enemy);
        game.store.sweep();

        let ticks = (game.config.enemy.lifespan / FIXED_DT.as_secs_f32()).ceil() as usize;
        for _ in 0..ticks / 2 {
            game.update(FIXED_DT, &ActionState::new());
        }
        let alpha = game
            .store
            .alive(Some(Kind::SmallEnemy))
            .next()
            .and_then(|e| e.components.lifespan)
            .map(|l| l.alpha())
            .expect("fragment alive halfway");
        assert!(alpha > 0.4 && alpha < 0.6, "alpha {alpha}");

        for _ in ticks / 2..ticks {
            game.update(FIXED_DT, &ActionState::new());
        }
        assert_eq!(game.store.count(Some(Kind::SmallEnemy)), 0);
    }

    #[test]
    fn bullet_hits_fragment() {
        let mut game = quiet_game();
        let enemy = game.spawn_enemy(roll(Vec2::new(1000.0, 600.0), 3));
        game.split_enemy(enemy);
        game.store.destroy(enemy);
        game.store.sweep();

        let bullet = game.fire_at(Vec2::new(1000.0, 600.0)).expect("player can fire");
        place(&mut game, bullet, Vec2::new(1000.0, 600.0));
        game.collisions();
        game.store.sweep();

        assert_eq!(game.score(), 30);
        assert_eq!(game.store.count(Some(Kind::SmallEnemy)), 2);
        assert_eq!(game.store.count(Some(Kind::Bullet)), 0);
    }

    #[test]
    fn touching_an_enemy_costs_points_and_respawns_player() {
        let mut game = quiet_game();
        let first = game.player;
        place(&mut game, first, Vec2::new(200.0, 200.0));
        game.spawn_enemy(roll(Vec2::new(230.0, 200.0), 6));

        game.update(FIXED_DT, &ActionState::new());

        assert_eq!(game.score(), -DEATH_PENALTY);
        assert_eq!(game.store.count(Some(Kind::LargeEnemy)), 0);
        assert_ne!(game.player, first);
        assert!(game.store.get(first).is_none());
        let pos = game.store.transform(game.player).map(|t| t.pos);
        assert_eq!(pos, Some(Vec2::new(640.0, 384.0)));
    }

    #[test]
    fn player_moves_at_configured_speed_and_stays_inside() {
        let mut game = quiet_game();
        let mut looper = GameLoop::new();
        let mut fe = HeadlessFrontend::new(Vec2::new(1280.0, 768.0));
        looper.frame(
            &mut game,
            FIXED_DT,
            &[ActionEvent::start(Action::Right), ActionEvent::start(Action::Down)],
            &mut fe,
        );
        let t = game.store.transform(game.player).copied().expect("player transform");
        assert!((length(t.vel) - game.config.player.speed).abs() < EPS);
        assert!(t.vel.x > 0.0 && t.vel.y > 0.0);

        for _ in 0..600 {
            looper.frame(&mut game, FIXED_DT, &[], &mut fe);
        }
        let pos = game.store.transform(game.player).map(|t| t.pos).expect("player transform");
        assert_eq!(pos, Vec2::new(1280.0 - 32.0, 768.0 - 32.0));

        looper.frame(&mut game, FIXED_DT, &[ActionEvent::end(Action::Right), ActionEvent::end(Action::Down)], &mut fe);
        let vel = game.store.transform(game.player).map(|t| t.vel);
        assert_eq!(vel, Some(Vec2::ZERO));
    }

    #[test]
    fn enemies_bounce_off_walls() {
        let mut game = quiet_game();
        let enemy = game.spawn_enemy(EnemyRoll {
            vel: Vec2::new(-120.0, 0.0),
            ..roll(Vec2::new(40.0, 100.0), 3)
        });
        for _ in 0..30 {
            game.update(FIXED_DT, &ActionState::new());
        }
        let t = game.store.transform(enemy).copied().expect("enemy transform");
        assert!(t.vel.x > 0.0);
        assert!(t.pos.x > 32.0 - 2.0);
    }

    #[test]
    fn paused_game_ignores_fire_and_freezes() {
        let mut game = quiet_game();
        let enemy = game.spawn_enemy(EnemyRoll {
            vel: Vec2::new(50.0, 0.0),
            ..roll(Vec2::new(400.0, 100.0), 3)
        });
        game.on_action(&ActionEvent::start(Action::Pause));
        game.on_action(&ActionEvent::start(Action::Fire).at(Vec2::new(0.0, 0.0)));
        game.update(FIXED_DT, &ActionState::new());
        assert!(game.paused);
        assert_eq!(game.store.count(Some(Kind::Bullet)), 0);
        assert_eq!(game.store.transform(enemy).map(|t| t.pos.x), Some(400.0));

        game.on_action(&ActionEvent::start(Action::Pause));
        game.on_action(&ActionEvent::start(Action::Fire).at(Vec2::new(0.0, 0.0)));
        assert_eq!(game.store.count(Some(Kind::Bullet)), 1);
    }

    #[test]
    fn bullets_expire_after_their_lifespan() {
        let mut game = quiet_game();
        game.fire_at(Vec2::new(640.0, 0.0));
        let ticks = (game.config.bullet.lifespan / FIXED_DT.as_secs_f32()).ceil() as usize;
        for _ in 0..ticks {
            game.update(FIXED_DT, &ActionState::new());
        }
        assert_eq!(game.store.count(Some(Kind::Bullet)), 0);
    }

    #[test]
    fn render_shows_score_stats_and_collision_circles() {
        let mut game = quiet_game();
        game.spawn_enemy(roll(Vec2::new(100.0, 100.0), 3));
        game.on_action(&ActionEvent::start(Action::ToggleCollision));
        let mut fe = HeadlessFrontend::new(Vec2::new(1280.0, 768.0));
        GameLoop::new().frame(&mut game, FIXED_DT, &[], &mut fe);

        assert_eq!(fe.last_frame.clears, 1);
        assert_eq!(fe.last_frame.shapes, 2);
        assert_eq!(fe.last_frame.debug, 2);
        assert_eq!(fe.last_texts[0], "Score: 0");
        assert!(fe.last_texts[1].starts_with("FPS: "));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let mut game = GeoWarsGame::new(GameConfig::default(), 1234);
            let mut fe = HeadlessFrontend::new(Vec2::new(1280.0, 768.0));
            run_headless(&mut game, None, Duration::from_secs(10), &mut fe);
            let positions: Vec<_> = game
                .store
                .alive(None)
                .filter_map(|e| e.components.transform.map(|t| (e.kind(), t.pos)))
                .collect();
            (game.score(), positions)
        };
        let (score, positions) = run();
        assert!(positions.len() > 1);
        assert_eq!((score, positions), run());
    }

    #[test]
    fn quit_finishes_the_run() {
        let mut game = quiet_game();
        game.on_action(&ActionEvent::start(Action::Quit));
        assert!(game.is_finished());
    }
}
