//! Static level layout: ten traffic lanes, the goal row and the lives row.
//!
//! Lanes are spawned once. Traffic never respawns; it loops by screen wrap.
//! Rows are given as distances up from the bottom of the view.

use glam::Vec2;

use arcade_core::animation::AnimationLibrary;
use arcade_core::components::{Animation, BoundingBox, Transform};
use arcade_core::entity::{EntityId, EntityStore};
use arcade_core::state::GoalState;

use crate::assets::clip;
use crate::scene::Kind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneSpec {
    pub kind: Kind,
    pub animation: &'static str,
    /// Row height measured up from the bottom edge.
    pub rise: f32,
    pub count: usize,
    pub first_x: f32,
    /// Added to x for each subsequent entity; negative walks left.
    pub spacing: f32,
    pub size: Vec2,
    pub speed: f32,
}

#[allow(clippy::too_many_arguments)]
const fn lane(
    kind: Kind,
    animation: &'static str,
    rise: f32,
    count: usize,
    first_x: f32,
    spacing: f32,
    width: f32,
    speed: f32,
) -> LaneSpec {
    LaneSpec {
        kind,
        animation,
        rise,
        count,
        first_x,
        spacing,
        size: Vec2::new(width, 15.0),
        speed,
    }
}

pub const LANES: [LaneSpec; 10] = [
    lane(Kind::Car, "raceCarL", 60.0, 3, 150.0, 150.0, 30.0, -40.0),
    lane(Kind::Car, "tractor", 100.0, 3, 300.0, -150.0, 30.0, 40.0),
    lane(Kind::Car, "car", 140.0, 3, 150.0, 150.0, 30.0, -50.0),
    lane(Kind::Car, "raceCarR", 180.0, 3, 300.0, -150.0, 30.0, 60.0),
    lane(Kind::Car, "truck", 220.0, 2, 240.0, 200.0, 50.0, -70.0),
    lane(Kind::Turtles, "3turtles", 300.0, 4, 100.0, 150.0, 80.0, -40.0),
    lane(Kind::Tree, "tree1", 340.0, 3, 400.0, -175.0, 70.0, 40.0),
    lane(Kind::Tree, "tree2", 380.0, 3, 400.0, -230.0, 170.0, 60.0),
    lane(Kind::Turtles, "2turtles", 420.0, 4, 175.0, 130.0, 50.0, -40.0),
    lane(Kind::Tree, "tree1", 460.0, 3, 350.0, -175.0, 70.0, 50.0),
];

pub const GOAL_COUNT: usize = 5;
const GOAL_RISE: f32 = 500.0;
const GOAL_SPACING: f32 = 102.0;
const GOAL_SIZE: f32 = 20.0;

const LIVES_Y: f32 = 20.0;
const LIVES_SPACING: f32 = 20.0;

pub fn spawn_lane(
    store: &mut EntityStore<Kind>,
    lib: &AnimationLibrary,
    lane: &LaneSpec,
    view: Vec2,
) -> Result<Vec<EntityId>, String> {
    let anim = clip(lib, lane.animation)?;
    let mut pos = Vec2::new(lane.first_x, view.y - lane.rise);
    let mut ids = Vec::with_capacity(lane.count);
    for i in 0..lane.count {
        let id = store.create(lane.kind);
        if let Some(c) = store.components_mut(id) {
            // Only the lead turtle group in a lane dives.
            let animation = Animation::new(lane.animation, anim.clone());
            c.animation = Some(if lane.kind == Kind::Turtles && i > 0 {
                animation.paused()
            } else {
                animation
            });
            c.bounding_box = Some(BoundingBox::new(lane.size));
            c.transform = Some(Transform::moving(pos, Vec2::new(lane.speed, 0.0)));
        }
        ids.push(id);
        pos.x += lane.spacing;
    }
    Ok(ids)
}

pub fn spawn_lanes(store: &mut EntityStore<Kind>, lib: &AnimationLibrary, view: Vec2) -> Result<(), String> {
    for lane in &LANES {
        spawn_lane(store, lib, lane, view)?;
    }
    Ok(())
}

/// Five lily pads spread evenly around the centre of the top row.
pub fn spawn_goals(store: &mut EntityStore<Kind>, lib: &AnimationLibrary, view: Vec2) -> Result<(), String> {
    let anim = clip(lib, "lillyPad")?;
    let mut pos = Vec2::new(view.x / 2.0 - 2.0 * GOAL_SPACING, view.y - GOAL_RISE);
    for _ in 0..GOAL_COUNT {
        let id = store.create(Kind::Goal);
        if let Some(c) = store.components_mut(id) {
            c.animation = Some(Animation::new("lillyPad", anim.clone()));
            c.transform = Some(Transform::at(pos));
            c.bounding_box = Some(BoundingBox::new(Vec2::splat(GOAL_SIZE)));
            c.goal_state = Some(GoalState::Open);
        }
        pos.x += GOAL_SPACING;
    }
    Ok(())
}

/// One icon per life, left to right from near the top-right corner. The
/// rightmost icon is the one removed on death.
pub fn spawn_lives(
    store: &mut EntityStore<Kind>,
    lib: &AnimationLibrary,
    view: Vec2,
    lives: u32,
) -> Result<(), String> {
    let anim = clip(lib, "lives")?;
    let mut pos = Vec2::new(view.x - 57.5, LIVES_Y);
    for _ in 0..lives {
        let id = store.create(Kind::Lives);
        if let Some(c) = store.components_mut(id) {
            c.animation = Some(Animation::new("lives", anim.clone()));
            c.transform = Some(Transform::at(pos));
        }
        pos.x += LIVES_SPACING;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::default_animations;

    const VIEW: Vec2 = Vec2::new(480.0, 600.0);

    #[test]
    fn lane_one_matches_layout() {
        let mut store = EntityStore::new();
        let lib = default_animations();
        let ids = spawn_lane(&mut store, &lib, &LANES[0], VIEW).expect("spawn lane");
        let xs: Vec<f32> = ids
            .iter()
            .filter_map(|&id| store.transform(id).map(|t| t.pos.x))
            .collect();
        assert_eq!(xs, vec![150.0, 300.0, 450.0]);
        let t = store.transform(ids[0]).copied().expect("transform");
        assert_eq!(t.pos.y, 540.0);
        assert_eq!(t.vel, Vec2::new(-40.0, 0.0));
        assert!(ids.iter().all(|&id| store.get(id).map(|e| e.kind()) == Some(Kind::Car)));
    }

    #[test]
    fn only_first_turtle_group_animates() {
        let mut store = EntityStore::new();
        let lib = default_animations();
        let ids = spawn_lane(&mut store, &lib, &LANES[5], VIEW).expect("spawn lane");
        let playing: Vec<bool> = ids
            .iter()
            .filter_map(|&id| store.components(id).and_then(|c| c.animation.as_ref()).map(|a| a.playing))
            .collect();
        assert_eq!(playing, vec![true, false, false, false]);
    }

    #[test]
    fn full_layout_counts() {
        let mut store = EntityStore::new();
        let lib = default_animations();
        spawn_lanes(&mut store, &lib, VIEW).expect("spawn lanes");
        spawn_goals(&mut store, &lib, VIEW).expect("spawn goals");
        spawn_lives(&mut store, &lib, VIEW, 3).expect("spawn lives");
        assert_eq!(store.count(Some(Kind::Car)), 14);
        assert_eq!(store.count(Some(Kind::Turtles)), 8);
        assert_eq!(store.count(Some(Kind::Tree)), 9);
        assert_eq!(store.count(Some(Kind::Goal)), 5);
        assert_eq!(store.count(Some(Kind::Lives)), 3);
    }

    #[test]
    fn goals_are_centred_on_the_top_row() {
        let mut store = EntityStore::new();
        let lib = default_animations();
        spawn_goals(&mut store, &lib, VIEW).expect("spawn goals");
        let xs: Vec<f32> = store
            .alive(Some(Kind::Goal))
            .filter_map(|e| e.components.transform.map(|t| t.pos.x))
            .collect();
        assert_eq!(xs, vec![36.0, 138.0, 240.0, 342.0, 444.0]);
    }

    #[test]
    fn missing_clip_is_an_error() {
        let mut store = EntityStore::new();
        let lib = AnimationLibrary::new();
        let err = spawn_lane(&mut store, &lib, &LANES[0], VIEW).expect_err("missing clip");
        assert!(err.contains("raceCarL"));
    }
}
