//! Shape-overlap tests and view-boundary handling.
//!
//! There is no broad phase: the games hold a few dozen entities at most, so
//! every check is a direct pairwise test. Two primitives are supported:
//!
//!  - **Aabb** -- centre plus half extents. Overlap is the per-axis
//!    penetration depth; a hit requires *both* axes to be strictly positive,
//!    so boxes that merely touch do not collide.
//!  - **Circle** -- centre plus radius. A hit is `distance < r1 + r2`.
//!
//! Boundary helpers cover the three behaviours the games need: wraparound
//! for lane traffic, reflective bounce for drifting shapes, and a clamp that
//! keeps the player fully on screen.

use glam::Vec2;

use crate::components::Transform;
use crate::math::dist;
use crate::render::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self {
            center_x: center.x,
            center_y: center.y,
            half_w: half.x,
            half_h: half.y,
        }
    }

    /// Per-axis penetration depth. Negative components mean the boxes are
    /// separated on that axis.
    pub fn overlap(&self, other: &Aabb) -> Vec2 {
        let dx = (self.center_x - other.center_x).abs();
        let dy = (self.center_y - other.center_y).abs();
        Vec2::new(
            self.half_w + other.half_w - dx,
            self.half_h + other.half_h - dy,
        )
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        let o = self.overlap(other);
        o.x > 0.0 && o.y > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn intersects(&self, other: &Circle) -> bool {
        dist(self.center, other.center) < self.radius + other.radius
    }
}

/// Teleport an entity that has fully left the view horizontally to the
/// opposite edge. Only the direction of travel is checked, so an entity
/// parked off screen with zero velocity stays where it is.
///
/// `prev_pos` is shifted by the same amount so the per-tick displacement of
/// a wrapped platform stays equal to `vel * dt`. Returns true on wrap.
pub fn wrap_horizontal(transform: &mut Transform, half_w: f32, view_width: f32, margin: f32) -> bool {
    let reach = half_w + margin;
    let new_x = if transform.vel.x < 0.0 && transform.pos.x + reach < 0.0 {
        view_width + reach
    } else if transform.vel.x > 0.0 && transform.pos.x - reach > view_width {
        -reach
    } else {
        return false;
    };
    let shift = new_x - transform.pos.x;
    transform.pos.x = new_x;
    transform.prev_pos.x += shift;
    true
}

/// Reflect velocity off the walls of `bounds`. A component is flipped only
/// while the circle touches a wall *and* still moves into it, so an entity
/// that spawned partly outside cannot get stuck flipping every tick.
pub fn bounce_in_bounds(transform: &mut Transform, radius: f32, bounds: Rect) -> bool {
    bounce_box_in_bounds(transform, Vec2::splat(radius), bounds)
}

/// `bounce_in_bounds` for a body with separate half extents per axis.
pub fn bounce_box_in_bounds(transform: &mut Transform, half: Vec2, bounds: Rect) -> bool {
    let mut bounced = false;
    let p = transform.pos;
    if (p.x - half.x <= bounds.left && transform.vel.x < 0.0)
        || (p.x + half.x >= bounds.right() && transform.vel.x > 0.0)
    {
        transform.vel.x = -transform.vel.x;
        bounced = true;
    }
    if (p.y - half.y <= bounds.top && transform.vel.y < 0.0)
        || (p.y + half.y >= bounds.bottom() && transform.vel.y > 0.0)
    {
        transform.vel.y = -transform.vel.y;
        bounced = true;
    }
    bounced
}

/// Clamp a point so a body of the given half extents stays inside `bounds`.
pub fn clamp_in_bounds(pos: Vec2, half: Vec2, bounds: Rect) -> Vec2 {
    Vec2::new(
        pos.x.max(bounds.left + half.x).min(bounds.right() - half.x),
        pos.y.max(bounds.top + half.y).min(bounds.bottom() - half.y),
    )
}
