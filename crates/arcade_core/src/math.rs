//! Small vector helpers shared by every game.
//!
//! Angles are in degrees throughout the simulation. A bearing of 0 points
//! along +x and positive bearings turn toward +y, which is "down" in the
//! screen-space coordinates the games use.

use glam::Vec2;

const NORMALIZE_EPSILON: f32 = 0.00001;

pub fn length(v: Vec2) -> f32 {
    (v.x * v.x + v.y * v.y).sqrt()
}

pub fn dist(a: Vec2, b: Vec2) -> f32 {
    length(b - a)
}

/// Unit vector in the direction of `v`. Vectors shorter than a tiny epsilon
/// are returned unchanged so a zero input stays zero.
pub fn normalize(v: Vec2) -> Vec2 {
    let d = length(v);
    if d > NORMALIZE_EPSILON {
        v / d
    } else {
        v
    }
}

pub fn rad_to_deg(r: f32) -> f32 {
    r.to_degrees()
}

pub fn deg_to_rad(d: f32) -> f32 {
    d.to_radians()
}

/// Heading of `v` in degrees, in `(-180, 180]`.
pub fn bearing(v: Vec2) -> f32 {
    rad_to_deg(v.y.atan2(v.x))
}

/// Unit vector pointing along `bearing_deg`.
pub fn unit_from_bearing(bearing_deg: f32) -> Vec2 {
    let r = deg_to_rad(bearing_deg);
    Vec2::new(r.cos(), r.sin())
}
