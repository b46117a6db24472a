pub mod animation;
pub mod collision;
pub mod components;
pub mod driver;
pub mod entity;
pub mod input;
pub mod math;
pub mod render;
pub mod replay;
pub mod state;
pub mod time;

pub use glam::Vec2;
