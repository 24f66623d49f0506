//! Isometric projection
//!
//! Simulation positions live in iso space while collision and world bounds
//! are expressed in cartesian space. Both maps are linear, so they convert
//! velocities and offsets as well as points.

use glam::Vec2;

/// Project a cartesian point into iso space.
pub fn cartesian_to_iso(point: Vec2) -> Vec2 {
    Vec2::new(point.x - point.y, (point.x + point.y) * 0.5)
}

/// Project an iso point back into cartesian space.
pub fn iso_to_cartesian(point: Vec2) -> Vec2 {
    Vec2::new(
        (2.0 * point.y + point.x) * 0.5,
        (2.0 * point.y - point.x) * 0.5,
    )
}
