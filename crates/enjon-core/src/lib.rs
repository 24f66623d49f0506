//! Enjon Core - Core types and utilities for the Enjon engine
//!
//! This crate provides the foundational types used by the simulation:
//! - Mathematical primitives (re-exported from glam)
//! - Axis-aligned bounding boxes and the isometric projection
//! - Timers and the fixed-step frame clock

pub mod iso;
pub mod time;
pub mod types;

pub use glam::{Vec2, Vec3};
pub use iso::{cartesian_to_iso, iso_to_cartesian};
pub use time::{FrameClock, Timer, TimeConfig};
pub use types::{Aabb, Color};
