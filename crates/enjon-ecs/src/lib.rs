//! Enjon ECS - Entity Component System
//!
//! Fixed-capacity entity storage with one array per component kind, a
//! parallel attribute system for gameplay state, and a uniform spatial hash
//! used by collision broad-phase.

mod attribute;
mod component;
mod entity;
mod error;
mod manager;
mod mask;
mod spatial;
mod system;

pub use attribute::{AttributeSystem, Groups, LootProfileId, WeaponProfileId};
pub use component::{
    AiController, Animation2D, Blackboard, ComponentArray, CoordinateFormat, Health, Inventory,
    Label, PlayerController, Renderer2D, SpriteHandle, Transform3D, MAX_ITEMS,
};
pub use entity::{EntityId, MAX_ENTITIES, NULL_ENTITY};
pub use error::EcsError;
pub use manager::EntityManager;
pub use mask::{AttributeMask, ComponentMask};
pub use spatial::{Cell, CellRange, SpatialHash};
pub use system::{System, SystemSchedule};
