//! Enjon Game - IsoARPG simulation
//!
//! The per-tick systems (input, AI, movement, collision, effects, timers),
//! the entity factory and the gameplay tables they read.

pub mod ai;
pub mod assets;
pub mod collision;
pub mod config;
pub mod effect;
pub mod error;
pub mod factory;
pub mod input;
pub mod inventory;
pub mod loot;
pub mod profile;
pub mod random;
pub mod simulation;
pub mod status;
pub mod transform;
pub mod world;

pub use ai::{AiSystem, BehaviorStatus, BehaviorTree, SeekTarget};
pub use assets::SpriteCatalog;
pub use collision::{CollisionKind, CollisionStats, CollisionSystem, PairTable, Resolver};
pub use config::SimulationConfig;
pub use effect::{EffectComponent, EffectDuration, EffectKind, EffectStorage, EffectSystem};
pub use error::GameError;
pub use factory::SpawnDesc;
pub use input::{InputAction, InputBindings, InputSnapshot, InputSystem};
pub use inventory::PickupOutcome;
pub use loot::Rarity;
pub use profile::{LootProfile, ProfileRegistry, ProfileTable, WeaponKind, WeaponProfile};
pub use random::Dice;
pub use simulation::Simulation;
pub use status::StatusSystem;
pub use transform::TransformSystem;
pub use world::{RenderItem, World};
