//! Simulation context
//!
//! `World` owns everything a tick touches: entity storage, the spatial grid,
//! profiles, dice and the per-tick candidate list. Systems receive it by
//! `&mut` and nothing else mutates simulation state.
//!
//! Removal is deferred. [`World::kill`] and [`World::despawn`] only queue an
//! id; the entity stays allocated until [`World::flush_removals`] runs at the
//! end of the current stage. Queued entities report `false` from
//! [`World::is_active`], which every resolver checks before touching a pair.

use enjon_core::{Aabb, Color};
use enjon_ecs::{
    AttributeMask, ComponentMask, CoordinateFormat, EntityId, EntityManager, SpatialHash,
    SpriteHandle,
};
use glam::{Vec2, Vec3};
use serde::Serialize;
use tracing::{debug, info};

use crate::assets::SpriteCatalog;
use crate::config::SimulationConfig;
use crate::effect::EffectStorage;
use crate::error::GameError;
use crate::input::InputSnapshot;
use crate::loot;
use crate::profile::ProfileRegistry;
use crate::random::Dice;

/// What the renderer may read about one entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderItem {
    pub entity: EntityId,
    pub position: Vec3,
    pub aabb: Aabb,
    pub sprite: SpriteHandle,
    pub color: Color,
    pub format: CoordinateFormat,
}

pub struct World {
    pub config: SimulationConfig,
    pub manager: EntityManager,
    pub grid: SpatialHash,
    pub effects: EffectStorage,
    pub profiles: ProfileRegistry,
    pub sprites: SpriteCatalog,
    pub dice: Dice,
    pub input: InputSnapshot,
    /// Entities registered in the grid this tick, in registration order
    pub candidates: Vec<EntityId>,
    pending_removals: Vec<EntityId>,
    bounds: Aabb,
}

impl World {
    pub fn new(config: SimulationConfig) -> Result<Self, GameError> {
        Self::with_profiles(config, ProfileRegistry::new())
    }

    /// Build a world around an existing profile table.
    ///
    /// Fails if a tuning value is not finite or the spatial grid cannot be allocated.
    pub fn with_profiles(
        config: SimulationConfig,
        profiles: ProfileRegistry,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let bounds = config.world_bounds();
        let grid = SpatialHash::covering(bounds, config.cell_size)?;
        info!(
            "World initialized: {}x{} cells over {:?}..{:?}, capacity {}",
            grid.cols(),
            grid.rows(),
            bounds.min,
            bounds.max,
            config.entity_capacity
        );
        Ok(Self {
            manager: EntityManager::with_capacity(config.entity_capacity),
            effects: EffectStorage::with_capacity(config.entity_capacity),
            dice: Dice::new(config.seed),
            grid,
            profiles,
            sprites: SpriteCatalog::new(),
            input: InputSnapshot::default(),
            candidates: Vec::new(),
            pending_removals: Vec::new(),
            bounds,
            config,
        })
    }

    /// Cartesian area entities are kept inside
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn dt(&self) -> f32 {
        self.config.timestep
    }

    // ---- Lifecycle ----

    /// Alive and not queued for removal
    pub fn is_active(&self, id: EntityId) -> bool {
        self.manager.is_alive(id) && !self.pending_removals.contains(&id)
    }

    /// Queue an entity for removal at the end of the stage, without loot.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if !self.is_active(id) {
            return false;
        }
        self.pending_removals.push(id);
        true
    }

    /// Queue a dead entity for removal and drop its loot where it stood.
    pub fn kill(&mut self, id: EntityId) -> bool {
        if !self.despawn(id) {
            return false;
        }
        let position = self.manager.transform(id).map(|t| t.position);
        let profile = self.manager.attributes.loot_profile(id);
        debug!("Entity {} died", id);
        if let (Some(position), Some(profile)) = (position, profile) {
            loot::drop_loot(self, position, profile);
        }
        true
    }

    /// Disable components on an active entity.
    ///
    /// Stripping the last component queues the entity like [`World::despawn`]
    /// and leaves its mask alone until the flush. Returns `true` if the entity
    /// was queued.
    pub fn remove_components(&mut self, id: EntityId, mask: ComponentMask) -> bool {
        if !self.is_active(id) {
            return false;
        }
        if (self.manager.component_mask(id) & !mask).is_empty() {
            return self.despawn(id);
        }
        self.manager.remove_components(id, mask);
        false
    }

    pub fn pending_removals(&self) -> &[EntityId] {
        &self.pending_removals
    }

    /// Remove every queued entity along with the items it carried.
    pub fn flush_removals(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_removals);
        let mut removed = 0;
        for id in pending {
            let held: Vec<EntityId> = self
                .manager
                .inventory(id)
                .map(|inventory| inventory.items.clone())
                .unwrap_or_default();
            for item in held {
                self.effects.clear(item);
                if self.manager.remove_entity(item) {
                    removed += 1;
                }
            }
            self.effects.clear(id);
            if self.manager.remove_entity(id) {
                removed += 1;
            }
        }
        removed
    }

    // ---- Combat ----

    /// Subtract health, flash the entity and start its DAMAGED timer.
    ///
    /// Returns `true` if the hit was lethal.
    pub fn damage(&mut self, id: EntityId, amount: f32) -> bool {
        if !self.is_active(id) || self.manager.health(id).is_none() {
            return false;
        }
        if let Some(mask) = self.manager.attributes.mask_mut(id) {
            mask.insert(AttributeMask::DAMAGED);
        }
        if let Some(timer) = self.manager.attributes.damage_timers.get_mut(id) {
            *timer = self.config.damage_flash;
        }
        if let Some(renderer) = self.manager.renderer_mut(id) {
            renderer.color = Color::RED;
        }
        self.drain_health(id, amount)
    }

    /// Subtract health without any hit feedback. Kills at or below zero.
    pub fn drain_health(&mut self, id: EntityId, amount: f32) -> bool {
        if !self.is_active(id) {
            return false;
        }
        let Some(health) = self.manager.health_mut(id) else {
            return false;
        };
        health.health -= amount;
        if health.health <= 0.0 {
            self.kill(id);
            return true;
        }
        false
    }

    // ---- Queries ----

    /// Active players with their cartesian ground position
    pub fn players(&self) -> Vec<(EntityId, Vec2)> {
        self.manager
            .live_entities()
            .iter()
            .filter(|&&id| {
                self.is_active(id) && self.manager.attributes.has(id, AttributeMask::PLAYER)
            })
            .filter_map(|&id| {
                self.manager
                    .transform(id)
                    .map(|t| (id, t.cartesian_position))
            })
            .collect()
    }

    /// Current health, or an error if the entity has no health component
    pub fn health_of(&self, id: EntityId) -> Result<f32, GameError> {
        self.manager
            .health(id)
            .map(|h| h.health)
            .ok_or(GameError::MissingComponent {
                entity: id,
                component: "Health",
            })
    }

    pub fn count_with(&self, flags: AttributeMask) -> usize {
        self.manager
            .live_entities()
            .iter()
            .filter(|&&id| self.manager.attributes.has(id, flags))
            .count()
    }

    /// Everything the renderer needs, read-only
    pub fn render_snapshot(&self) -> Vec<RenderItem> {
        let renderable = ComponentMask::TRANSFORM3D | ComponentMask::RENDERER2D;
        self.manager
            .live_entities()
            .iter()
            .filter(|&&id| self.is_active(id) && self.manager.has_components(id, renderable))
            .filter_map(|&id| {
                let transform = self.manager.transform(id)?;
                let renderer = self.manager.renderer(id)?;
                Some(RenderItem {
                    entity: id,
                    position: transform.position,
                    aabb: transform.aabb,
                    sprite: renderer.sprite,
                    color: renderer.color,
                    format: renderer.format,
                })
            })
            .collect()
    }
}
