//! Per-entity gameplay attributes
//!
//! Parallel arrays holding the attribute mask, ownership groups, profile
//! handles and the short-lived timers that hang off combat state.

use enjon_core::Timer;
use serde::{Deserialize, Serialize};

use crate::component::ComponentArray;
use crate::entity::{EntityId, NULL_ENTITY};
use crate::mask::AttributeMask;

/// Index of a weapon profile in the profile registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponProfileId(pub u32);

/// Index of a loot profile in the profile registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LootProfileId(pub u32);

/// Ownership link, e.g. an explosion's parent is the grenade that spawned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groups {
    pub entity: EntityId,
    pub parent: EntityId,
}

impl Default for Groups {
    fn default() -> Self {
        Self {
            entity: NULL_ENTITY,
            parent: NULL_ENTITY,
        }
    }
}

pub struct AttributeSystem {
    pub masks: ComponentArray<AttributeMask>,
    pub groups: ComponentArray<Groups>,
    pub loot_profiles: ComponentArray<Option<LootProfileId>>,
    pub weapon_profiles: ComponentArray<Option<WeaponProfileId>>,
    /// Seconds left on a hit flash; DAMAGED clears when it reaches zero
    pub damage_timers: ComponentArray<f32>,
    /// Entities that expire on their own (explosions, vortices, debris)
    pub lifetimes: ComponentArray<Option<Timer>>,
}

impl AttributeSystem {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            masks: ComponentArray::with_capacity(capacity),
            groups: ComponentArray::with_capacity(capacity),
            loot_profiles: ComponentArray::with_capacity(capacity),
            weapon_profiles: ComponentArray::with_capacity(capacity),
            damage_timers: ComponentArray::with_capacity(capacity),
            lifetimes: ComponentArray::with_capacity(capacity),
        }
    }

    /// Zero every attribute slot of a removed entity.
    pub fn reset(&mut self, id: EntityId) {
        self.masks.reset(id);
        self.groups.reset(id);
        self.loot_profiles.reset(id);
        self.weapon_profiles.reset(id);
        self.damage_timers.reset(id);
        self.lifetimes.reset(id);
    }

    pub fn mask(&self, id: EntityId) -> AttributeMask {
        self.masks.get(id).copied().unwrap_or_default()
    }

    pub fn mask_mut(&mut self, id: EntityId) -> Option<&mut AttributeMask> {
        self.masks.get_mut(id)
    }

    pub fn has(&self, id: EntityId, flags: AttributeMask) -> bool {
        self.mask(id).contains(flags)
    }

    pub fn weapon_profile(&self, id: EntityId) -> Option<WeaponProfileId> {
        self.weapon_profiles.get(id).copied().flatten()
    }

    pub fn loot_profile(&self, id: EntityId) -> Option<LootProfileId> {
        self.loot_profiles.get(id).copied().flatten()
    }

    pub fn parent(&self, id: EntityId) -> EntityId {
        self.groups.get(id).map(|g| g.parent).unwrap_or(NULL_ENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_everything() {
        let mut attrs = AttributeSystem::with_capacity(8);
        let id = EntityId(3);
        *attrs.mask_mut(id).unwrap() = AttributeMask::AI | AttributeMask::COLLIDABLE;
        *attrs.groups.get_mut(id).unwrap() = Groups { entity: id, parent: EntityId(1) };
        *attrs.loot_profiles.get_mut(id).unwrap() = Some(LootProfileId(0));
        *attrs.lifetimes.get_mut(id).unwrap() = Some(Timer::new(1.0, 0.1));

        attrs.reset(id);
        assert!(attrs.mask(id).is_empty());
        assert_eq!(attrs.parent(id), NULL_ENTITY);
        assert_eq!(attrs.loot_profile(id), None);
        assert!(attrs.lifetimes.get(id).unwrap().is_none());
    }

    #[test]
    fn out_of_range_reads_default() {
        let attrs = AttributeSystem::with_capacity(2);
        assert!(attrs.mask(EntityId(50)).is_empty());
        assert_eq!(attrs.weapon_profile(EntityId(50)), None);
    }
}
