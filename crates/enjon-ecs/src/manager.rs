use tracing::{debug, warn};

use crate::attribute::AttributeSystem;
use crate::component::{
    AiController, Animation2D, ComponentArray, Health, Inventory, Label, PlayerController,
    Renderer2D, Transform3D,
};
use crate::entity::{EntityAllocator, EntityId, MAX_ENTITIES};
use crate::error::EcsError;
use crate::mask::ComponentMask;

macro_rules! component_accessors {
    ($($field:ident: $ty:ty => $bit:ident, $get:ident, $get_mut:ident;)+) => {
        $(
            pub fn $get(&self, id: EntityId) -> Option<&$ty> {
                if self.has_components(id, ComponentMask::$bit) {
                    self.$field.get(id)
                } else {
                    None
                }
            }

            pub fn $get_mut(&mut self, id: EntityId) -> Option<&mut $ty> {
                if self.has_components(id, ComponentMask::$bit) {
                    self.$field.get_mut(id)
                } else {
                    None
                }
            }
        )+

        fn reset_slots(&mut self, id: EntityId, mask: ComponentMask) {
            $(
                if mask.contains(ComponentMask::$bit) {
                    self.$field.reset(id);
                }
            )+
        }
    };
}

/// Owns every entity slot and the component arrays indexed by them.
///
/// Capacity is fixed at construction; no array is ever resized.
pub struct EntityManager {
    allocator: EntityAllocator,
    masks: ComponentArray<ComponentMask>,
    transforms: ComponentArray<Transform3D>,
    renderers: ComponentArray<Renderer2D>,
    animations: ComponentArray<Animation2D>,
    players: ComponentArray<PlayerController>,
    ais: ComponentArray<AiController>,
    healths: ComponentArray<Health>,
    inventories: ComponentArray<Inventory>,
    labels: ComponentArray<Label>,
    pub attributes: AttributeSystem,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTITIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            allocator: EntityAllocator::with_capacity(capacity),
            masks: ComponentArray::with_capacity(capacity),
            transforms: ComponentArray::with_capacity(capacity),
            renderers: ComponentArray::with_capacity(capacity),
            animations: ComponentArray::with_capacity(capacity),
            players: ComponentArray::with_capacity(capacity),
            ais: ComponentArray::with_capacity(capacity),
            healths: ComponentArray::with_capacity(capacity),
            inventories: ComponentArray::with_capacity(capacity),
            labels: ComponentArray::with_capacity(capacity),
            attributes: AttributeSystem::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.allocator.capacity()
    }

    // ---- Entity lifecycle ----

    /// Allocate an entity owning the components in `mask`.
    ///
    /// Fails without touching any array when every slot is taken.
    pub fn create_entity(&mut self, mask: ComponentMask) -> Result<EntityId, EcsError> {
        if mask.is_empty() {
            return Err(EcsError::EmptyMask);
        }
        let Some(id) = self.allocator.allocate() else {
            warn!("Entity capacity exhausted ({} slots)", self.capacity());
            return Err(EcsError::CapacityExhausted {
                capacity: self.capacity(),
            });
        };
        if let Some(slot) = self.masks.get_mut(id) {
            *slot = mask;
        }
        debug!("Created entity {} with {:?}", id, mask);
        Ok(id)
    }

    /// Reset every slot the entity may have held and free its id.
    ///
    /// Removing a dead id only re-zeroes its slots and returns `false`.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        if id.index() >= self.capacity() {
            return false;
        }
        self.reset_slots(id, ComponentMask::ALL);
        self.attributes.reset(id);
        self.masks.reset(id);
        let released = self.allocator.release(id);
        if released {
            debug!("Removed entity {}", id);
        }
        released
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        !self.component_mask(id).is_empty()
    }

    pub fn component_mask(&self, id: EntityId) -> ComponentMask {
        self.masks.get(id).copied().unwrap_or_default()
    }

    pub fn has_components(&self, id: EntityId, mask: ComponentMask) -> bool {
        !mask.is_empty() && self.component_mask(id).contains(mask)
    }

    /// Enable components on a live entity. Newly enabled slots start from defaults.
    pub fn add_components(&mut self, id: EntityId, mask: ComponentMask) -> Result<(), EcsError> {
        if !self.is_alive(id) {
            return Err(EcsError::InvalidEntity(id));
        }
        let current = self.component_mask(id);
        let added = mask & !current;
        self.reset_slots(id, added);
        if let Some(slot) = self.masks.get_mut(id) {
            slot.insert(mask);
        }
        Ok(())
    }

    /// Disable components without destroying the entity.
    ///
    /// Clearing the last component removes the entity, since an empty mask means free.
    /// Returns `true` in that case so the caller can drop anything it keyed on the id.
    pub fn remove_components(&mut self, id: EntityId, mask: ComponentMask) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let removed = self.component_mask(id) & mask;
        self.reset_slots(id, removed);
        if let Some(slot) = self.masks.get_mut(id) {
            slot.remove(mask);
        }
        self.component_mask(id).is_empty() && self.remove_entity(id)
    }

    /// Live entity ids in creation order
    pub fn live_entities(&self) -> &[EntityId] {
        self.allocator.live()
    }

    pub fn entity_count(&self) -> usize {
        self.allocator.len()
    }

    /// One past the highest id ever handed out
    pub fn max_available_id(&self) -> usize {
        self.allocator.max_available()
    }

    /// Every slot satisfies "mask empty exactly when not in the live list".
    pub fn live_set_consistent(&self) -> bool {
        (0..self.capacity()).all(|i| {
            let id = EntityId(i as u32);
            let in_live = self.allocator.live().contains(&id);
            self.is_alive(id) == in_live && self.allocator.is_in_use(id) == in_live
        })
    }

    // ---- Components ----

    component_accessors! {
        transforms: Transform3D => TRANSFORM3D, transform, transform_mut;
        renderers: Renderer2D => RENDERER2D, renderer, renderer_mut;
        animations: Animation2D => ANIMATION2D, animation, animation_mut;
        players: PlayerController => PLAYERCONTROLLER, player_controller, player_controller_mut;
        ais: AiController => AICONTROLLER, ai_controller, ai_controller_mut;
        healths: Health => HEALTH, health, health_mut;
        inventories: Inventory => INVENTORY, inventory, inventory_mut;
        labels: Label => LABEL, label, label_mut;
    }

    /// Mutable transforms of two distinct entities that both carry one.
    pub fn transform_pair_mut(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> Option<(&mut Transform3D, &mut Transform3D)> {
        if !self.has_components(a, ComponentMask::TRANSFORM3D)
            || !self.has_components(b, ComponentMask::TRANSFORM3D)
        {
            return None;
        }
        self.transforms.pair_mut(a, b)
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::AttributeMask;
    use glam::Vec2;

    fn living_mask() -> ComponentMask {
        ComponentMask::TRANSFORM3D | ComponentMask::HEALTH | ComponentMask::INVENTORY
    }

    #[test]
    fn create_and_remove() {
        let mut manager = EntityManager::with_capacity(8);
        let e = manager.create_entity(living_mask()).unwrap();
        assert!(manager.is_alive(e));
        assert_eq!(manager.entity_count(), 1);
        assert!(manager.live_set_consistent());

        manager.health_mut(e).unwrap().health = 60.0;
        manager.inventory_mut(e).unwrap().items.push(EntityId(5));
        *manager.attributes.mask_mut(e).unwrap() = AttributeMask::AI;

        assert!(manager.remove_entity(e));
        assert!(!manager.is_alive(e));
        assert!(manager.health(e).is_none());
        assert!(manager.attributes.mask(e).is_empty());
        assert!(manager.live_set_consistent());
    }

    #[test]
    fn removed_slots_hold_defaults() {
        let mut manager = EntityManager::with_capacity(4);
        let e = manager.create_entity(living_mask()).unwrap();
        manager.health_mut(e).unwrap().health = 60.0;
        manager.inventory_mut(e).unwrap().weapon_equipped = Some(EntityId(2));
        manager.remove_entity(e);

        // Reallocate the same slot and check nothing leaked through.
        let mut ids = Vec::new();
        while let Ok(id) = manager.create_entity(living_mask()) {
            ids.push(id);
        }
        assert!(ids.contains(&e));
        assert_eq!(manager.health(e).unwrap().health, 0.0);
        assert!(manager.inventory(e).unwrap().weapon_equipped.is_none());
        assert!(manager.inventory(e).unwrap().is_empty());
    }

    #[test]
    fn double_remove_is_noop() {
        let mut manager = EntityManager::with_capacity(4);
        let e = manager.create_entity(living_mask()).unwrap();
        assert!(manager.remove_entity(e));
        assert!(!manager.remove_entity(e));
        assert_eq!(manager.entity_count(), 0);
        assert!(manager.live_set_consistent());
    }

    #[test]
    fn capacity_exhaustion_returns_error_without_writes() {
        let mut manager = EntityManager::with_capacity(3);
        for _ in 0..3 {
            manager.create_entity(living_mask()).unwrap();
        }
        let before: Vec<_> = (0..3)
            .map(|i| manager.component_mask(EntityId(i)))
            .collect();
        let result = manager.create_entity(ComponentMask::LABEL);
        assert_eq!(result, Err(EcsError::CapacityExhausted { capacity: 3 }));
        let after: Vec<_> = (0..3)
            .map(|i| manager.component_mask(EntityId(i)))
            .collect();
        assert_eq!(before, after);
        assert_eq!(manager.entity_count(), 3);
    }

    #[test]
    fn empty_mask_rejected() {
        let mut manager = EntityManager::with_capacity(2);
        assert_eq!(manager.create_entity(ComponentMask::NONE), Err(EcsError::EmptyMask));
        assert_eq!(manager.entity_count(), 0);
    }

    #[test]
    fn accessors_respect_mask() {
        let mut manager = EntityManager::with_capacity(2);
        let e = manager.create_entity(ComponentMask::TRANSFORM3D).unwrap();
        assert!(manager.transform(e).is_some());
        assert!(manager.health(e).is_none());
        assert!(manager.label_mut(e).is_none());
    }

    #[test]
    fn remove_and_add_components() {
        let mut manager = EntityManager::with_capacity(2);
        let e = manager
            .create_entity(ComponentMask::TRANSFORM3D | ComponentMask::RENDERER2D | ComponentMask::LABEL)
            .unwrap();
        manager.transform_mut(e).unwrap().dimensions = Vec2::splat(8.0);

        let placed = ComponentMask::TRANSFORM3D | ComponentMask::RENDERER2D;
        assert!(!manager.remove_components(e, placed));
        assert!(manager.is_alive(e));
        assert!(manager.transform(e).is_none());

        manager.add_components(e, ComponentMask::TRANSFORM3D).unwrap();
        // Re-enabled slot starts fresh.
        assert_eq!(manager.transform(e).unwrap().dimensions, Vec2::ZERO);
    }

    #[test]
    fn removing_last_component_frees_entity() {
        let mut manager = EntityManager::with_capacity(2);
        let e = manager.create_entity(ComponentMask::LABEL).unwrap();
        assert!(manager.remove_components(e, ComponentMask::LABEL));
        assert!(!manager.is_alive(e));
        assert!(manager.live_set_consistent());
    }

    #[test]
    fn add_components_on_dead_entity_fails() {
        let mut manager = EntityManager::with_capacity(2);
        assert_eq!(
            manager.add_components(EntityId(1), ComponentMask::LABEL),
            Err(EcsError::InvalidEntity(EntityId(1)))
        );
    }

    #[test]
    fn transform_pair_mut_requires_both() {
        let mut manager = EntityManager::with_capacity(3);
        let a = manager.create_entity(ComponentMask::TRANSFORM3D).unwrap();
        let b = manager.create_entity(ComponentMask::TRANSFORM3D).unwrap();
        let c = manager.create_entity(ComponentMask::LABEL).unwrap();
        assert!(manager.transform_pair_mut(a, b).is_some());
        assert!(manager.transform_pair_mut(a, c).is_none());
        assert!(manager.transform_pair_mut(a, a).is_none());
    }

    #[test]
    fn max_available_tracks_highest_slot() {
        let mut manager = EntityManager::with_capacity(5);
        let a = manager.create_entity(ComponentMask::LABEL).unwrap();
        manager.create_entity(ComponentMask::LABEL).unwrap();
        manager.remove_entity(a);
        assert_eq!(manager.max_available_id(), 2);
    }
}
