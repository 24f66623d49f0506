//! Picking up, equipping and dropping items
//!
//! A held item keeps its entity id but loses its transform and renderer, so
//! it neither moves, collides nor draws. Equipping a weapon gives both back
//! and hands positioning over to the wielder.

use enjon_core::Color;
use enjon_ecs::{AttributeMask, ComponentMask, EntityId, Renderer2D, Transform3D};
use glam::{Vec2, Vec3};
use tracing::debug;

use crate::world::World;

const PLACED: ComponentMask = ComponentMask::from_bits(
    ComponentMask::TRANSFORM3D.bits() | ComponentMask::RENDERER2D.bits(),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupOutcome {
    PickedUp,
    /// Holder already carries `MAX_ITEMS`. Nothing changed.
    InventoryFull,
    /// Either entity is gone, the item is already held, or the holder has no inventory
    Unavailable,
}

pub fn pickup(world: &mut World, holder: EntityId, item: EntityId) -> PickupOutcome {
    if !world.is_active(holder) || !world.is_active(item) {
        return PickupOutcome::Unavailable;
    }
    if world.manager.attributes.has(item, AttributeMask::PICKED_UP) {
        return PickupOutcome::Unavailable;
    }
    let Some(inventory) = world.manager.inventory_mut(holder) else {
        return PickupOutcome::Unavailable;
    };
    if inventory.push(item).is_err() {
        debug!("Entity {} inventory full, leaving {}", holder, item);
        return PickupOutcome::InventoryFull;
    }
    let arm = inventory.weapon_equipped.is_none();

    if let Some(mask) = world.manager.attributes.mask_mut(item) {
        mask.insert(AttributeMask::PICKED_UP);
        mask.remove(AttributeMask::COLLIDABLE);
    }
    if let Some(groups) = world.manager.attributes.groups.get_mut(item) {
        groups.parent = holder;
    }
    world.remove_components(item, PLACED);
    debug!("Entity {} picked up {}", holder, item);

    if arm && world.manager.attributes.has(item, AttributeMask::WEAPON) {
        equip(world, holder, item);
    }
    PickupOutcome::PickedUp
}

/// Equip a weapon the holder already carries, unequipping the previous one.
pub fn equip(world: &mut World, holder: EntityId, weapon: EntityId) -> bool {
    let carried = world
        .manager
        .inventory(holder)
        .is_some_and(|inv| inv.items.contains(&weapon));
    if !carried || !world.manager.attributes.has(weapon, AttributeMask::WEAPON) {
        return false;
    }
    if let Some(previous) = world.manager.inventory(holder).and_then(|inv| inv.weapon_equipped) {
        if previous == weapon {
            return true;
        }
        unequip(world, holder);
    }

    if world.manager.add_components(weapon, PLACED).is_err() {
        return false;
    }
    let name = world
        .manager
        .label(weapon)
        .map(|l| l.name.clone())
        .unwrap_or_default();
    let sprite = world.sprites.sheet(&name);
    if let Some(renderer) = world.manager.renderer_mut(weapon) {
        *renderer = Renderer2D::new(sprite, Color::WHITE);
    }
    let wielder_position = world.manager.transform(holder).map(|t| t.position);
    if let (Some(position), Some(transform)) =
        (wielder_position, world.manager.transform_mut(weapon))
    {
        *transform = Transform3D::new(position, Vec2::ZERO);
    }
    if let Some(mask) = world.manager.attributes.mask_mut(weapon) {
        mask.insert(AttributeMask::EQUIPPED);
    }
    if let Some(inventory) = world.manager.inventory_mut(holder) {
        inventory.weapon_equipped = Some(weapon);
    }
    debug!("Entity {} equipped {}", holder, weapon);
    true
}

/// Put the equipped weapon back into the pack.
pub fn unequip(world: &mut World, holder: EntityId) -> Option<EntityId> {
    let weapon = world.manager.inventory_mut(holder)?.weapon_equipped.take()?;
    if let Some(mask) = world.manager.attributes.mask_mut(weapon) {
        mask.remove(AttributeMask::EQUIPPED);
    }
    world.remove_components(weapon, PLACED);
    Some(weapon)
}

/// Take an item out of the inventory and place it on the ground at `position` (iso).
pub fn drop_item(world: &mut World, holder: EntityId, item: EntityId, position: Vec3) -> bool {
    let Some(inventory) = world.manager.inventory_mut(holder) else {
        return false;
    };
    let was_equipped = inventory.weapon_equipped == Some(item);
    if !inventory.remove(item) {
        return false;
    }
    if !was_equipped && world.manager.add_components(item, PLACED).is_err() {
        return false;
    }
    if let Some(transform) = world.manager.transform_mut(item) {
        *transform = Transform3D::new(position, Vec2::splat(8.0));
    }
    if let Some(mask) = world.manager.attributes.mask_mut(item) {
        mask.remove(AttributeMask::PICKED_UP | AttributeMask::EQUIPPED);
    }
    if let Some(groups) = world.manager.attributes.groups.get_mut(item) {
        groups.parent = groups.entity;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::factory::{self, SpawnDesc};
    use enjon_ecs::MAX_ITEMS;

    fn setup() -> (World, EntityId) {
        let mut world = World::new(SimulationConfig {
            entity_capacity: 64,
            ..Default::default()
        })
        .unwrap();
        let player = factory::create_player(
            &mut world,
            &SpawnDesc::new("Hero", Vec3::ZERO, Vec2::splat(16.0)),
        )
        .unwrap();
        (world, player)
    }

    fn item(world: &mut World, name: &str) -> EntityId {
        factory::create_item(world, &SpawnDesc::new(name, Vec3::ZERO, Vec2::splat(8.0))).unwrap()
    }

    #[test]
    fn test_pickup_hides_item() {
        let (mut world, player) = setup();
        let ring = item(&mut world, "Ring");
        assert_eq!(pickup(&mut world, player, ring), PickupOutcome::PickedUp);
        assert!(world.manager.attributes.has(ring, AttributeMask::PICKED_UP));
        assert!(world.manager.transform(ring).is_none());
        assert!(world.manager.is_alive(ring));
        assert_eq!(world.manager.inventory(player).unwrap().items, vec![ring]);
        assert_eq!(world.manager.attributes.parent(ring), player);
    }

    #[test]
    fn test_pickup_twice_is_rejected() {
        let (mut world, player) = setup();
        let ring = item(&mut world, "Ring");
        pickup(&mut world, player, ring);
        assert_eq!(pickup(&mut world, player, ring), PickupOutcome::Unavailable);
        assert_eq!(world.manager.inventory(player).unwrap().len(), 1);
    }

    #[test]
    fn test_full_inventory_leaves_item() {
        let (mut world, player) = setup();
        for i in 0..MAX_ITEMS {
            let it = item(&mut world, &format!("Junk{}", i));
            assert_eq!(pickup(&mut world, player, it), PickupOutcome::PickedUp);
        }
        let extra = item(&mut world, "Extra");
        assert_eq!(pickup(&mut world, player, extra), PickupOutcome::InventoryFull);
        assert!(!world.manager.attributes.has(extra, AttributeMask::PICKED_UP));
        assert!(world.manager.transform(extra).is_some());
        assert_eq!(world.manager.inventory(player).unwrap().len(), MAX_ITEMS);
    }

    #[test]
    fn test_first_weapon_is_equipped() {
        let (mut world, player) = setup();
        let sword = factory::create_weapon(
            &mut world,
            &SpawnDesc::new("Dagger", Vec3::ZERO, Vec2::splat(8.0)),
            "Dagger",
        )
        .unwrap();
        pickup(&mut world, player, sword);
        assert_eq!(world.manager.inventory(player).unwrap().weapon_equipped, Some(sword));
        assert!(world.manager.attributes.has(sword, AttributeMask::EQUIPPED));
        assert!(world.manager.transform(sword).is_some());
        assert!(world.manager.renderer(sword).is_some());
    }

    #[test]
    fn test_swap_weapons() {
        let (mut world, player) = setup();
        let dagger = factory::create_weapon(
            &mut world,
            &SpawnDesc::new("Dagger", Vec3::ZERO, Vec2::splat(8.0)),
            "Dagger",
        )
        .unwrap();
        let axe = factory::create_weapon(
            &mut world,
            &SpawnDesc::new("Axe", Vec3::ZERO, Vec2::splat(8.0)),
            "Axe",
        )
        .unwrap();
        pickup(&mut world, player, dagger);
        pickup(&mut world, player, axe);
        // Second weapon goes to the pack.
        assert!(!world.manager.attributes.has(axe, AttributeMask::EQUIPPED));

        assert!(equip(&mut world, player, axe));
        assert!(world.manager.attributes.has(axe, AttributeMask::EQUIPPED));
        assert!(!world.manager.attributes.has(dagger, AttributeMask::EQUIPPED));
        assert!(world.manager.transform(dagger).is_none());
    }

    #[test]
    fn test_equip_requires_carrying() {
        let (mut world, player) = setup();
        let axe = factory::create_weapon(
            &mut world,
            &SpawnDesc::new("Axe", Vec3::ZERO, Vec2::splat(8.0)),
            "Axe",
        )
        .unwrap();
        assert!(!equip(&mut world, player, axe));
    }

    #[test]
    fn test_drop_item_restores_it() {
        let (mut world, player) = setup();
        let ring = item(&mut world, "Ring");
        pickup(&mut world, player, ring);
        assert!(drop_item(&mut world, player, ring, Vec3::new(5.0, 5.0, 0.0)));
        assert!(world.manager.inventory(player).unwrap().is_empty());
        assert!(!world.manager.attributes.has(ring, AttributeMask::PICKED_UP));
        assert_eq!(world.manager.transform(ring).unwrap().position, Vec3::new(5.0, 5.0, 0.0));
    }
}
