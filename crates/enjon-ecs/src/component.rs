use enjon_core::{cartesian_to_iso, iso_to_cartesian, Aabb, Color, Timer};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, NULL_ENTITY};

/// Maximum number of entities an inventory can hold.
pub const MAX_ITEMS: usize = 25;

/// Fixed-capacity storage for one component kind, indexed by entity id.
///
/// The slot array is allocated once and never grows or moves.
pub struct ComponentArray<T> {
    slots: Box<[T]>,
}

impl<T: Default> ComponentArray<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| T::default()).collect(),
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slots.get(id.index())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slots.get_mut(id.index())
    }

    /// Disjoint mutable borrows of two slots. `None` if the ids match or are out of range.
    pub fn pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut T, &mut T)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib || ia >= self.slots.len() || ib >= self.slots.len() {
            return None;
        }
        if ia < ib {
            let (lo, hi) = self.slots.split_at_mut(ib);
            Some((&mut lo[ia], &mut hi[0]))
        } else {
            let (lo, hi) = self.slots.split_at_mut(ia);
            Some((&mut hi[0], &mut lo[ib]))
        }
    }

    /// Overwrite a slot with the default value
    pub fn reset(&mut self, id: EntityId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            *slot = T::default();
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Position, motion and derived collision geometry of an entity.
///
/// `position` is in iso space with `z` as height above the ground plane;
/// `cartesian_position` and `aabb` are derived from it by [`Transform3D::sync_derived`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Target the velocity eases toward each tick
    pub velocity_goal: Vec3,
    pub view_vector: Vec2,
    pub attack_vector: Vec2,
    pub cartesian_position: Vec2,
    pub ground_position: Vec2,
    /// Iso offset from `position` to the point that touches the ground
    pub ground_offset: Vec2,
    /// Cartesian collision extents
    pub dimensions: Vec2,
    pub aabb_padding: Vec2,
    pub aabb: Aabb,
    pub base_height: f32,
    pub max_height: f32,
    /// Zero or negative mass is immovable
    pub mass: f32,
    pub angle: f32,
    pub collided_with_level: bool,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            velocity_goal: Vec3::ZERO,
            view_vector: Vec2::X,
            attack_vector: Vec2::X,
            cartesian_position: Vec2::ZERO,
            ground_position: Vec2::ZERO,
            ground_offset: Vec2::ZERO,
            dimensions: Vec2::ZERO,
            aabb_padding: Vec2::ZERO,
            aabb: Aabb::default(),
            base_height: 0.0,
            max_height: 0.0,
            mass: 1.0,
            angle: 0.0,
            collided_with_level: false,
        }
    }
}

impl Transform3D {
    pub fn new(position: Vec3, dimensions: Vec2) -> Self {
        let mut transform = Self {
            position,
            dimensions,
            ..Default::default()
        };
        transform.sync_derived();
        transform
    }

    /// Recompute ground position, cartesian position and AABB from `position`.
    pub fn sync_derived(&mut self) {
        self.ground_position = self.position.truncate() + self.ground_offset;
        self.cartesian_position = iso_to_cartesian(self.ground_position);
        self.sync_aabb();
    }

    /// Recompute the AABB from the current cartesian position.
    pub fn sync_aabb(&mut self) {
        let half = self.dimensions.abs() * 0.5 + self.aabb_padding;
        self.aabb = Aabb::from_center(self.cartesian_position, half);
    }

    /// Move so the ground point sits at `cartesian` and refresh derived state.
    pub fn set_cartesian_position(&mut self, cartesian: Vec2) {
        let ground = cartesian_to_iso(cartesian);
        let iso = ground - self.ground_offset;
        self.position.x = iso.x;
        self.position.y = iso.y;
        self.sync_derived();
    }

    /// Shift by a cartesian offset (e.g. a separation vector)
    pub fn translate_cartesian(&mut self, offset: Vec2) {
        let delta = cartesian_to_iso(offset);
        self.position.x += delta.x;
        self.position.y += delta.y;
        self.sync_derived();
    }

    pub fn cartesian_velocity(&self) -> Vec2 {
        iso_to_cartesian(self.velocity.truncate())
    }

    pub fn set_cartesian_velocity(&mut self, velocity: Vec2) {
        let iso = cartesian_to_iso(velocity);
        self.velocity.x = iso.x;
        self.velocity.y = iso.y;
    }

    pub fn cartesian_velocity_goal(&self) -> Vec2 {
        iso_to_cartesian(self.velocity_goal.truncate())
    }

    pub fn set_cartesian_velocity_goal(&mut self, velocity: Vec2) {
        let iso = cartesian_to_iso(velocity);
        self.velocity_goal.x = iso.x;
        self.velocity_goal.y = iso.y;
    }

    /// Height above this entity's floor
    pub fn height(&self) -> f32 {
        self.position.z - self.base_height
    }

    pub fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }
}

/// Opaque sprite reference resolved by the asset layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpriteHandle(pub u32);

impl SpriteHandle {
    pub const PLACEHOLDER: SpriteHandle = SpriteHandle(0);
}

/// Space the renderer should interpret `position` in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinateFormat {
    #[default]
    Isometric,
    Cartesian,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Renderer2D {
    pub sprite: SpriteHandle,
    pub color: Color,
    /// Color restored once a hit flash ends
    pub base_color: Color,
    pub format: CoordinateFormat,
}

impl Renderer2D {
    pub fn new(sprite: SpriteHandle, color: Color) -> Self {
        Self {
            sprite,
            color,
            base_color: color,
            format: CoordinateFormat::Isometric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Animation2D {
    pub sheet: SpriteHandle,
    pub frame: u32,
    pub timer: Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerController {
    pub attacking: bool,
    pub sprinting: bool,
    /// Walking speed in iso units per tick
    pub speed: f32,
}

/// Per-AI scratch space that behavior logic reads and writes once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Blackboard {
    pub entity: EntityId,
    pub position: Vec3,
    pub target_position: Option<Vec3>,
    pub timer: Timer,
    pub velocity_goal: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AiController {
    pub blackboard: Blackboard,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub health: f32,
    pub owner: EntityId,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            health: 0.0,
            owner: NULL_ENTITY,
        }
    }
}

/// Ordered list of held item entities plus the equipped weapon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<EntityId>,
    pub weapon_equipped: Option<EntityId>,
}

impl Inventory {
    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_ITEMS
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item. Returns `Err(item)` when at capacity.
    pub fn push(&mut self, item: EntityId) -> Result<(), EntityId> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    pub fn remove(&mut self, item: EntityId) -> bool {
        let before = self.items.len();
        self.items.retain(|&e| e != item);
        if self.weapon_equipped == Some(item) {
            self.weapon_equipped = None;
        }
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.weapon_equipped = None;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_get_and_reset() {
        let mut array = ComponentArray::<Health>::with_capacity(4);
        array.get_mut(EntityId(2)).unwrap().health = 10.0;
        assert_eq!(array.get(EntityId(2)).unwrap().health, 10.0);
        array.reset(EntityId(2));
        assert_eq!(array.get(EntityId(2)).unwrap().health, 0.0);
        assert!(array.get(EntityId(4)).is_none());
        assert_eq!(array.capacity(), 4);
    }

    #[test]
    fn array_pair_mut_either_order() {
        let mut array = ComponentArray::<Health>::with_capacity(4);
        {
            let (a, b) = array.pair_mut(EntityId(3), EntityId(1)).unwrap();
            a.health = 3.0;
            b.health = 1.0;
        }
        assert_eq!(array.get(EntityId(3)).unwrap().health, 3.0);
        assert_eq!(array.get(EntityId(1)).unwrap().health, 1.0);
        assert!(array.pair_mut(EntityId(1), EntityId(1)).is_none());
        assert!(array.pair_mut(EntityId(1), EntityId(9)).is_none());
    }

    #[test]
    fn transform_derives_cartesian_and_aabb() {
        let iso = cartesian_to_iso(Vec2::new(100.0, 50.0));
        let transform = Transform3D::new(iso.extend(0.0), Vec2::splat(20.0));
        assert!((transform.cartesian_position - Vec2::new(100.0, 50.0)).length() < 1e-3);
        assert!(transform.aabb.min.cmple(transform.aabb.max).all());
        assert!((transform.aabb.center() - transform.cartesian_position).length() < 1e-3);
    }

    #[test]
    fn transform_cartesian_velocity_round_trip() {
        let mut transform = Transform3D::default();
        transform.set_cartesian_velocity(Vec2::new(-4.0, 2.0));
        assert!((transform.cartesian_velocity() - Vec2::new(-4.0, 2.0)).length() < 1e-4);
    }

    #[test]
    fn transform_negative_dimensions_keep_min_below_max() {
        let transform = Transform3D::new(Vec3::ZERO, Vec2::new(-10.0, -6.0));
        assert!(transform.aabb.min.cmple(transform.aabb.max).all());
    }

    #[test]
    fn inventory_capacity() {
        let mut inventory = Inventory::default();
        for i in 0..MAX_ITEMS {
            inventory.push(EntityId(i as u32)).unwrap();
        }
        assert!(inventory.is_full());
        assert_eq!(inventory.push(EntityId(999)), Err(EntityId(999)));
        assert_eq!(inventory.len(), MAX_ITEMS);
    }

    #[test]
    fn inventory_remove_clears_equipped() {
        let mut inventory = Inventory::default();
        inventory.push(EntityId(7)).unwrap();
        inventory.weapon_equipped = Some(EntityId(7));
        assert!(inventory.remove(EntityId(7)));
        assert!(inventory.weapon_equipped.is_none());
        assert!(!inventory.remove(EntityId(7)));
    }
}
