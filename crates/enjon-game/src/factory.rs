//! Entity factory
//!
//! One constructor per archetype. Each allocates the entity with the right
//! component mask and fills transform, renderer, label and attributes.
//! Allocation happens first, so a full manager returns an error before any
//! slot is written.

use enjon_core::{Color, Timer};
use enjon_ecs::{
    AiController, AttributeMask, Blackboard, ComponentMask, CoordinateFormat, EntityId, Groups,
    Health, Label, PlayerController, Renderer2D, SpriteHandle, Transform3D,
};
use glam::{Vec2, Vec3};

use crate::error::GameError;
use crate::profile::WeaponKind;
use crate::world::World;

/// Where and how to spawn an entity.
#[derive(Debug, Clone)]
pub struct SpawnDesc {
    pub name: String,
    /// Iso position, `z` is height
    pub position: Vec3,
    /// Cartesian collision extents
    pub dimensions: Vec2,
    pub sprite: SpriteHandle,
    pub color: Color,
    pub format: CoordinateFormat,
    /// Extra attribute flags OR'd onto the archetype's own
    pub attributes: AttributeMask,
}

impl SpawnDesc {
    pub fn new(name: &str, position: Vec3, dimensions: Vec2) -> Self {
        Self {
            name: name.to_string(),
            position,
            dimensions,
            sprite: SpriteHandle::PLACEHOLDER,
            color: Color::WHITE,
            format: CoordinateFormat::Isometric,
            attributes: AttributeMask::NONE,
        }
    }

    pub fn with_sprite(mut self, sprite: SpriteHandle) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeMask) -> Self {
        self.attributes = attributes;
        self
    }
}

const BASIC: ComponentMask = ComponentMask::from_bits(
    ComponentMask::TRANSFORM3D.bits() | ComponentMask::RENDERER2D.bits() | ComponentMask::LABEL.bits(),
);

fn spawn(
    world: &mut World,
    components: ComponentMask,
    attributes: AttributeMask,
    desc: &SpawnDesc,
) -> Result<EntityId, GameError> {
    let id = world.manager.create_entity(components)?;

    if let Some(transform) = world.manager.transform_mut(id) {
        *transform = Transform3D::new(desc.position, desc.dimensions);
    }
    if let Some(renderer) = world.manager.renderer_mut(id) {
        *renderer = Renderer2D {
            format: desc.format,
            ..Renderer2D::new(desc.sprite, desc.color)
        };
    }
    if let Some(label) = world.manager.label_mut(id) {
        *label = Label {
            name: desc.name.clone(),
        };
    }

    let attrs = &mut world.manager.attributes;
    if let Some(mask) = attrs.mask_mut(id) {
        *mask = attributes | desc.attributes;
    }
    if let Some(groups) = attrs.groups.get_mut(id) {
        *groups = Groups {
            entity: id,
            ..Default::default()
        };
    }
    Ok(id)
}

fn set_parent(world: &mut World, id: EntityId, parent: EntityId) {
    if let Some(groups) = world.manager.attributes.groups.get_mut(id) {
        groups.parent = parent;
    }
}

fn set_lifetime(world: &mut World, id: EntityId, seconds: f32) {
    let dt = world.dt();
    if let Some(lifetime) = world.manager.attributes.lifetimes.get_mut(id) {
        *lifetime = Some(Timer::new(seconds, dt));
    }
}

fn set_velocity(world: &mut World, id: EntityId, velocity: Vec3) {
    if let Some(transform) = world.manager.transform_mut(id) {
        transform.velocity = velocity;
        transform.velocity_goal = velocity;
    }
}

pub fn create_player(world: &mut World, desc: &SpawnDesc) -> Result<EntityId, GameError> {
    let components = BASIC
        | ComponentMask::ANIMATION2D
        | ComponentMask::PLAYERCONTROLLER
        | ComponentMask::HEALTH
        | ComponentMask::INVENTORY;
    let id = spawn(
        world,
        components,
        AttributeMask::PLAYER | AttributeMask::COLLIDABLE,
        desc,
    )?;

    let health = world.config.player_health;
    let speed = world.config.player_speed;
    if let Some(controller) = world.manager.player_controller_mut(id) {
        *controller = PlayerController {
            speed,
            ..Default::default()
        };
    }
    if let Some(h) = world.manager.health_mut(id) {
        *h = Health { health, owner: id };
    }
    if let Some(animation) = world.manager.animation_mut(id) {
        animation.sheet = desc.sprite;
    }
    Ok(id)
}

/// Spawn a monster that drops from the named loot profile.
pub fn create_ai(
    world: &mut World,
    desc: &SpawnDesc,
    loot_profile: &str,
) -> Result<EntityId, GameError> {
    let components = BASIC
        | ComponentMask::ANIMATION2D
        | ComponentMask::AICONTROLLER
        | ComponentMask::HEALTH;
    let id = spawn(world, components, AttributeMask::AI | AttributeMask::COLLIDABLE, desc)?;

    let loot = world.profiles.loot_by_name(loot_profile);
    let speed = world.config.ai_speed;
    let health = world.config.ai_health;
    let position = desc.position;
    if let Some(controller) = world.manager.ai_controller_mut(id) {
        *controller = AiController {
            blackboard: Blackboard {
                entity: id,
                position,
                ..Default::default()
            },
            speed,
        };
    }
    if let Some(h) = world.manager.health_mut(id) {
        *h = Health { health, owner: id };
    }
    if let Some(animation) = world.manager.animation_mut(id) {
        animation.sheet = desc.sprite;
    }
    if let Some(slot) = world.manager.attributes.loot_profiles.get_mut(id) {
        *slot = Some(loot);
    }
    Ok(id)
}

/// A loose item on the ground. It only joins the grid when a player is near.
pub fn create_item(world: &mut World, desc: &SpawnDesc) -> Result<EntityId, GameError> {
    spawn(world, BASIC, AttributeMask::ITEM, desc)
}

/// A weapon lying on the ground, tied to the named profile.
pub fn create_weapon(
    world: &mut World,
    desc: &SpawnDesc,
    profile: &str,
) -> Result<EntityId, GameError> {
    let profile_id = world.profiles.weapon_by_name(profile);
    let kind = world
        .profiles
        .weapon(profile_id)
        .map(|p| p.kind)
        .unwrap_or_default();
    let id = spawn(
        world,
        BASIC,
        AttributeMask::WEAPON | kind.attributes(),
        desc,
    )?;
    if let Some(slot) = world.manager.attributes.weapon_profiles.get_mut(id) {
        *slot = Some(profile_id);
    }
    Ok(id)
}

fn create_thrown(
    world: &mut World,
    desc: &SpawnDesc,
    profile: &str,
    extra: AttributeMask,
    owner: EntityId,
    velocity: Vec3,
) -> Result<EntityId, GameError> {
    let id = create_weapon(
        world,
        &desc.clone().with_attributes(desc.attributes | extra),
        profile,
    )?;
    set_parent(world, id, owner);
    set_velocity(world, id, velocity);
    Ok(id)
}

/// An arrow-like projectile. It is removed when it touches the floor or hits something.
pub fn create_projectile(
    world: &mut World,
    desc: &SpawnDesc,
    profile: &str,
    owner: EntityId,
    velocity: Vec3,
) -> Result<EntityId, GameError> {
    let id = create_thrown(
        world,
        desc,
        profile,
        AttributeMask::PROJECTILE | AttributeMask::COLLIDABLE,
        owner,
        velocity,
    )?;
    let lifetime = world.config.projectile_lifetime;
    set_lifetime(world, id, lifetime);
    Ok(id)
}

/// A grenade that climbs to `max_height`, falls, and explodes near the floor.
pub fn create_grenade(
    world: &mut World,
    desc: &SpawnDesc,
    owner: EntityId,
    velocity: Vec3,
    max_height: f32,
) -> Result<EntityId, GameError> {
    let id = create_thrown(
        world,
        desc,
        "Grenade",
        WeaponKind::Grenade.attributes() | AttributeMask::COLLIDABLE | AttributeMask::RISING,
        owner,
        velocity,
    )?;
    if let Some(transform) = world.manager.transform_mut(id) {
        transform.max_height = max_height;
    }
    Ok(id)
}

/// Blast left behind by `parent`, with a short lifetime and a cloud of debris.
pub fn create_explosion(
    world: &mut World,
    position: Vec3,
    parent: EntityId,
) -> Result<EntityId, GameError> {
    let radius = world.config.explosion_radius;
    let desc = SpawnDesc::new("Explosion", Vec3::new(position.x, position.y, 0.0), Vec2::splat(radius * 2.0))
        .with_color(Color::ORANGE)
        .with_attributes(AttributeMask::EXPLODED | AttributeMask::COLLIDABLE);
    let id = create_weapon(world, &desc, "Explosion")?;
    set_parent(world, id, parent);
    let lifetime = world.config.explosion_lifetime;
    set_lifetime(world, id, lifetime);

    let count = world.config.debris_count;
    let speed = world.config.debris_speed;
    for i in 0..count {
        let angle = std::f32::consts::TAU * i as f32 / count.max(1) as f32;
        let velocity = Vec3::new(angle.cos() * speed, angle.sin() * speed, speed);
        let debris = SpawnDesc::new("Debris", desc.position + Vec3::Z, Vec2::splat(4.0))
            .with_color(Color::GREY);
        if create_debris(world, &debris, velocity).is_err() {
            break;
        }
    }
    Ok(id)
}

pub fn create_vortex(
    world: &mut World,
    position: Vec3,
    owner: EntityId,
) -> Result<EntityId, GameError> {
    let radius = world.config.vortex_radius;
    let desc = SpawnDesc::new("Vortex", position, Vec2::splat(radius * 2.0))
        .with_color(Color::PURPLE)
        .with_attributes(AttributeMask::COLLIDABLE);
    let id = create_weapon(world, &desc, "Vortex")?;
    set_parent(world, id, owner);
    let lifetime = world.config.vortex_lifetime;
    set_lifetime(world, id, lifetime);
    Ok(id)
}

/// Light physical fragment that bounces around and expires on its own.
pub fn create_debris(
    world: &mut World,
    desc: &SpawnDesc,
    velocity: Vec3,
) -> Result<EntityId, GameError> {
    let id = spawn(
        world,
        BASIC,
        AttributeMask::PROP | AttributeMask::DEBRIS | AttributeMask::COLLIDABLE,
        desc,
    )?;
    if let Some(transform) = world.manager.transform_mut(id) {
        transform.velocity = velocity;
        transform.mass = 0.25;
    }
    let lifetime = world.config.debris_lifetime;
    set_lifetime(world, id, lifetime);
    Ok(id)
}

/// Static scenery. Zero mass, so collisions never move it.
pub fn create_prop(world: &mut World, desc: &SpawnDesc) -> Result<EntityId, GameError> {
    let id = spawn(world, BASIC, AttributeMask::PROP | AttributeMask::COLLIDABLE, desc)?;
    if let Some(transform) = world.manager.transform_mut(id) {
        transform.mass = 0.0;
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::profile::DEFAULT_WEAPON;
    use enjon_ecs::EcsError;

    fn world(capacity: usize) -> World {
        World::new(SimulationConfig {
            entity_capacity: capacity,
            ..Default::default()
        })
        .unwrap()
    }

    fn desc(name: &str) -> SpawnDesc {
        SpawnDesc::new(name, Vec3::new(10.0, 20.0, 0.0), Vec2::splat(16.0))
    }

    #[test]
    fn player_archetype() {
        let mut world = world(8);
        let player = create_player(&mut world, &desc("Hero").with_color(Color::BLUE)).unwrap();
        let mask = world.manager.component_mask(player);
        assert!(mask.contains(ComponentMask::PLAYERCONTROLLER | ComponentMask::INVENTORY));
        assert!(world
            .manager
            .attributes
            .has(player, AttributeMask::PLAYER | AttributeMask::COLLIDABLE));
        assert_eq!(world.manager.label(player).unwrap().name, "Hero");
        assert_eq!(world.manager.renderer(player).unwrap().base_color, Color::BLUE);
        assert_eq!(world.manager.health(player).unwrap().health, world.config.player_health);
        assert_eq!(world.manager.attributes.groups.get(player).unwrap().entity, player);
    }

    #[test]
    fn ai_gets_blackboard_and_loot() {
        let mut world = world(8);
        let ai = create_ai(&mut world, &desc("Beast"), "Unknown").unwrap();
        let controller = world.manager.ai_controller(ai).unwrap();
        assert_eq!(controller.blackboard.entity, ai);
        let loot = world.manager.attributes.loot_profile(ai).unwrap();
        assert_eq!(world.profiles.loot(loot).unwrap().name, "Monster1");
        assert!(world.manager.inventory(ai).is_none());
    }

    #[test]
    fn items_are_not_collidable() {
        let mut world = world(8);
        let item = create_item(&mut world, &desc("Ring")).unwrap();
        assert!(world.manager.attributes.has(item, AttributeMask::ITEM));
        assert!(!world.manager.attributes.has(item, AttributeMask::COLLIDABLE));
    }

    #[test]
    fn weapon_profile_lookup_falls_back() {
        let mut world = world(8);
        let weapon = create_weapon(&mut world, &desc("Mystery"), "NoSuchWeapon").unwrap();
        let profile = world.manager.attributes.weapon_profile(weapon).unwrap();
        assert_eq!(world.profiles.weapon(profile).unwrap().name, DEFAULT_WEAPON);
        assert!(world.manager.attributes.has(weapon, AttributeMask::WEAPON | AttributeMask::MELEE));
    }

    #[test]
    fn grenade_starts_rising() {
        let mut world = world(8);
        let owner = create_player(&mut world, &desc("Hero")).unwrap();
        let grenade =
            create_grenade(&mut world, &desc("Grenade"), owner, Vec3::new(1.0, 0.0, 0.0), 20.0)
                .unwrap();
        let attrs = world.manager.attributes.mask(grenade);
        assert!(attrs.contains(AttributeMask::GRENADE | AttributeMask::PROJECTILE | AttributeMask::RISING));
        assert_eq!(world.manager.attributes.parent(grenade), owner);
        assert_eq!(world.manager.transform(grenade).unwrap().max_height, 20.0);
    }

    #[test]
    fn explosion_spawns_debris_and_expires() {
        let mut world = world(32);
        let explosion = create_explosion(&mut world, Vec3::ZERO, EntityId(7)).unwrap();
        assert!(world.manager.attributes.has(explosion, AttributeMask::EXPLODED | AttributeMask::EXPLOSIVE));
        assert_eq!(world.manager.attributes.parent(explosion), EntityId(7));
        assert!(world.manager.attributes.lifetimes.get(explosion).unwrap().is_some());
        assert_eq!(world.count_with(AttributeMask::DEBRIS), world.config.debris_count as usize);
    }

    #[test]
    fn capacity_failure_writes_nothing() {
        let mut world = world(1);
        create_prop(&mut world, &desc("Rock")).unwrap();
        let result = create_player(&mut world, &desc("Hero"));
        assert!(matches!(
            result,
            Err(GameError::Ecs(EcsError::CapacityExhausted { capacity: 1 }))
        ));
        assert_eq!(world.manager.entity_count(), 1);
    }

    #[test]
    fn spawned_aabb_is_well_formed() {
        let mut world = world(8);
        let prop = create_prop(&mut world, &desc("Rock")).unwrap();
        let t = world.manager.transform(prop).unwrap();
        assert!(t.aabb.min.cmple(t.aabb.max).all());
        assert_eq!(t.mass, 0.0);
    }
}
