use enjon_core::Aabb;
use enjon_ecs::{AttributeMask, EntityId};
use glam::Vec2;
use tracing::{trace, warn};

use super::CollisionKind;
use crate::effect::EffectComponent;
use crate::factory;
use crate::inventory::{self, PickupOutcome};
use crate::profile::WeaponProfile;
use crate::world::World;

/// Response applied to an overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolver {
    /// Push bodies apart; weapons and players also deal damage
    Enemy,
    /// Grenades explode, anything else hits once and is removed
    Projectile,
    /// Player picks the item up
    Item,
    /// Separation plus an impulse scaled by inverse mass
    Debris,
    /// Pull toward the vortex center
    Vortex,
    /// Area damage and knockback
    Explosive,
}

/// Resolver for a pair of kinds, in either order.
pub fn resolver_for(a: CollisionKind, b: CollisionKind) -> Option<Resolver> {
    use CollisionKind::*;
    match (a, b) {
        (Item, Item) => None,
        (Item, Weapon) | (Weapon, Item) => None,
        (Item, Player) | (Player, Item) => Some(Resolver::Item),
        (Item, Enemy) | (Enemy, Item) => None,
        (Item, Projectile) | (Projectile, Item) => None,
        (Item, Explosive) | (Explosive, Item) => None,
        (Item, Prop) | (Prop, Item) => None,
        (Item, Vortex) | (Vortex, Item) => Some(Resolver::Vortex),
        (Weapon, Weapon) => None,
        (Weapon, Player) | (Player, Weapon) => None,
        (Weapon, Enemy) | (Enemy, Weapon) => Some(Resolver::Enemy),
        (Weapon, Projectile) | (Projectile, Weapon) => None,
        (Weapon, Explosive) | (Explosive, Weapon) => None,
        (Weapon, Prop) | (Prop, Weapon) => None,
        (Weapon, Vortex) | (Vortex, Weapon) => None,
        (Player, Player) => None,
        (Player, Enemy) | (Enemy, Player) => Some(Resolver::Enemy),
        (Player, Projectile) | (Projectile, Player) => None,
        (Player, Explosive) | (Explosive, Player) => None,
        (Player, Prop) | (Prop, Player) => Some(Resolver::Debris),
        (Player, Vortex) | (Vortex, Player) => None,
        (Enemy, Enemy) => Some(Resolver::Enemy),
        (Enemy, Projectile) | (Projectile, Enemy) => Some(Resolver::Projectile),
        (Enemy, Explosive) | (Explosive, Enemy) => Some(Resolver::Explosive),
        (Enemy, Prop) | (Prop, Enemy) => Some(Resolver::Debris),
        (Enemy, Vortex) | (Vortex, Enemy) => Some(Resolver::Vortex),
        (Projectile, Projectile) => None,
        (Projectile, Explosive) | (Explosive, Projectile) => None,
        (Projectile, Prop) | (Prop, Projectile) => Some(Resolver::Projectile),
        (Projectile, Vortex) | (Vortex, Projectile) => None,
        (Explosive, Explosive) => None,
        (Explosive, Prop) | (Prop, Explosive) => Some(Resolver::Explosive),
        (Explosive, Vortex) | (Vortex, Explosive) => None,
        (Prop, Prop) => Some(Resolver::Debris),
        (Prop, Vortex) | (Vortex, Prop) => Some(Resolver::Vortex),
        (Vortex, Vortex) => None,
    }
}

/// Classify and resolve one candidate pair. Returns `true` if a resolver acted.
pub fn resolve_pair(world: &mut World, a: EntityId, b: EntityId) -> bool {
    let attrs = &world.manager.attributes;
    let (Some(ka), Some(kb)) = (
        CollisionKind::classify(attrs.mask(a)),
        CollisionKind::classify(attrs.mask(b)),
    ) else {
        return false;
    };
    let Some(resolver) = resolver_for(ka, kb) else {
        return false;
    };
    // Resolvers see the lower kind first.
    let (first, k1, second, k2) = if ka <= kb {
        (a, ka, b, kb)
    } else {
        (b, kb, a, ka)
    };
    trace!("{:?} {} ({:?}) vs {} ({:?})", resolver, first, k1, second, k2);

    match resolver {
        Resolver::Enemy => collide_with_enemy(world, first, k1, second),
        Resolver::Projectile => {
            if k1 == CollisionKind::Projectile {
                collide_with_projectile(world, first, second)
            } else {
                collide_with_projectile(world, second, first)
            }
        }
        Resolver::Item => collide_with_item(world, first, second),
        Resolver::Debris => collide_with_debris(world, first, second),
        Resolver::Vortex => collide_with_vortex(world, first, second),
        Resolver::Explosive => {
            if k1 == CollisionKind::Explosive {
                collide_with_explosive(world, first, second)
            } else {
                collide_with_explosive(world, second, first)
            }
        }
    }
}

/// Both entities still active and their boxes overlap
fn overlapping(world: &World, a: EntityId, b: EntityId) -> Option<(Aabb, Aabb)> {
    if !world.is_active(a) || !world.is_active(b) {
        return None;
    }
    let a_box = world.manager.transform(a)?.aabb;
    let b_box = world.manager.transform(b)?.aabb;
    a_box.intersects(&b_box).then_some((a_box, b_box))
}

fn profile_of(world: &World, weapon: EntityId) -> WeaponProfile {
    world
        .manager
        .attributes
        .weapon_profile(weapon)
        .and_then(|id| world.profiles.weapon(id))
        .cloned()
        .unwrap_or_default()
}

/// Roll the profile's damage against `target` and maybe attach its effect.
fn strike(world: &mut World, profile: &WeaponProfile, target: EntityId) -> bool {
    let amount = world.dice.roll_int(profile.damage_min, profile.damage_max) as f32;
    if world.damage(target, amount) {
        return true;
    }
    if let Some(kind) = profile.effect {
        if world.dice.chance(profile.effect_chance) {
            let effect =
                EffectComponent::temporary(kind, world.config.effect_duration, world.dt(), target);
            world.effects.attach(target, effect);
        }
    }
    false
}

/// Add a cartesian velocity kick scaled by the target's inverse mass.
fn knock(world: &mut World, target: EntityId, direction: Vec2, strength: f32) {
    if let Some(transform) = world.manager.transform_mut(target) {
        let kick = direction.normalize_or_zero() * strength * transform.inverse_mass();
        let velocity = transform.cartesian_velocity() + kick;
        transform.set_cartesian_velocity(velocity);
    }
}

/// Move both bodies out of each other in proportion to inverse mass, then
/// cancel approaching velocity with the given restitution. Returns `false`
/// if neither body can move.
fn separate(
    world: &mut World,
    a: EntityId,
    b: EntityId,
    a_box: &Aabb,
    b_box: &Aabb,
    restitution: f32,
) -> bool {
    let Some(mtv) = a_box.penetration(b_box) else {
        return false;
    };
    let Some((ta, tb)) = world.manager.transform_pair_mut(a, b) else {
        return false;
    };
    let (ima, imb) = (ta.inverse_mass(), tb.inverse_mass());
    let total = ima + imb;
    if total <= 0.0 {
        return false;
    }
    ta.translate_cartesian(mtv * (ima / total));
    tb.translate_cartesian(-mtv * (imb / total));

    if restitution > 0.0 {
        let normal = mtv.normalize_or_zero();
        let (va, vb) = (ta.cartesian_velocity(), tb.cartesian_velocity());
        let approach = (va - vb).dot(normal);
        if approach < 0.0 {
            let j = -(1.0 + restitution) * approach / total;
            ta.set_cartesian_velocity(va + normal * (j * ima));
            tb.set_cartesian_velocity(vb - normal * (j * imb));
        }
    }
    true
}

fn collide_with_enemy(
    world: &mut World,
    first: EntityId,
    kind: CollisionKind,
    enemy: EntityId,
) -> bool {
    let Some((a_box, b_box)) = overlapping(world, first, enemy) else {
        return false;
    };
    match kind {
        CollisionKind::Weapon => {
            let profile = profile_of(world, first);
            if !strike(world, &profile, enemy) {
                knock(world, enemy, b_box.center() - a_box.center(), profile.knockback);
            }
        }
        CollisionKind::Player => {
            separate(world, first, enemy, &a_box, &b_box, 0.0);
            // The hit flash doubles as a short invulnerability window.
            if !world.manager.attributes.has(first, AttributeMask::DAMAGED) {
                let amount = world.config.contact_damage;
                world.damage(first, amount);
            }
        }
        _ => {
            separate(world, first, enemy, &a_box, &b_box, 0.0);
        }
    }
    true
}

fn collide_with_projectile(world: &mut World, projectile: EntityId, target: EntityId) -> bool {
    if world.manager.attributes.has(target, AttributeMask::DEBRIS) {
        return false;
    }
    if overlapping(world, projectile, target).is_none() {
        return false;
    }

    if world.manager.attributes.has(projectile, AttributeMask::GRENADE) {
        if let Some(position) = world.manager.transform(projectile).map(|t| t.position) {
            if let Err(e) = factory::create_explosion(world, position, projectile) {
                warn!("Grenade {} failed to explode: {}", projectile, e);
            }
        }
        world.despawn(projectile);
        return true;
    }

    if world.manager.health(target).is_some() {
        let profile = profile_of(world, projectile);
        strike(world, &profile, target);
    }
    world.despawn(projectile);
    true
}

fn collide_with_item(world: &mut World, item: EntityId, player: EntityId) -> bool {
    if overlapping(world, item, player).is_none() {
        return false;
    }
    inventory::pickup(world, player, item) == PickupOutcome::PickedUp
}

fn collide_with_debris(world: &mut World, a: EntityId, b: EntityId) -> bool {
    let Some((a_box, b_box)) = overlapping(world, a, b) else {
        return false;
    };
    let restitution = world.config.bounce_damping;
    separate(world, a, b, &a_box, &b_box, restitution)
}

fn collide_with_vortex(world: &mut World, target: EntityId, vortex: EntityId) -> bool {
    let Some((target_box, vortex_box)) = overlapping(world, target, vortex) else {
        return false;
    };
    let strength = world.config.vortex_strength;
    knock(world, target, vortex_box.center() - target_box.center(), strength);
    true
}

fn collide_with_explosive(world: &mut World, blast: EntityId, target: EntityId) -> bool {
    let Some((blast_box, target_box)) = overlapping(world, blast, target) else {
        return false;
    };
    let profile = profile_of(world, blast);
    if world.manager.health(target).is_some() && strike(world, &profile, target) {
        return true;
    }
    let mut away = target_box.center() - blast_box.center();
    if away == Vec2::ZERO {
        away = Vec2::X;
    }
    knock(world, target, away, profile.knockback);
    true
}
