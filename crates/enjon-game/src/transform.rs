//! Movement, level bounds and broad-phase registration
//!
//! Runs in two passes over a snapshot of the live list. The first moves
//! every free entity. The second rebuilds the spatial grid and the collision
//! candidate list from the settled positions, then snaps equipped weapons to
//! their wielders.

use enjon_core::Aabb;
use enjon_ecs::{AttributeMask, EntityId, System};
use glam::{Vec2, Vec3};
use tracing::warn;

use crate::factory;
use crate::profile::WeaponProfile;
use crate::world::World;

/// Grenades at or above this height keep falling instead of exploding
pub const DETONATION_HEIGHT: f32 = 2.0;

/// Move `current` toward `goal` by at most `max_step`, never overshooting.
pub fn lerp_toward(goal: f32, current: f32, max_step: f32) -> f32 {
    let diff = goal - current;
    if diff > max_step {
        current + max_step
    } else if diff < -max_step {
        current - max_step
    } else {
        goal
    }
}

/// Eight compass sectors of an attack direction, counter-clockwise from east.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sector {
    E,
    NE,
    N,
    NW,
    W,
    SW,
    S,
    SE,
}

impl Sector {
    const ALL: [Sector; 8] = [
        Sector::E,
        Sector::NE,
        Sector::N,
        Sector::NW,
        Sector::W,
        Sector::SW,
        Sector::S,
        Sector::SE,
    ];

    /// Nearest sector to a cartesian direction. A zero vector faces east.
    pub fn from_vector(v: Vec2) -> Self {
        if v == Vec2::ZERO {
            return Sector::E;
        }
        let eighth = std::f32::consts::FRAC_PI_4;
        let index = (v.y.atan2(v.x) / eighth).round() as i32;
        Self::ALL[index.rem_euclid(8) as usize]
    }

    /// Sign of each axis for this sector
    pub fn direction(self) -> (i8, i8) {
        match self {
            Sector::E => (1, 0),
            Sector::NE => (1, 1),
            Sector::N => (0, 1),
            Sector::NW => (-1, 1),
            Sector::W => (-1, 0),
            Sector::SW => (-1, -1),
            Sector::S => (0, -1),
            Sector::SE => (1, -1),
        }
    }
}

fn axis_extent(center: f32, sign: i8, reach: f32, spread: f32) -> (f32, f32) {
    match sign {
        1 => (center, center + reach),
        -1 => (center - reach, center),
        _ => (center - spread, center + spread),
    }
}

/// Hit box of a weapon held at `center` and swung along `attack`.
pub fn weapon_aabb(center: Vec2, attack: Vec2, profile: &WeaponProfile) -> Aabb {
    if profile.omnidirectional {
        return Aabb::from_center(center, Vec2::splat(profile.reach));
    }
    let (dx, dy) = Sector::from_vector(attack).direction();
    let (min_x, max_x) = axis_extent(center.x, dx, profile.reach, profile.spread);
    let (min_y, max_y) = axis_extent(center.y, dy, profile.reach, profile.spread);
    Aabb::from_corners(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
}

enum Motion {
    Settled,
    Removed,
    Detonated(Vec3),
}

pub struct TransformSystem;

impl TransformSystem {
    fn step(world: &mut World, id: EntityId) -> Motion {
        let attrs = world.manager.attributes.mask(id);
        let ease = world.config.ease_step;
        let gravity = world.config.gravity;
        let rise_speed = world.config.grenade_rise_speed;
        let damping = world.config.bounce_damping;
        let bounds = world.bounds();
        let grenade = attrs.contains(AttributeMask::GRENADE);

        let Some(transform) = world.manager.transform_mut(id) else {
            return Motion::Settled;
        };

        transform.velocity.x = lerp_toward(transform.velocity_goal.x, transform.velocity.x, ease);
        transform.velocity.y = lerp_toward(transform.velocity_goal.y, transform.velocity.y, ease);

        let mut rising = attrs.contains(AttributeMask::RISING);
        if grenade && rising {
            transform.velocity.z = rise_speed;
        } else if grenade || attrs.contains(AttributeMask::DEBRIS) {
            transform.velocity.z -= gravity;
        }

        transform.position += transform.velocity;

        if rising && transform.position.z >= transform.max_height {
            transform.position.z = transform.max_height;
            transform.velocity.z = 0.0;
            rising = false;
        }

        let mut grounded = false;
        if transform.position.z <= transform.base_height {
            transform.position.z = transform.base_height;
            transform.velocity.z = 0.0;
            grounded = true;
        }
        let height = transform.height();

        if grounded && attrs.contains(AttributeMask::PROJECTILE) && !grenade {
            world.despawn(id);
            return Motion::Removed;
        }

        transform.sync_derived();

        let cartesian = transform.cartesian_position;
        let clamped = cartesian.clamp(bounds.min, bounds.max);
        let hit_x = clamped.x != cartesian.x;
        let hit_y = clamped.y != cartesian.y;
        if hit_x || hit_y {
            let mut velocity = transform.cartesian_velocity();
            let mut goal = transform.cartesian_velocity_goal();
            let factor = if attrs.contains(AttributeMask::PLAYER) {
                0.0
            } else {
                -damping
            };
            if hit_x {
                velocity.x *= factor;
                goal.x *= factor;
            }
            if hit_y {
                velocity.y *= factor;
                goal.y *= factor;
            }
            transform.set_cartesian_velocity(velocity);
            transform.set_cartesian_velocity_goal(goal);
            transform.set_cartesian_position(clamped);
        }
        transform.collided_with_level = hit_x || hit_y;
        let position = transform.position;

        if grenade {
            if let Some(mask) = world.manager.attributes.mask_mut(id) {
                mask.set(AttributeMask::RISING, rising);
            }
            if !rising && height < DETONATION_HEIGHT {
                return Motion::Detonated(position);
            }
        }
        Motion::Settled
    }

    fn detonate(world: &mut World, grenade: EntityId, position: Vec3) {
        if let Err(e) = factory::create_explosion(world, position, grenade) {
            warn!("Grenade {} failed to explode: {}", grenade, e);
        }
        world.despawn(grenade);
    }

    /// Whether `id` should join the grid this tick.
    fn wants_registration(world: &World, id: EntityId, players: &[(EntityId, Vec2)]) -> bool {
        let attrs = world.manager.attributes.mask(id);
        if attrs.contains(AttributeMask::COLLIDABLE) {
            return true;
        }
        let loose = attrs.intersects(AttributeMask::ITEM | AttributeMask::WEAPON)
            && !attrs.intersects(AttributeMask::PICKED_UP | AttributeMask::EQUIPPED);
        if !loose {
            return false;
        }
        let Some(transform) = world.manager.transform(id) else {
            return false;
        };
        let range = world.config.item_pickup_range;
        players
            .iter()
            .any(|&(_, p)| p.distance(transform.cartesian_position) <= range)
    }

    fn register(world: &mut World, id: EntityId) {
        let Some(aabb) = world.manager.transform(id).map(|t| t.aabb) else {
            return;
        };
        let obstruction = if world.manager.attributes.has(id, AttributeMask::PROP) {
            1.0
        } else {
            0.0
        };
        world.grid.find_cells(id, &aabb, obstruction);
        world.candidates.push(id);
    }

    /// Snap the wielder's weapon to it and rebuild the weapon's hit box.
    fn slave_weapon(world: &mut World, wielder: EntityId) {
        let Some(weapon) = world.manager.inventory(wielder).and_then(|inv| inv.weapon_equipped)
        else {
            return;
        };
        if !world.is_active(weapon) {
            return;
        }
        let Some((position, center, attack)) = world
            .manager
            .transform(wielder)
            .map(|t| (t.position, t.cartesian_position, t.attack_vector))
        else {
            return;
        };
        let attacking = world
            .manager
            .player_controller(wielder)
            .is_some_and(|c| c.attacking);
        let profile = world
            .manager
            .attributes
            .weapon_profile(weapon)
            .and_then(|id| world.profiles.weapon(id))
            .cloned();

        let Some(transform) = world.manager.transform_mut(weapon) else {
            return;
        };
        transform.position = position;
        transform.attack_vector = attack;
        transform.sync_derived();
        let Some(profile) = profile else {
            return;
        };
        transform.aabb = weapon_aabb(center, attack, &profile);

        if attacking {
            Self::register(world, weapon);
        }
    }
}

impl System<World> for TransformSystem {
    fn run(&mut self, world: &mut World) {
        world.grid.clear();
        world.candidates.clear();

        let entities = world.manager.live_entities().to_vec();
        for &id in &entities {
            if !world.is_active(id)
                || world.manager.attributes.has(id, AttributeMask::EQUIPPED)
            {
                continue;
            }
            if let Motion::Detonated(position) = Self::step(world, id) {
                Self::detonate(world, id, position);
            }
        }

        let players = world.players();
        for &id in &entities {
            if !world.is_active(id)
                || world.manager.attributes.has(id, AttributeMask::EQUIPPED)
                || world.manager.transform(id).is_none()
            {
                continue;
            }
            if Self::wants_registration(world, id, &players) {
                Self::register(world, id);
            }
            Self::slave_weapon(world, id);
        }
    }

    fn name(&self) -> &'static str {
        "TransformSystem"
    }
}
