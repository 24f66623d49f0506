//! Hit-flash and lifetime timers

use enjon_ecs::{AttributeMask, EntityId, System};
use tracing::debug;

use crate::world::World;

/// Ends hit flashes and removes entities whose lifetime ran out.
pub struct StatusSystem;

impl StatusSystem {
    fn tick_flash(world: &mut World, id: EntityId, dt: f32) {
        let Some(timer) = world.manager.attributes.damage_timers.get_mut(id) else {
            return;
        };
        *timer -= dt;
        if *timer > 0.0 {
            return;
        }
        *timer = 0.0;
        if let Some(mask) = world.manager.attributes.mask_mut(id) {
            mask.remove(AttributeMask::DAMAGED);
        }
        if let Some(renderer) = world.manager.renderer_mut(id) {
            renderer.color = renderer.base_color;
        }
    }

    fn tick_lifetime(world: &mut World, id: EntityId) -> bool {
        let expired = match world.manager.attributes.lifetimes.get_mut(id) {
            Some(Some(timer)) => timer.tick(),
            _ => false,
        };
        if expired {
            debug!("Entity {} expired", id);
            world.despawn(id);
        }
        expired
    }
}

impl System<World> for StatusSystem {
    fn run(&mut self, world: &mut World) {
        let dt = world.dt();
        let live: Vec<EntityId> = world.manager.live_entities().to_vec();
        for id in live {
            if !world.is_active(id) {
                continue;
            }
            if world.manager.attributes.has(id, AttributeMask::DAMAGED) {
                Self::tick_flash(world, id, dt);
            }
            Self::tick_lifetime(world, id);
        }
    }

    fn name(&self) -> &'static str {
        "StatusSystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::factory::{self, SpawnDesc};
    use enjon_core::Color;
    use glam::{Vec2, Vec3};

    fn world() -> World {
        World::new(SimulationConfig {
            entity_capacity: 16,
            timestep: 0.25,
            damage_flash: 0.5,
            debris_lifetime: 0.5,
            ..Default::default()
        })
        .unwrap()
    }

    fn desc(name: &str) -> SpawnDesc {
        SpawnDesc::new(name, Vec3::ZERO, Vec2::splat(16.0))
    }

    #[test]
    fn test_flash_clears_after_duration() {
        let mut world = world();
        let ai = factory::create_ai(&mut world, &desc("Beast").with_color(Color::BLUE), "Monster1").unwrap();
        world.damage(ai, 1.0);

        StatusSystem.run(&mut world);
        assert!(world.manager.attributes.has(ai, AttributeMask::DAMAGED));
        assert_eq!(world.manager.renderer(ai).unwrap().color, Color::RED);

        StatusSystem.run(&mut world);
        assert!(!world.manager.attributes.has(ai, AttributeMask::DAMAGED));
        assert_eq!(world.manager.renderer(ai).unwrap().color, Color::BLUE);
    }

    #[test]
    fn test_lifetime_expiry_despawns() {
        let mut world = world();
        let debris = factory::create_debris(&mut world, &desc("Debris"), Vec3::ZERO).unwrap();
        let rock = factory::create_prop(&mut world, &desc("Rock")).unwrap();

        StatusSystem.run(&mut world);
        assert!(world.is_active(debris));
        StatusSystem.run(&mut world);
        assert!(!world.is_active(debris));
        assert!(world.is_active(rock));

        world.flush_removals();
        assert!(!world.manager.is_alive(debris));
    }
}
