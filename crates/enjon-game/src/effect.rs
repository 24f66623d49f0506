//! Timed status effects
//!
//! Each entity owns a map of effects keyed by effect name. Attaching an
//! effect whose name is already present replaces the old instance.

use std::collections::HashMap;

use enjon_core::{Color, Timer};
use enjon_ecs::{ComponentArray, EntityId, System};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Poison,
    Cold,
    Burn,
}

impl EffectKind {
    /// Key the effect is stored under
    pub fn name(self) -> &'static str {
        match self {
            Self::Poison => "Poison",
            Self::Cold => "Cold",
            Self::Burn => "Burn",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Poison => Color::GREEN,
            Self::Cold => Color::BLUE,
            Self::Burn => Color::ORANGE,
        }
    }

    pub fn damage_per_tick(self) -> f32 {
        match self {
            Self::Poison => 0.1,
            Self::Cold => 0.05,
            Self::Burn => 0.25,
        }
    }

    /// Run one tick of the effect on `entity`. Returns `true` if it killed the entity.
    pub fn apply(self, entity: EntityId, world: &mut World) -> bool {
        if let Some(renderer) = world.manager.renderer_mut(entity) {
            renderer.color = self.color();
        }
        if self == Self::Cold {
            if let Some(transform) = world.manager.transform_mut(entity) {
                transform.velocity = Vec3::ZERO;
            }
        }
        world.drain_health(entity, self.damage_per_tick())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectDuration {
    /// Counts down and is erased at zero
    Temporary,
    /// Applies every tick until removed
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectComponent {
    pub kind: EffectKind,
    pub duration: EffectDuration,
    pub timer: Timer,
    pub target: EntityId,
}

impl EffectComponent {
    pub fn temporary(kind: EffectKind, seconds: f32, dt: f32, target: EntityId) -> Self {
        Self {
            kind,
            duration: EffectDuration::Temporary,
            timer: Timer::new(seconds, dt),
            target,
        }
    }

    pub fn constant(kind: EffectKind, dt: f32, target: EntityId) -> Self {
        Self {
            kind,
            duration: EffectDuration::Constant,
            timer: Timer::new(0.0, dt),
            target,
        }
    }
}

pub type EffectMap = HashMap<String, EffectComponent>;

/// Per-entity effect maps
pub struct EffectStorage {
    slots: ComponentArray<EffectMap>,
}

impl EffectStorage {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: ComponentArray::with_capacity(capacity),
        }
    }

    /// Attach an effect, overwriting any effect of the same name.
    pub fn attach(&mut self, entity: EntityId, effect: EffectComponent) {
        if let Some(map) = self.slots.get_mut(entity) {
            debug!("Attaching {} to entity {}", effect.kind.name(), entity);
            map.insert(effect.kind.name().to_string(), effect);
        }
    }

    pub fn get(&self, entity: EntityId, name: &str) -> Option<&EffectComponent> {
        self.slots.get(entity).and_then(|map| map.get(name))
    }

    pub fn has(&self, entity: EntityId, name: &str) -> bool {
        self.get(entity, name).is_some()
    }

    pub fn count(&self, entity: EntityId) -> usize {
        self.slots.get(entity).map_or(0, |map| map.len())
    }

    pub fn remove(&mut self, entity: EntityId, name: &str) -> Option<EffectComponent> {
        self.slots.get_mut(entity).and_then(|map| map.remove(name))
    }

    pub fn clear(&mut self, entity: EntityId) {
        self.slots.reset(entity);
    }

    fn take(&mut self, entity: EntityId) -> EffectMap {
        self.slots
            .get_mut(entity)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    fn restore(&mut self, entity: EntityId, map: EffectMap) {
        if let Some(slot) = self.slots.get_mut(entity) {
            // Keep anything attached while the map was taken out.
            let attached = std::mem::replace(slot, map);
            slot.extend(attached);
        }
    }
}

/// Ticks every effect on every active entity.
pub struct EffectSystem;

impl EffectSystem {
    fn tick_entity(entity: EntityId, world: &mut World) {
        let mut effects = world.effects.take(entity);
        if effects.is_empty() {
            return;
        }

        effects.retain(|_, effect| match effect.duration {
            EffectDuration::Temporary => {
                effect.timer.current -= effect.timer.dt;
                effect.timer.current > 0.0
            }
            EffectDuration::Constant => true,
        });

        let mut names: Vec<&String> = effects.keys().collect();
        names.sort();
        let order: Vec<EffectKind> = names.iter().map(|name| effects[*name].kind).collect();
        for kind in order {
            if !world.is_active(entity) {
                break;
            }
            kind.apply(entity, world);
        }

        if !world.is_active(entity) {
            return;
        }
        if effects.is_empty() {
            // Last effect wore off
            if let Some(renderer) = world.manager.renderer_mut(entity) {
                renderer.color = renderer.base_color;
            }
        }
        world.effects.restore(entity, effects);
    }
}

impl System<World> for EffectSystem {
    fn run(&mut self, world: &mut World) {
        let entities = world.manager.live_entities().to_vec();
        for entity in entities {
            if world.is_active(entity) {
                Self::tick_entity(entity, world);
            }
        }
    }

    fn name(&self) -> &'static str {
        "EffectSystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::factory::{self, SpawnDesc};
    use glam::Vec2;

    fn world() -> World {
        World::new(SimulationConfig {
            entity_capacity: 64,
            ..Default::default()
        })
        .unwrap()
    }

    fn monster(world: &mut World, health: f32) -> EntityId {
        let id = factory::create_ai(
            world,
            &SpawnDesc::new("Beast", Vec3::ZERO, Vec2::splat(16.0)),
            "Monster1",
        )
        .unwrap();
        world.manager.health_mut(id).unwrap().health = health;
        id
    }

    #[test]
    fn test_attach_last_write_wins() {
        let mut world = world();
        let e = monster(&mut world, 50.0);
        world.effects.attach(e, EffectComponent::temporary(EffectKind::Poison, 1.0, 0.1, e));
        world.effects.attach(e, EffectComponent::temporary(EffectKind::Poison, 5.0, 0.1, e));
        assert_eq!(world.effects.count(e), 1);
        assert_eq!(world.effects.get(e, "Poison").unwrap().timer.current, 5.0);
    }

    #[test]
    fn test_temporary_effect_expires() {
        let mut world = world();
        let e = monster(&mut world, 50.0);
        world.effects.attach(e, EffectComponent::temporary(EffectKind::Poison, 0.75, 0.25, e));

        let mut system = EffectSystem;
        system.run(&mut world);
        system.run(&mut world);
        assert!(world.effects.has(e, "Poison"));
        let health = world.manager.health(e).unwrap().health;
        assert!(health < 50.0);

        system.run(&mut world);
        assert!(!world.effects.has(e, "Poison"));
        // The expiring tick does not apply.
        assert_eq!(world.manager.health(e).unwrap().health, health);
        let renderer = world.manager.renderer(e).unwrap();
        assert_eq!(renderer.color, renderer.base_color);
    }

    #[test]
    fn test_constant_effect_never_expires() {
        let mut world = world();
        let e = monster(&mut world, 1000.0);
        world.effects.attach(e, EffectComponent::constant(EffectKind::Burn, 0.1, e));
        let mut system = EffectSystem;
        for _ in 0..50 {
            system.run(&mut world);
        }
        assert!(world.effects.has(e, "Burn"));
        assert_eq!(world.manager.renderer(e).unwrap().color, Color::ORANGE);
    }

    #[test]
    fn test_cold_stops_movement() {
        let mut world = world();
        let e = monster(&mut world, 50.0);
        world.manager.transform_mut(e).unwrap().velocity = Vec3::new(3.0, 1.0, 0.0);
        world.effects.attach(e, EffectComponent::temporary(EffectKind::Cold, 1.0, 0.1, e));
        EffectSystem.run(&mut world);
        assert_eq!(world.manager.transform(e).unwrap().velocity, Vec3::ZERO);
        assert_eq!(world.manager.renderer(e).unwrap().color, Color::BLUE);
    }

    #[test]
    fn test_lethal_effect_kills() {
        let mut world = world();
        let e = monster(&mut world, 0.05);
        world.effects.attach(e, EffectComponent::temporary(EffectKind::Burn, 1.0, 0.1, e));
        EffectSystem.run(&mut world);
        assert!(!world.is_active(e));
        world.flush_removals();
        assert!(!world.manager.is_alive(e));
        assert_eq!(world.effects.count(e), 0);
    }

    #[test]
    fn test_independent_effects_stack_by_name() {
        let mut world = world();
        let e = monster(&mut world, 50.0);
        world.effects.attach(e, EffectComponent::temporary(EffectKind::Poison, 1.0, 0.1, e));
        world.effects.attach(e, EffectComponent::temporary(EffectKind::Cold, 1.0, 0.1, e));
        EffectSystem.run(&mut world);
        assert_eq!(world.effects.count(e), 2);
        let expected = 50.0 - EffectKind::Poison.damage_per_tick() - EffectKind::Cold.damage_per_tick();
        assert!((world.manager.health(e).unwrap().health - expected).abs() < 1e-4);
    }
}
