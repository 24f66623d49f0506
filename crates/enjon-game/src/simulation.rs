//! Fixed-order tick driver
//!
//! One tick runs Input, AI, Transform, Collision, Effects and Status in that
//! order. Removals queued by a stage are flushed before the next stage starts.

use enjon_ecs::{System, SystemSchedule};
use tracing::info;

use crate::ai::AiSystem;
use crate::collision::CollisionSystem;
use crate::config::SimulationConfig;
use crate::effect::EffectSystem;
use crate::error::GameError;
use crate::input::InputSystem;
use crate::status::StatusSystem;
use crate::transform::TransformSystem;
use crate::world::World;

pub struct Simulation {
    pub world: World,
    schedule: SystemSchedule<World>,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, GameError> {
        Ok(Self::with_world(World::new(config)?))
    }

    /// Wrap an existing world with the standard system order.
    pub fn with_world(world: World) -> Self {
        let mut schedule = SystemSchedule::new();
        schedule.add_system(InputSystem::default());
        schedule.add_system(AiSystem::seek(world.config.ai_aggro_range, world.dt()));
        schedule.add_system(TransformSystem);
        schedule.add_system(CollisionSystem::new(world.config.pair_table_limit));
        schedule.add_system(EffectSystem);
        schedule.add_system(StatusSystem);
        info!("Simulation schedule: {}", schedule.names().join(" -> "));

        Self {
            world,
            schedule,
            ticks: 0,
        }
    }

    /// Replace the schedule, e.g. to add a custom behavior tree or a debug system.
    pub fn with_schedule(world: World, schedule: SystemSchedule<World>) -> Self {
        Self {
            world,
            schedule,
            ticks: 0,
        }
    }

    pub fn add_system<S: System<World> + 'static>(&mut self, system: S) {
        self.schedule.add_system(system);
    }

    pub fn tick(&mut self) {
        self.schedule.run_all_with(&mut self.world, |world| {
            world.flush_removals();
        });
        self.ticks += 1;
    }

    pub fn run_ticks(&mut self, count: u32) {
        for _ in 0..count {
            self.tick();
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.schedule.names()
    }
}
