//! AI controller surface
//!
//! Each AI entity carries a [`Blackboard`]. Once per tick [`AiSystem`] copies
//! the entity's position into it, lets a [`BehaviorTree`] read the manager
//! and write a velocity goal, and hands that goal to the transform.

use enjon_core::Timer;
use enjon_ecs::{AttributeMask, Blackboard, ComponentMask, EntityId, EntityManager, System};
use glam::Vec3;

use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorStatus {
    Running,
    Success,
    Failure,
}

/// Decision logic evaluated against one AI's blackboard
pub trait BehaviorTree: Send + Sync {
    fn tick(&mut self, blackboard: &mut Blackboard, manager: &EntityManager) -> BehaviorStatus;
}

/// Chase the nearest player inside `aggro_range`.
///
/// The target is rescanned whenever the blackboard timer runs out, so an AI
/// keeps heading for the last known position in between.
#[derive(Debug, Clone)]
pub struct SeekTarget {
    /// Cartesian distance at which a player is noticed
    pub aggro_range: f32,
    pub retarget_interval: f32,
    pub dt: f32,
    /// Distance at which the AI stops pressing forward
    pub arrive_radius: f32,
}

impl SeekTarget {
    pub fn new(aggro_range: f32, dt: f32) -> Self {
        Self {
            aggro_range,
            retarget_interval: 0.25,
            dt,
            arrive_radius: 1.0,
        }
    }

    fn nearest_player(&self, from: Vec3, manager: &EntityManager) -> Option<Vec3> {
        let origin = enjon_core::iso_to_cartesian(from.truncate());
        manager
            .live_entities()
            .iter()
            .filter(|&&id| manager.attributes.has(id, AttributeMask::PLAYER))
            .filter_map(|&id| manager.transform(id))
            .map(|t| (t.position, t.cartesian_position.distance(origin)))
            .filter(|&(_, distance)| distance <= self.aggro_range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(position, _)| position)
    }
}

impl BehaviorTree for SeekTarget {
    fn tick(&mut self, blackboard: &mut Blackboard, manager: &EntityManager) -> BehaviorStatus {
        if blackboard.timer.tick() || blackboard.target_position.is_none() {
            blackboard.target_position = self.nearest_player(blackboard.position, manager);
            blackboard.timer = Timer::new(self.retarget_interval, self.dt);
        }

        let speed = manager
            .ai_controller(blackboard.entity)
            .map(|c| c.speed)
            .unwrap_or_default();
        let Some(target) = blackboard.target_position else {
            blackboard.velocity_goal = Vec3::ZERO;
            return BehaviorStatus::Failure;
        };

        let offset = (target - blackboard.position).truncate();
        if offset.length() <= self.arrive_radius {
            blackboard.velocity_goal = Vec3::ZERO;
            return BehaviorStatus::Success;
        }
        blackboard.velocity_goal = (offset.normalize_or_zero() * speed).extend(0.0);
        BehaviorStatus::Running
    }
}

pub struct AiSystem {
    tree: Box<dyn BehaviorTree>,
}

impl AiSystem {
    pub fn new(tree: Box<dyn BehaviorTree>) -> Self {
        Self { tree }
    }

    pub fn seek(aggro_range: f32, dt: f32) -> Self {
        Self::new(Box::new(SeekTarget::new(aggro_range, dt)))
    }
}

impl System<World> for AiSystem {
    fn run(&mut self, world: &mut World) {
        let required = ComponentMask::AICONTROLLER | ComponentMask::TRANSFORM3D;
        let agents: Vec<EntityId> = world
            .manager
            .live_entities()
            .iter()
            .copied()
            .filter(|&id| world.is_active(id) && world.manager.has_components(id, required))
            .collect();

        for id in agents {
            let (Some(controller), Some(transform)) =
                (world.manager.ai_controller(id), world.manager.transform(id))
            else {
                continue;
            };
            let mut blackboard = controller.blackboard;
            blackboard.entity = id;
            blackboard.position = transform.position;

            self.tree.tick(&mut blackboard, &world.manager);

            let goal = blackboard.velocity_goal;
            if let Some(transform) = world.manager.transform_mut(id) {
                transform.velocity_goal.x = goal.x;
                transform.velocity_goal.y = goal.y;
            }
            if let Some(controller) = world.manager.ai_controller_mut(id) {
                controller.blackboard = blackboard;
            }
        }
    }

    fn name(&self) -> &'static str {
        "AiSystem"
    }
}
