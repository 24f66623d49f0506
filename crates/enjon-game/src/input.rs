//! Input system with action-based mapping
//!
//! The host fills an [`InputSnapshot`] with the keys held this tick and the
//! cursor position. [`InputBindings`] turns key names into actions, and
//! [`InputSystem`] drives every player controller from them.

use std::collections::{HashMap, HashSet};

use enjon_core::iso_to_cartesian;
use enjon_ecs::{ComponentMask, EntityId, System};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::world::World;

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Move up the screen (W by default)
    MoveUp,
    /// Move down the screen (S by default)
    MoveDown,
    /// Move left (A by default)
    MoveLeft,
    /// Move right (D by default)
    MoveRight,
    /// Swing the equipped weapon (Space or left mouse by default)
    Attack,
    /// Sprint modifier (Shift by default)
    Sprint,
}

/// Raw input for one tick
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    /// Names of keys and buttons held down, e.g. `"W"` or `"Mouse0"`
    pub held: HashSet<String>,
    /// Cursor in cartesian world space
    pub mouse_world: Option<Vec2>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.held.insert(key.to_string());
    }

    pub fn release(&mut self, key: &str) {
        self.held.remove(key);
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.mouse_world = None;
    }
}

/// Maps key names to game actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputBindings {
    bindings: HashMap<String, InputAction>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
        };

        bindings.bind("W", InputAction::MoveUp);
        bindings.bind("S", InputAction::MoveDown);
        bindings.bind("A", InputAction::MoveLeft);
        bindings.bind("D", InputAction::MoveRight);

        bindings.bind("Up", InputAction::MoveUp);
        bindings.bind("Down", InputAction::MoveDown);
        bindings.bind("Left", InputAction::MoveLeft);
        bindings.bind("Right", InputAction::MoveRight);

        bindings.bind("Space", InputAction::Attack);
        bindings.bind("Mouse0", InputAction::Attack);
        bindings.bind("LShift", InputAction::Sprint);
        bindings.bind("RShift", InputAction::Sprint);

        bindings
    }
}

impl InputBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action, replacing any previous binding for that key
    pub fn bind(&mut self, key: &str, action: InputAction) {
        self.bindings.insert(key.to_string(), action);
    }

    pub fn unbind(&mut self, key: &str) {
        self.bindings.remove(key);
    }

    /// Get the action for a key, if any
    pub fn action_for(&self, key: &str) -> Option<InputAction> {
        self.bindings.get(key).copied()
    }

    /// Every action triggered by the held keys
    pub fn actions(&self, snapshot: &InputSnapshot) -> HashSet<InputAction> {
        snapshot
            .held
            .iter()
            .filter_map(|key| self.action_for(key))
            .collect()
    }
}

/// Screen-space direction of the held movement actions, normalized
pub fn movement_direction(actions: &HashSet<InputAction>) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if actions.contains(&InputAction::MoveUp) {
        direction.y += 1.0;
    }
    if actions.contains(&InputAction::MoveDown) {
        direction.y -= 1.0;
    }
    if actions.contains(&InputAction::MoveLeft) {
        direction.x -= 1.0;
    }
    if actions.contains(&InputAction::MoveRight) {
        direction.x += 1.0;
    }
    direction.normalize_or_zero()
}

#[derive(Debug, Clone, Default)]
pub struct InputSystem {
    pub bindings: InputBindings,
}

impl InputSystem {
    pub fn new(bindings: InputBindings) -> Self {
        Self { bindings }
    }

    fn drive(&self, world: &mut World, player: EntityId, actions: &HashSet<InputAction>) {
        let direction = movement_direction(actions);
        let sprinting = actions.contains(&InputAction::Sprint);
        let attacking = actions.contains(&InputAction::Attack);
        let multiplier = if sprinting {
            world.config.sprint_multiplier
        } else {
            1.0
        };
        let mouse = world.input.mouse_world;

        let Some(controller) = world.manager.player_controller_mut(player) else {
            return;
        };
        controller.sprinting = sprinting;
        controller.attacking = attacking;
        let speed = controller.speed * multiplier;

        let Some(transform) = world.manager.transform_mut(player) else {
            return;
        };
        let goal = direction * speed;
        transform.velocity_goal.x = goal.x;
        transform.velocity_goal.y = goal.y;
        if direction != Vec2::ZERO {
            transform.view_vector = iso_to_cartesian(direction).normalize_or_zero();
        }
        transform.attack_vector = match mouse {
            Some(cursor) => (cursor - transform.cartesian_position)
                .try_normalize()
                .unwrap_or(transform.view_vector),
            None => transform.view_vector,
        };
    }
}

impl System<World> for InputSystem {
    fn run(&mut self, world: &mut World) {
        let actions = self.bindings.actions(&world.input);
        let players: Vec<EntityId> = world
            .manager
            .live_entities()
            .iter()
            .copied()
            .filter(|&id| {
                world.is_active(id)
                    && world
                        .manager
                        .has_components(id, ComponentMask::PLAYERCONTROLLER | ComponentMask::TRANSFORM3D)
            })
            .collect();
        for player in players {
            self.drive(world, player, &actions);
        }
    }

    fn name(&self) -> &'static str {
        "InputSystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::factory::{self, SpawnDesc};
    use glam::Vec3;

    fn setup() -> (World, EntityId) {
        let mut world = World::new(SimulationConfig {
            entity_capacity: 16,
            ..Default::default()
        })
        .unwrap();
        let player =
            factory::create_player(&mut world, &SpawnDesc::new("Hero", Vec3::ZERO, Vec2::splat(16.0)))
                .unwrap();
        (world, player)
    }

    #[test]
    fn test_default_bindings() {
        let bindings = InputBindings::default();
        assert_eq!(bindings.action_for("W"), Some(InputAction::MoveUp));
        assert_eq!(bindings.action_for("Space"), Some(InputAction::Attack));
        assert_eq!(bindings.action_for("F12"), None);
    }

    #[test]
    fn test_rebind() {
        let mut bindings = InputBindings::default();
        bindings.bind("W", InputAction::Sprint);
        bindings.unbind("S");
        assert_eq!(bindings.action_for("W"), Some(InputAction::Sprint));
        assert_eq!(bindings.action_for("S"), None);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let bindings = InputBindings::default();
        let mut snapshot = InputSnapshot::new();
        snapshot.press("A");
        snapshot.press("D");
        assert_eq!(movement_direction(&bindings.actions(&snapshot)), Vec2::ZERO);

        snapshot.press("W");
        assert_eq!(movement_direction(&bindings.actions(&snapshot)), Vec2::Y);
    }

    #[test]
    fn test_sprint_scales_velocity_goal() {
        let (mut world, player) = setup();
        world.input.press("D");
        world.input.press("LShift");
        InputSystem::default().run(&mut world);

        let expected = world.config.player_speed * world.config.sprint_multiplier;
        let t = world.manager.transform(player).unwrap();
        assert!((t.velocity_goal.x - expected).abs() < 1e-5);
        assert_eq!(t.velocity_goal.y, 0.0);
        assert!(world.manager.player_controller(player).unwrap().sprinting);
    }

    #[test]
    fn test_attack_aims_at_cursor() {
        let (mut world, player) = setup();
        world.input.press("Space");
        world.input.mouse_world = Some(Vec2::new(0.0, -50.0));
        InputSystem::default().run(&mut world);

        assert!(world.manager.player_controller(player).unwrap().attacking);
        let attack = world.manager.transform(player).unwrap().attack_vector;
        assert!((attack - Vec2::new(0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_release_stops_player() {
        let (mut world, player) = setup();
        let mut system = InputSystem::default();
        world.input.press("W");
        system.run(&mut world);
        world.input.release("W");
        system.run(&mut world);
        let t = world.manager.transform(player).unwrap();
        assert_eq!(t.velocity_goal.truncate(), Vec2::ZERO);
        assert!(!world.manager.player_controller(player).unwrap().attacking);
    }
}
