//! Simulation tuning
//!
//! Every value has a default so a partial (or empty) TOML file is valid.
//! Velocities are in world units per tick; durations are in seconds and
//! count down by `timestep` once per tick.

use enjon_core::Aabb;
use enjon_ecs::MAX_ENTITIES;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cartesian lower corner of the playable area
    pub world_min: Vec2,
    /// Cartesian upper corner of the playable area
    pub world_max: Vec2,
    pub cell_size: f32,
    pub entity_capacity: usize,
    /// Seconds per tick, used as `dt` for every timer
    pub timestep: f32,
    pub gravity: f32,
    pub grenade_rise_speed: f32,
    /// Largest per-tick change of a velocity component while easing toward its goal
    pub ease_step: f32,
    /// Velocity multiplier applied when bouncing off the level edge
    pub bounce_damping: f32,
    /// Cartesian distance at which loose items become pickup candidates
    pub item_pickup_range: f32,
    /// Pair-dedup entries kept before the table is cleared wholesale
    pub pair_table_limit: usize,
    pub effect_duration: f32,
    pub damage_flash: f32,
    pub player_health: f32,
    pub player_speed: f32,
    pub sprint_multiplier: f32,
    pub ai_health: f32,
    pub ai_speed: f32,
    pub ai_aggro_range: f32,
    /// Damage a player takes on touching an enemy, gated by the hit flash
    pub contact_damage: f32,
    pub projectile_lifetime: f32,
    pub explosion_radius: f32,
    pub explosion_lifetime: f32,
    pub vortex_radius: f32,
    pub vortex_lifetime: f32,
    pub vortex_strength: f32,
    pub debris_count: u32,
    pub debris_lifetime: f32,
    pub debris_speed: f32,
    /// Half-width of the square around a corpse that loot lands in
    pub loot_scatter: f32,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_min: Vec2::splat(-1024.0),
            world_max: Vec2::splat(1024.0),
            cell_size: 64.0,
            entity_capacity: MAX_ENTITIES,
            timestep: 1.0 / 60.0,
            gravity: 0.5,
            grenade_rise_speed: 2.0,
            ease_step: 0.5,
            bounce_damping: 0.6,
            item_pickup_range: 64.0,
            pair_table_limit: 100_000,
            effect_duration: 3.0,
            damage_flash: 0.1,
            player_health: 100.0,
            player_speed: 4.0,
            sprint_multiplier: 1.5,
            ai_health: 60.0,
            ai_speed: 2.0,
            ai_aggro_range: 400.0,
            contact_damage: 2.0,
            projectile_lifetime: 2.0,
            explosion_radius: 48.0,
            explosion_lifetime: 0.5,
            vortex_radius: 96.0,
            vortex_lifetime: 3.0,
            vortex_strength: 0.8,
            debris_count: 4,
            debris_lifetime: 1.0,
            debris_speed: 3.0,
            loot_scatter: 64.0,
            seed: 0x5EED,
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, GameError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject NaN or infinite tuning values before they reach the dice or the grid.
    pub fn validate(&self) -> Result<(), GameError> {
        let fields = [
            ("world_min.x", self.world_min.x),
            ("world_min.y", self.world_min.y),
            ("world_max.x", self.world_max.x),
            ("world_max.y", self.world_max.y),
            ("cell_size", self.cell_size),
            ("timestep", self.timestep),
            ("gravity", self.gravity),
            ("grenade_rise_speed", self.grenade_rise_speed),
            ("ease_step", self.ease_step),
            ("bounce_damping", self.bounce_damping),
            ("item_pickup_range", self.item_pickup_range),
            ("effect_duration", self.effect_duration),
            ("damage_flash", self.damage_flash),
            ("player_health", self.player_health),
            ("player_speed", self.player_speed),
            ("sprint_multiplier", self.sprint_multiplier),
            ("ai_health", self.ai_health),
            ("ai_speed", self.ai_speed),
            ("ai_aggro_range", self.ai_aggro_range),
            ("contact_damage", self.contact_damage),
            ("projectile_lifetime", self.projectile_lifetime),
            ("explosion_radius", self.explosion_radius),
            ("explosion_lifetime", self.explosion_lifetime),
            ("vortex_radius", self.vortex_radius),
            ("vortex_lifetime", self.vortex_lifetime),
            ("vortex_strength", self.vortex_strength),
            ("debris_lifetime", self.debris_lifetime),
            ("debris_speed", self.debris_speed),
            ("loot_scatter", self.loot_scatter),
        ];
        match fields.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((field, value)) => Err(GameError::InvalidConfig { field, value }),
            None => Ok(()),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, GameError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn world_bounds(&self) -> Aabb {
        Aabb::from_corners(self.world_min, self.world_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config.pair_table_limit, 100_000);
        assert_eq!(config.entity_capacity, MAX_ENTITIES);
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = SimulationConfig::from_toml_str(
            "gravity = 1.25\nseed = 7\nworld_min = [-100.0, -50.0]\n",
        )
        .unwrap();
        assert_eq!(config.gravity, 1.25);
        assert_eq!(config.seed, 7);
        assert_eq!(config.world_bounds().min, Vec2::new(-100.0, -50.0));
        assert_eq!(config.cell_size, 64.0);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(SimulationConfig::from_toml_str("gravity = \"heavy\"").is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = SimulationConfig::from_toml_str("loot_scatter = nan\n").unwrap_err();
        assert!(matches!(
            err,
            GameError::InvalidConfig {
                field: "loot_scatter",
                ..
            }
        ));
        assert!(SimulationConfig::from_toml_str("world_max = [inf, 10.0]\n").is_err());

        let config = SimulationConfig {
            gravity: f32::NEG_INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn toml_round_trip() {
        let config = SimulationConfig {
            debris_count: 9,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        let back = SimulationConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.debris_count, 9);
    }
}
