//! Named weapon and loot profiles
//!
//! Profiles are immutable records owned by a [`ProfileRegistry`]. Entities
//! hold a [`WeaponProfileId`] / [`LootProfileId`] index into it, never a
//! reference. Lookups by an unknown name fall back to the built-in
//! `"Default"` weapon or `"Monster1"` loot profile.

use std::collections::HashMap;
use std::path::Path;

use enjon_ecs::{AttributeMask, LootProfileId, WeaponProfileId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::effect::EffectKind;
use crate::error::GameError;

pub const DEFAULT_WEAPON: &str = "Default";
pub const DEFAULT_LOOT: &str = "Monster1";

/// How a weapon delivers its damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Melee,
    Projectile,
    Grenade,
    Explosive,
    Vortex,
}

impl WeaponKind {
    /// Attribute bits an entity of this kind carries on top of `WEAPON`
    pub fn attributes(self) -> AttributeMask {
        match self {
            Self::Melee => AttributeMask::MELEE,
            Self::Projectile => AttributeMask::PROJECTILE,
            Self::Grenade => AttributeMask::PROJECTILE | AttributeMask::GRENADE,
            Self::Explosive => AttributeMask::EXPLOSIVE,
            Self::Vortex => AttributeMask::VORTEX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponProfile {
    pub name: String,
    pub kind: WeaponKind,
    pub damage_min: i32,
    pub damage_max: i32,
    /// How far the hit box extends along the attack direction
    pub reach: f32,
    /// Half-width of the hit box across the attack direction
    pub spread: f32,
    /// Hit box covers every direction at once
    pub omnidirectional: bool,
    pub effect: Option<EffectKind>,
    /// Probability that a hit attaches `effect`
    pub effect_chance: f32,
    /// Velocity added to the victim, away from the hit
    pub knockback: f32,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_WEAPON.to_string(),
            kind: WeaponKind::Melee,
            damage_min: 1,
            damage_max: 3,
            reach: 32.0,
            spread: 16.0,
            omnidirectional: false,
            effect: None,
            effect_chance: 0.0,
            knockback: 1.0,
        }
    }
}

impl WeaponProfile {
    fn builtin(name: &str, kind: WeaponKind, damage: (i32, i32)) -> Self {
        Self {
            name: name.to_string(),
            kind,
            damage_min: damage.0,
            damage_max: damage.1,
            ..Default::default()
        }
    }
}

/// Drop table rolled when a monster dies.
///
/// Rarity rates are probabilities checked in order Legendary, Rare, Magic,
/// Uncommon, Common against a running sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootProfile {
    pub name: String,
    pub num_drops: u32,
    pub chance_to_drop: f32,
    pub legend_rate: f32,
    pub rare_rate: f32,
    pub magic_rate: f32,
    pub uncommon_rate: f32,
    pub common_rate: f32,
}

impl Default for LootProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOOT.to_string(),
            num_drops: 3,
            chance_to_drop: 0.5,
            legend_rate: 0.01,
            rare_rate: 0.04,
            magic_rate: 0.15,
            uncommon_rate: 0.3,
            common_rate: 0.5,
        }
    }
}

/// On-disk layout of a profile table
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileTable {
    pub weapons: Vec<WeaponProfile>,
    pub loot: Vec<LootProfile>,
}

pub struct ProfileRegistry {
    weapons: Vec<WeaponProfile>,
    loot: Vec<LootProfile>,
    weapon_index: HashMap<String, WeaponProfileId>,
    loot_index: HashMap<String, LootProfileId>,
}

impl ProfileRegistry {
    /// Registry holding the built-in profiles
    pub fn new() -> Self {
        let mut registry = Self {
            weapons: Vec::new(),
            loot: Vec::new(),
            weapon_index: HashMap::new(),
            loot_index: HashMap::new(),
        };

        registry.register_weapon(WeaponProfile::default());
        registry.register_weapon(WeaponProfile {
            effect: Some(EffectKind::Poison),
            effect_chance: 0.2,
            ..WeaponProfile::builtin("Dagger", WeaponKind::Melee, (2, 5))
        });
        registry.register_weapon(WeaponProfile {
            reach: 40.0,
            omnidirectional: true,
            effect: Some(EffectKind::Cold),
            effect_chance: 0.2,
            knockback: 3.0,
            ..WeaponProfile::builtin("Axe", WeaponKind::Melee, (4, 8))
        });
        registry.register_weapon(WeaponProfile::builtin("Arrow", WeaponKind::Projectile, (5, 10)));
        registry.register_weapon(WeaponProfile::builtin("Grenade", WeaponKind::Grenade, (0, 0)));
        registry.register_weapon(WeaponProfile {
            effect: Some(EffectKind::Burn),
            effect_chance: 0.2,
            knockback: 4.0,
            ..WeaponProfile::builtin("Explosion", WeaponKind::Explosive, (1, 3))
        });
        registry.register_weapon(WeaponProfile::builtin("Vortex", WeaponKind::Vortex, (0, 0)));

        registry.register_loot(LootProfile::default());
        registry.register_loot(LootProfile {
            name: "Elite".to_string(),
            num_drops: 5,
            chance_to_drop: 0.8,
            legend_rate: 0.05,
            rare_rate: 0.15,
            ..Default::default()
        });

        registry
    }

    /// Add a profile, replacing any existing profile with the same name in place
    pub fn register_weapon(&mut self, profile: WeaponProfile) -> WeaponProfileId {
        if let Some(&id) = self.weapon_index.get(&profile.name) {
            self.weapons[id.0 as usize] = profile;
            return id;
        }
        let id = WeaponProfileId(self.weapons.len() as u32);
        self.weapon_index.insert(profile.name.clone(), id);
        self.weapons.push(profile);
        id
    }

    pub fn register_loot(&mut self, profile: LootProfile) -> LootProfileId {
        if let Some(&id) = self.loot_index.get(&profile.name) {
            self.loot[id.0 as usize] = profile;
            return id;
        }
        let id = LootProfileId(self.loot.len() as u32);
        self.loot_index.insert(profile.name.clone(), id);
        self.loot.push(profile);
        id
    }

    pub fn weapon(&self, id: WeaponProfileId) -> Option<&WeaponProfile> {
        self.weapons.get(id.0 as usize)
    }

    pub fn loot(&self, id: LootProfileId) -> Option<&LootProfile> {
        self.loot.get(id.0 as usize)
    }

    /// Resolve a weapon profile by name, falling back to `"Default"`.
    pub fn weapon_by_name(&self, name: &str) -> WeaponProfileId {
        if let Some(&id) = self.weapon_index.get(name) {
            return id;
        }
        warn!("Unknown weapon profile '{}', using {}", name, DEFAULT_WEAPON);
        self.weapon_index
            .get(DEFAULT_WEAPON)
            .copied()
            .unwrap_or(WeaponProfileId(0))
    }

    /// Resolve a loot profile by name, falling back to `"Monster1"`.
    pub fn loot_by_name(&self, name: &str) -> LootProfileId {
        if let Some(&id) = self.loot_index.get(name) {
            return id;
        }
        warn!("Unknown loot profile '{}', using {}", name, DEFAULT_LOOT);
        self.loot_index
            .get(DEFAULT_LOOT)
            .copied()
            .unwrap_or(LootProfileId(0))
    }

    pub fn weapon_count(&self) -> usize {
        self.weapons.len()
    }

    pub fn loot_count(&self) -> usize {
        self.loot.len()
    }

    /// Merge a JSON profile table over the current profiles.
    pub fn merge_json(&mut self, json: &str) -> Result<usize, GameError> {
        let table: ProfileTable = serde_json::from_str(json)?;
        let count = table.weapons.len() + table.loot.len();
        for weapon in table.weapons {
            self.register_weapon(weapon);
        }
        for loot in table.loot {
            self.register_loot(loot);
        }
        Ok(count)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<usize, GameError> {
        let content = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let count = self.merge_json(&content)?;
        info!("Loaded {} profiles from {:?}", count, path);
        Ok(count)
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        let table = ProfileTable {
            weapons: self.weapons.clone(),
            loot: self.loot.clone(),
        };
        Ok(serde_json::to_string_pretty(&table)?)
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_resolve_by_name() {
        let registry = ProfileRegistry::new();
        let arrow = registry.weapon(registry.weapon_by_name("Arrow")).unwrap();
        assert_eq!(arrow.kind, WeaponKind::Projectile);
        assert_eq!((arrow.damage_min, arrow.damage_max), (5, 10));
        assert_eq!(registry.loot(registry.loot_by_name("Elite")).unwrap().num_drops, 5);
    }

    #[test]
    fn unknown_names_fall_back() {
        let registry = ProfileRegistry::new();
        let weapon = registry.weapon(registry.weapon_by_name("Trident")).unwrap();
        assert_eq!(weapon.name, DEFAULT_WEAPON);
        let loot = registry.loot(registry.loot_by_name("Dragon")).unwrap();
        assert_eq!(loot.name, DEFAULT_LOOT);
    }

    #[test]
    fn re_registering_replaces_in_place() {
        let mut registry = ProfileRegistry::new();
        let before = registry.weapon_by_name("Arrow");
        let count = registry.weapon_count();
        let id = registry.register_weapon(WeaponProfile {
            damage_max: 99,
            ..WeaponProfile::builtin("Arrow", WeaponKind::Projectile, (5, 10))
        });
        assert_eq!(id, before);
        assert_eq!(registry.weapon_count(), count);
        assert_eq!(registry.weapon(id).unwrap().damage_max, 99);
    }

    #[test]
    fn merge_json_adds_and_overrides() {
        let mut registry = ProfileRegistry::new();
        let json = r#"{
            "weapons": [{ "name": "Spear", "damage_min": 3, "damage_max": 6, "reach": 64.0 }],
            "loot": [{ "name": "Monster1", "num_drops": 1 }]
        }"#;
        assert_eq!(registry.merge_json(json).unwrap(), 2);
        let spear = registry.weapon(registry.weapon_by_name("Spear")).unwrap();
        assert_eq!(spear.reach, 64.0);
        assert_eq!(spear.kind, WeaponKind::Melee);
        assert_eq!(registry.loot(registry.loot_by_name("Monster1")).unwrap().num_drops, 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut registry = ProfileRegistry::new();
        assert!(matches!(
            registry.merge_json("{ weapons: "),
            Err(GameError::ProfileParse(_))
        ));
    }

    #[test]
    fn json_round_trip_preserves_registry() {
        let registry = ProfileRegistry::new();
        let json = registry.to_json().unwrap();
        let mut other = ProfileRegistry::new();
        other.merge_json(&json).unwrap();
        assert_eq!(other.weapon_count(), registry.weapon_count());
        assert_eq!(other.loot_count(), registry.loot_count());
    }

    #[test]
    fn grenade_kind_carries_projectile_bit() {
        let bits = WeaponKind::Grenade.attributes();
        assert!(bits.contains(AttributeMask::PROJECTILE | AttributeMask::GRENADE));
    }
}
