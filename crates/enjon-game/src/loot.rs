//! Loot rarity and drops

use enjon_core::Color;
use enjon_ecs::{EntityId, LootProfileId};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::factory::{self, SpawnDesc};
use crate::profile::LootProfile;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Legendary,
    Rare,
    Magic,
    Uncommon,
    Common,
}

impl Rarity {
    pub fn name(self) -> &'static str {
        match self {
            Self::Legendary => "Legendary",
            Self::Rare => "Rare",
            Self::Magic => "Magic",
            Self::Uncommon => "Uncommon",
            Self::Common => "Common",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Legendary => Color::ORANGE,
            Self::Rare => Color::YELLOW,
            Self::Magic => Color::BLUE,
            Self::Uncommon => Color::GREEN,
            Self::Common => Color::GREY,
        }
    }
}

/// Pick a tier for a uniform roll in `[0, 1]`.
///
/// Rates accumulate from Legendary down; the first running total above
/// `roll` wins and anything past the last threshold is Common.
pub fn select_rarity(profile: &LootProfile, roll: f32) -> Rarity {
    let tiers = [
        (Rarity::Legendary, profile.legend_rate),
        (Rarity::Rare, profile.rare_rate),
        (Rarity::Magic, profile.magic_rate),
        (Rarity::Uncommon, profile.uncommon_rate),
        (Rarity::Common, profile.common_rate),
    ];
    let mut threshold = 0.0;
    for (rarity, rate) in tiers {
        threshold += rate.max(0.0);
        if roll < threshold {
            return rarity;
        }
    }
    Rarity::Common
}

/// Roll a loot profile and spawn the resulting items around `position` (iso).
pub fn drop_loot(world: &mut World, position: Vec3, profile: LootProfileId) -> Vec<EntityId> {
    let Some(profile) = world.profiles.loot(profile).cloned() else {
        warn!("Missing loot profile {:?}, no drops", profile);
        return Vec::new();
    };

    let scatter = world.config.loot_scatter;
    let mut dropped = Vec::new();
    for _ in 0..profile.num_drops {
        if !world.dice.chance(profile.chance_to_drop) {
            continue;
        }
        let rarity = select_rarity(&profile, world.dice.roll_unit());
        let offset = Vec2::new(world.dice.roll_offset(scatter), world.dice.roll_offset(scatter));
        let desc = SpawnDesc::new(
            &format!("{} Item", rarity.name()),
            Vec3::new(position.x + offset.x, position.y + offset.y, 0.0),
            Vec2::splat(8.0),
        )
        .with_color(rarity.color());

        match factory::create_item(world, &desc) {
            Ok(item) => dropped.push(item),
            Err(e) => {
                warn!("Loot drop failed: {}", e);
                break;
            }
        }
    }
    debug!("Dropped {} items from {}", dropped.len(), profile.name);
    dropped
}
