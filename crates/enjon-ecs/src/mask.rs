//! Bit masks carried per entity
//!
//! `ComponentMask` says which component arrays hold live data for an entity.
//! `AttributeMask` is independent of it and encodes gameplay type and state.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use serde::{Deserialize, Serialize};

macro_rules! impl_mask_ops {
    ($mask:ident, $bits:ty) => {
        impl $mask {
            pub const fn from_bits(bits: $bits) -> Self {
                Self(bits)
            }

            pub const fn bits(self) -> $bits {
                self.0
            }

            /// All bits of `other` are set in `self`
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Any bit of `other` is set in `self`
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            pub fn set(&mut self, other: Self, value: bool) {
                if value {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }
        }

        impl BitOr for $mask {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $mask {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $mask {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl Not for $mask {
            type Output = Self;
            fn not(self) -> Self {
                Self(!self.0)
            }
        }

        impl fmt::Debug for $mask {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#x})", stringify!($mask), self.0)
            }
        }
    };
}

/// Which component slots an entity owns. Empty means the entity is free.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ComponentMask(u32);

impl ComponentMask {
    pub const NONE: Self = Self(0);
    pub const TRANSFORM3D: Self = Self(1 << 0);
    pub const RENDERER2D: Self = Self(1 << 1);
    pub const ANIMATION2D: Self = Self(1 << 2);
    pub const PLAYERCONTROLLER: Self = Self(1 << 3);
    pub const AICONTROLLER: Self = Self(1 << 4);
    pub const HEALTH: Self = Self(1 << 5);
    pub const INVENTORY: Self = Self(1 << 6);
    pub const LABEL: Self = Self(1 << 7);

    /// Every component kind the manager knows about
    pub const ALL: Self = Self((1 << 8) - 1);
}

impl_mask_ops!(ComponentMask, u32);

/// Gameplay type bits OR'd with option flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AttributeMask(u64);

impl AttributeMask {
    pub const NONE: Self = Self(0);

    // Types
    pub const PLAYER: Self = Self(1 << 0);
    pub const AI: Self = Self(1 << 1);
    pub const ITEM: Self = Self(1 << 2);
    pub const WEAPON: Self = Self(1 << 3);
    pub const PROP: Self = Self(1 << 4);

    // Options
    pub const COLLIDABLE: Self = Self(1 << 16);
    pub const EQUIPPED: Self = Self(1 << 17);
    pub const PICKED_UP: Self = Self(1 << 18);
    pub const DAMAGED: Self = Self(1 << 19);
    pub const RISING: Self = Self(1 << 20);
    pub const EXPLODED: Self = Self(1 << 21);
    pub const DEBRIS: Self = Self(1 << 22);

    // Weapon sub-kinds
    pub const MELEE: Self = Self(1 << 32);
    pub const PROJECTILE: Self = Self(1 << 33);
    pub const EXPLOSIVE: Self = Self(1 << 34);
    pub const GRENADE: Self = Self(1 << 35);
    pub const VORTEX: Self = Self(1 << 36);

    pub const TYPES: Self = Self(0xFFFF);
    pub const WEAPON_KINDS: Self = Self(0x1F << 32);

    /// Only the type bits
    pub const fn entity_type(self) -> Self {
        Self(self.0 & Self::TYPES.0)
    }
}

impl_mask_ops!(AttributeMask, u64);
