//! Collision broad-phase driver and pair dispatch
//!
//! Each pass walks a snapshot of the candidates the transform system
//! registered, asks the grid for neighbours, and hands every new pair to the
//! resolver picked by the two entities' [`CollisionKind`]s.

mod resolve;

use std::collections::HashMap;

use enjon_ecs::{AttributeMask, EntityId, System};
use tracing::trace;

use crate::world::World;

pub use resolve::{resolve_pair, resolver_for, Resolver};

/// Gameplay class of an entity as far as collision is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollisionKind {
    Item,
    Weapon,
    Player,
    Enemy,
    Projectile,
    Explosive,
    Prop,
    Vortex,
}

impl CollisionKind {
    /// Derive the kind from type bits plus the weapon sub-kind.
    ///
    /// A weapon that is neither thrown, blasting nor equipped is lying on
    /// the ground and collides as an item.
    pub fn classify(mask: AttributeMask) -> Option<Self> {
        if mask.contains(AttributeMask::PLAYER) {
            Some(Self::Player)
        } else if mask.contains(AttributeMask::AI) {
            Some(Self::Enemy)
        } else if mask.contains(AttributeMask::WEAPON) {
            if mask.contains(AttributeMask::VORTEX) {
                Some(Self::Vortex)
            } else if mask.contains(AttributeMask::EXPLOSIVE) {
                Some(Self::Explosive)
            } else if mask.contains(AttributeMask::PROJECTILE) {
                Some(Self::Projectile)
            } else if mask.contains(AttributeMask::EQUIPPED) {
                Some(Self::Weapon)
            } else {
                Some(Self::Item)
            }
        } else if mask.contains(AttributeMask::ITEM) {
            Some(Self::Item)
        } else if mask.contains(AttributeMask::PROP) {
            Some(Self::Prop)
        } else {
            None
        }
    }
}

/// Remembers which loop last resolved each unordered pair.
///
/// Entries are never evicted individually; the whole table is dropped once it
/// grows past `limit`.
pub struct PairTable {
    resolved: HashMap<u64, u64>,
    limit: usize,
}

impl PairTable {
    pub fn new(limit: usize) -> Self {
        Self {
            resolved: HashMap::new(),
            limit,
        }
    }

    fn key(a: EntityId, b: EntityId) -> u64 {
        let (lo, hi) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
        ((lo as u64) << 32) | hi as u64
    }

    /// Record the pair for `loop_id`. Returns `false` if it was already recorded this loop.
    pub fn mark(&mut self, a: EntityId, b: EntityId, loop_id: u64) -> bool {
        if self.resolved.len() >= self.limit {
            trace!("Pair table reached {} entries, clearing", self.resolved.len());
            self.resolved.clear();
        }
        self.resolved.insert(Self::key(a, b), loop_id) != Some(loop_id)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Counters from one collision pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub candidates: usize,
    /// New pairs handed to dispatch
    pub pairs: usize,
    /// Pairs a resolver acted on
    pub resolved: usize,
}

pub struct CollisionSystem {
    pairs: PairTable,
    loop_id: u64,
}

impl CollisionSystem {
    pub fn new(pair_limit: usize) -> Self {
        Self {
            pairs: PairTable::new(pair_limit),
            loop_id: 0,
        }
    }

    pub fn loop_id(&self) -> u64 {
        self.loop_id
    }

    pub fn pair_table(&self) -> &PairTable {
        &self.pairs
    }

    /// Resolve every overlapping candidate pair once.
    pub fn run_pass(&mut self, world: &mut World) -> CollisionStats {
        self.loop_id += 1;
        let candidates = std::mem::take(&mut world.candidates);
        let mut stats = CollisionStats {
            candidates: candidates.len(),
            ..Default::default()
        };

        for &entity in &candidates {
            if !world.is_active(entity) {
                continue;
            }
            let Some(aabb) = world.manager.transform(entity).map(|t| t.aabb) else {
                continue;
            };
            for other in world.grid.find_cell(entity, &aabb) {
                if !world.is_active(entity) {
                    break;
                }
                if other == entity || !world.is_active(other) {
                    continue;
                }
                if !self.pairs.mark(entity, other, self.loop_id) {
                    continue;
                }
                stats.pairs += 1;
                if resolve_pair(world, entity, other) {
                    stats.resolved += 1;
                }
            }
        }

        world.candidates = candidates;
        stats
    }
}

impl System<World> for CollisionSystem {
    fn run(&mut self, world: &mut World) {
        let stats = self.run_pass(world);
        trace!(
            "Collision loop {}: {} candidates, {} pairs, {} resolved",
            self.loop_id,
            stats.candidates,
            stats.pairs,
            stats.resolved
        );
    }

    fn name(&self) -> &'static str {
        "CollisionSystem"
    }
}
