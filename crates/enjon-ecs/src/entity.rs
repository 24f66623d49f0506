use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of entity slots in a manager.
pub const MAX_ENTITIES: usize = 10_000;

/// An entity is a plain index into the manager's parallel component arrays.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Sentinel for "no entity" (unowned groups, empty weapon slot, ...).
pub const NULL_ENTITY: EntityId = EntityId(u32::MAX);

impl EntityId {
    /// The slot index of this entity.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_null(self) -> bool {
        self == NULL_ENTITY
    }
}

impl Default for EntityId {
    fn default() -> Self {
        NULL_ENTITY
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({})", self.0)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out ids from a fixed pool.
///
/// Allocation scans forward from the slot after the last allocation and wraps,
/// so a freshly released id is not handed back out until the scan comes round.
pub(crate) struct EntityAllocator {
    in_use: Box<[bool]>,
    live: Vec<EntityId>,
    next_available: usize,
    max_available: usize,
}

impl EntityAllocator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            in_use: vec![false; capacity].into_boxed_slice(),
            live: Vec::with_capacity(capacity),
            next_available: 0,
            max_available: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.in_use.len()
    }

    /// Reserve the next free slot, or `None` if every slot is taken.
    pub fn allocate(&mut self) -> Option<EntityId> {
        let capacity = self.capacity();
        if self.live.len() >= capacity {
            return None;
        }
        for offset in 0..capacity {
            let index = (self.next_available + offset) % capacity;
            if !self.in_use[index] {
                self.in_use[index] = true;
                self.next_available = (index + 1) % capacity;
                self.max_available = self.max_available.max(index + 1);
                let id = EntityId(index as u32);
                self.live.push(id);
                return Some(id);
            }
        }
        None
    }

    /// Release a slot. Returns `true` if it was in use.
    pub fn release(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.in_use.get_mut(id.index()) else {
            return false;
        };
        if !*slot {
            return false;
        }
        *slot = false;
        if let Some(pos) = self.live.iter().position(|&e| e == id) {
            self.live.remove(pos);
        }
        true
    }

    pub fn is_in_use(&self, id: EntityId) -> bool {
        self.in_use.get(id.index()).copied().unwrap_or(false)
    }

    /// Live ids in allocation order.
    pub fn live(&self) -> &[EntityId] {
        &self.live
    }

    /// One past the highest slot ever allocated.
    pub fn max_available(&self) -> usize {
        self.max_available
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }
}
