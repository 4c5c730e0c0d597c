//! Entity identity allocation.
//!
//! Free indices are recycled FIFO with a bumped generation so that stale
//! handles are detected immediately and generations spread across slots.

use simcore_common::EntityId;
use std::collections::VecDeque;

/// Allocates and recycles [`EntityId`]s with generational tracking.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// Current generation for each index slot.
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_indices: VecDeque<u32>,
    alive_count: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an identifier not held by any live entity.
    ///
    /// # Panics
    ///
    /// Panics when the 32-bit index space is exhausted. The world cannot
    /// continue without unique identities.
    pub fn allocate(&mut self) -> EntityId {
        let id = if let Some(index) = self.free_indices.pop_front() {
            self.alive[index as usize] = true;
            EntityId::new(index, self.generations[index as usize])
        } else {
            let index = u32::try_from(self.generations.len())
                .ok()
                .filter(|&i| i != u32::MAX)
                .unwrap_or_else(|| panic!("entity index space exhausted"));
            self.generations.push(0);
            self.alive.push(true);
            EntityId::new(index, 0)
        };
        self.alive_count += 1;
        id
    }

    /// Retire a live entity. Returns `false` for dead or stale handles.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.index() as usize;
        self.alive[idx] = false;
        self.alive_count -= 1;
        match self.generations[idx].checked_add(1) {
            Some(next) => {
                self.generations[idx] = next;
                self.free_indices.push_back(id.index());
            }
            // Wrapping would let an ancient handle alias a new entity.
            None => tracing::warn!(index = id.index(), "entity slot retired after generation overflow"),
        }
        true
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        let idx = id.index() as usize;
        idx < self.generations.len() && self.alive[idx] && self.generations[idx] == id.generation()
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Live entities in index order.
    pub fn iter_alive(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(idx, _)| EntityId::new(idx as u32, self.generations[idx]))
    }
}
