//! The ordered playback queue.
//!
//! Slots are position-addressed; the same track id may occupy several
//! slots. Each slot also carries a private key so that the pre-shuffle
//! snapshot can follow edits made while shuffle is active.

use crate::catalog::Track;

#[derive(Debug, Clone)]
pub(super) struct Slot {
    pub(super) key: u64,
    pub(super) track: Track,
}

#[derive(Debug, Clone, Default)]
pub struct Queue {
    slots: Vec<Slot>,
}

impl Queue {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.slots.get(index).map(|s| &s.track)
    }

    pub fn first(&self) -> Option<&Track> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&Track> {
        self.slots.last().map(|s| &s.track)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.slots.iter().map(|s| &s.track)
    }

    pub fn to_vec(&self) -> Vec<Track> {
        self.iter().cloned().collect()
    }

    /// First slot holding a track with this id.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.track.id == id)
    }

    pub(super) fn from_slots(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub(super) fn slots_mut(&mut self) -> &mut Vec<Slot> {
        &mut self.slots
    }

    pub(super) fn push(&mut self, slot: Slot) {
        self.slots.push(slot);
    }

    /// Insert `slots` so the first of them lands at `index` (clamped to the end).
    pub(super) fn insert_at(&mut self, index: usize, slots: Vec<Slot>) {
        let index = index.min(self.slots.len());
        self.slots.splice(index..index, slots);
    }

    pub(super) fn remove_at(&mut self, index: usize) -> Option<Slot> {
        if index < self.slots.len() {
            Some(self.slots.remove(index))
        } else {
            None
        }
    }

    pub(super) fn remove_key(&mut self, key: u64) -> bool {
        match self.slots.iter().position(|s| s.key == key) {
            Some(i) => {
                self.slots.remove(i);
                true
            }
            None => false,
        }
    }

    /// Move the slot at `from` to `to`, keeping everything else in order.
    /// Rejected when either index is out of range.
    pub(super) fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.slots.len();
        if from >= len || to >= len {
            return false;
        }
        let moved = self.slots.remove(from);
        self.slots.insert(to, moved);
        true
    }
}
