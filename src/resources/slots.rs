//! Generation-keyed slot storage
//!
//! Freed slots are reused, but each reuse bumps the slot generation, so a
//! `RawRef` minted before the free no longer resolves.

use crate::handle::{RawRef, GENERATION_MASK};

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct SlotMap<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

#[inline]
fn next_generation(generation: u32) -> u32 {
    // Generation 0 is never handed out
    match (generation + 1) & GENERATION_MASK {
        0 => 1,
        next => next,
    }
}

impl<T> SlotMap<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> RawRef {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return RawRef::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 1, value: Some(value) });
        RawRef::new(index, 1)
    }

    #[inline]
    pub fn get(&self, raw: RawRef) -> Option<&T> {
        self.slots
            .get(raw.index as usize)
            .filter(|slot| slot.generation == raw.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, raw: RawRef) -> Option<&mut T> {
        self.slots
            .get_mut(raw.index as usize)
            .filter(|slot| slot.generation == raw.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    #[inline]
    pub fn contains(&self, raw: RawRef) -> bool {
        self.get(raw).is_some()
    }

    pub fn remove(&mut self, raw: RawRef) -> Option<T> {
        let slot = self.slots.get_mut(raw.index as usize)?;
        if slot.generation != raw.generation {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation = next_generation(slot.generation);
        self.free.push(raw.index);
        self.len -= 1;
        Some(value)
    }

    /// Drop every entry `keep` rejects, returning how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let drop_it = slot.value.as_ref().is_some_and(|value| !keep(value));
            if drop_it {
                slot.value = None;
                slot.generation = next_generation(slot.generation);
                self.free.push(index as u32);
                removed += 1;
            }
        }
        self.len -= removed;
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (RawRef, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (RawRef::new(index as u32, slot.generation), value))
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
