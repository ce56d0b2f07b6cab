// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generation-checked handle arenas.
//!
//! Every object handed across the C boundary lives in a per-kind arena slot.
//! A handle packs `{kind: u8, generation: u24, index: u32}`; destroying the
//! object bumps the slot generation so a stale handle (use-after-destroy,
//! double destroy) is rejected instead of dereferenced, and the kind tag keeps
//! a handle of one kind from resolving in another kind's arena. Generations
//! start at 1, which keeps the all-zero value free for the null handle.

use parking_lot::Mutex;
use rclcore::{EntityKind, Error};

const GENERATION_MASK: u32 = 0x00FF_FFFF;

/// Opaque handle to any object owned by this library. `0` is the null handle.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RclHandle(pub u64);

impl RclHandle {
    pub const NULL: RclHandle = RclHandle(0);

    const fn pack(tag: u8, index: u32, generation: u32) -> Self {
        RclHandle(
            ((tag as u64) << 56)
                | (((generation & GENERATION_MASK) as u64) << 32)
                | index as u64,
        )
    }

    const fn tag(self) -> u8 {
        (self.0 >> 56) as u8
    }

    const fn index(self) -> usize {
        (self.0 & 0xFFFF_FFFF) as usize
    }

    const fn generation(self) -> u32 {
        ((self.0 >> 32) as u32) & GENERATION_MASK
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Slots plus free list.
pub(crate) struct Arena<T> {
    tag: u8,
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
}

impl<T> Arena<T> {
    pub(crate) const fn new(tag: u8) -> Self {
        Self {
            tag,
            entries: Vec::new(),
            free: Vec::new(),
        }
    }

    fn owns(&self, handle: RclHandle) -> bool {
        !handle.is_null() && handle.tag() == self.tag
    }

    pub(crate) fn insert(&mut self, value: T) -> Option<RclHandle> {
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.value = Some(value);
            return Some(RclHandle::pack(self.tag, index, entry.generation));
        }

        let index = u32::try_from(self.entries.len()).ok()?;
        self.entries.push(Entry {
            generation: 1,
            value: Some(value),
        });
        Some(RclHandle::pack(self.tag, index, 1))
    }

    pub(crate) fn get(&self, handle: RclHandle) -> Option<&T> {
        if !self.owns(handle) {
            return None;
        }
        self.entries
            .get(handle.index())
            .filter(|entry| entry.generation == handle.generation())
            .and_then(|entry| entry.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, handle: RclHandle) -> Option<&mut T> {
        if !self.owns(handle) {
            return None;
        }
        self.entries
            .get_mut(handle.index())
            .filter(|entry| entry.generation == handle.generation())
            .and_then(|entry| entry.value.as_mut())
    }

    pub(crate) fn remove(&mut self, handle: RclHandle) -> Option<T> {
        if !self.owns(handle) {
            return None;
        }
        let index = handle.index();
        let entry = self
            .entries
            .get_mut(index)
            .filter(|entry| entry.generation == handle.generation())?;
        let value = entry.value.take()?;

        entry.generation = match entry.generation.wrapping_add(1) & GENERATION_MASK {
            0 => 1,
            next => next,
        };
        // index fits in u32: it came out of a packed handle
        self.free.push(index as u32);
        Some(value)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }
}

/// Arena of one entity kind behind a lock.
pub(crate) struct Registry<T> {
    kind: EntityKind,
    arena: Mutex<Arena<T>>,
}

impl<T: Clone> Registry<T> {
    pub(crate) const fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            arena: parking_lot::const_mutex(Arena::new(kind as u8 + 1)),
        }
    }

    fn invalid(&self) -> Error {
        Error::InvalidHandle(self.kind)
    }

    pub(crate) fn insert(&self, value: T) -> Result<RclHandle, Error> {
        self.arena.lock().insert(value).ok_or_else(|| {
            Error::InvalidArgument(format!("{} handle space exhausted", self.kind))
        })
    }

    /// Clone the object out so no lock is held while it is used.
    pub(crate) fn get(&self, handle: RclHandle) -> Result<T, Error> {
        self.arena
            .lock()
            .get(handle)
            .cloned()
            .ok_or_else(|| self.invalid())
    }

    pub(crate) fn update<R>(
        &self,
        handle: RclHandle,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, Error> {
        self.arena
            .lock()
            .get_mut(handle)
            .map(f)
            .ok_or_else(|| self.invalid())
    }

    pub(crate) fn remove(&self, handle: RclHandle) -> Result<T, Error> {
        self.arena.lock().remove(handle).ok_or_else(|| self.invalid())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.arena.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle_is_never_issued() {
        let mut arena = Arena::new(1);
        let handle = arena.insert("a").expect("insert");
        assert!(!handle.is_null());
        assert_eq!(arena.get(RclHandle::NULL), None);
        assert_eq!(arena.remove(RclHandle::NULL), None);
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut arena = Arena::new(1);
        let first = arena.insert(1).expect("insert");
        assert_eq!(arena.remove(first), Some(1));
        assert_eq!(arena.remove(first), None, "double destroy");
        assert_eq!(arena.get(first), None, "use after destroy");

        // The slot is reused under a new generation
        let second = arena.insert(2).expect("insert");
        assert_eq!(second.index(), first.index());
        assert_ne!(second, first);
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.get(second), Some(&2));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn handles_do_not_cross_arenas() {
        let mut nodes = Arena::new(1);
        let mut guards = Arena::new(2);
        let node = nodes.insert("node").expect("insert");
        let guard = guards.insert("guard").expect("insert");

        assert_eq!(node.index(), guard.index());
        assert_eq!(guards.get(node), None);
        assert_eq!(nodes.remove(guard), None);
        assert_eq!(nodes.get(node), Some(&"node"));
    }

    #[test]
    fn generation_wraps_past_zero() {
        let mut arena = Arena::new(1);
        let handle = arena.insert(0).expect("insert");
        arena.entries[0].generation = GENERATION_MASK;
        let handle = RclHandle::pack(1, handle.index() as u32, GENERATION_MASK);
        assert_eq!(arena.remove(handle), Some(0));
        assert_eq!(arena.entries[0].generation, 1);
    }

    #[test]
    fn update_mutates_in_place() {
        let registry: Registry<i64> = Registry::new(EntityKind::RequestId);
        let handle = registry.insert(5).expect("insert");
        registry.update(handle, |value| *value += 1).expect("update");
        assert_eq!(registry.get(handle).expect("get"), 6);

        registry.remove(handle).expect("remove");
        let err = registry.get(handle).expect_err("stale");
        assert!(matches!(err, Error::InvalidHandle(EntityKind::RequestId)));
        assert_eq!(registry.len(), 0);
    }
}
