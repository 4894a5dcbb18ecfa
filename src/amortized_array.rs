//! AmortizedArray: a circular, growable array with progressive resizing.
//!
//! Logical index `i` lives at physical slot `(first + i) & (capacity - 1)`;
//! capacity is always a power of two no smaller than [`MIN_CAPACITY`].
//!
//! Resizing does not copy the contents in one go. The current storage is
//! parked as a backlog, a fresh buffer is installed with `first = 0`, and
//! every later mutating operation migrates a batch of `len / 4` elements
//! (at least one) before doing its own work. Physical slot `p` of the new
//! buffer is still pending while `cursor <= p < backlog.len`; pending
//! elements are read straight out of the old buffer at
//! `(backlog.first + p) & (old_capacity - 1)`. Pending slots always lie
//! inside the live window, so pushes at either end never land on them, and
//! pops that reach into the pending range shrink it from the matching end.
//!
//! `insert_at`/`remove_at` shift elements and therefore finish any
//! outstanding migration first.

use crate::alloc::{Allocator, Heap};
use crate::buffer::Buffer;
use crate::cursor::{Cursor, Generation, Tracked};
use crate::error::ContainerError;
use core::fmt;
use core::ops::{Index, IndexMut};

/// Smallest capacity an `AmortizedArray` ever has.
pub const MIN_CAPACITY: usize = 32;

struct Backlog<'a, T, A: Allocator + ?Sized> {
    slots: Buffer<'a, Option<T>, A>,
    first: usize,
    len: usize,
    cursor: usize,
}

impl<'a, T, A: Allocator + ?Sized> Backlog<'a, T, A> {
    #[inline]
    fn is_pending(&self, p: usize) -> bool {
        self.cursor <= p && p < self.len
    }

    #[inline]
    fn old_slot(&self, p: usize) -> usize {
        (self.first + p) & (self.slots.len() - 1)
    }

    #[inline]
    fn take(&mut self, p: usize) -> Option<T> {
        let s = self.old_slot(p);
        self.slots[s].take()
    }

    #[inline]
    fn is_drained(&self) -> bool {
        self.cursor >= self.len
    }
}

enum Migration<'a, T, A: Allocator + ?Sized> {
    Stable,
    Migrating(Backlog<'a, T, A>),
}

/// Growable circular array; see the module docs for the resize scheme.
pub struct AmortizedArray<'a, T, A: Allocator + ?Sized = Heap> {
    slots: Buffer<'a, Option<T>, A>,
    first: usize,
    len: usize,
    migration: Migration<'a, T, A>,
    generation: Generation,
}

#[cold]
#[track_caller]
fn out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index {index} is out of bounds for length {len}")
}

#[cold]
fn vacant_slot(index: usize) -> ! {
    panic!("AmortizedArray invariant violated: logical slot {index} is vacant")
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

fn round_capacity(requested: usize) -> usize {
    match requested.max(MIN_CAPACITY).checked_next_power_of_two() {
        Some(c) => c,
        None => capacity_overflow(),
    }
}

impl<T> AmortizedArray<'static, T, Heap> {
    pub fn new() -> Self {
        Self::new_in(Heap::global())
    }

    /// An empty array able to hold `capacity` items before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Heap::global())
    }
}

impl<T> Default for AmortizedArray<'static, T, Heap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, A: Allocator + ?Sized> AmortizedArray<'a, T, A> {
    pub fn new_in(alloc: &'a A) -> Self {
        Self::with_capacity_in(MIN_CAPACITY, alloc)
    }

    pub fn with_capacity_in(capacity: usize, alloc: &'a A) -> Self {
        let capacity = round_capacity(capacity);
        Self {
            slots: Buffer::new_with(alloc, capacity, |_| None),
            first: 0,
            len: 0,
            migration: Migration::Stable,
            generation: Generation::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots in the current storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Whether part of the contents still lives in the pre-resize buffer.
    pub fn is_migrating(&self) -> bool {
        matches!(self.migration, Migration::Migrating(_))
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    #[inline]
    fn wrap(&self, index: usize) -> usize {
        (self.first + index) & self.mask()
    }

    /// Shared access to an in-bounds logical index, in whichever buffer it
    /// currently lives.
    fn slot(&self, index: usize) -> &T {
        let p = self.wrap(index);
        let slot = match &self.migration {
            Migration::Migrating(b) if b.is_pending(p) => &b.slots[b.old_slot(p)],
            _ => &self.slots[p],
        };
        match slot {
            Some(v) => v,
            None => vacant_slot(index),
        }
    }

    fn slot_mut(&mut self, index: usize) -> &mut T {
        let p = self.wrap(index);
        let slot = match &mut self.migration {
            Migration::Migrating(b) if b.is_pending(p) => {
                let s = b.old_slot(p);
                &mut b.slots[s]
            }
            _ => &mut self.slots[p],
        };
        match slot {
            Some(v) => v,
            None => vacant_slot(index),
        }
    }

    /// Move up to `budget` pending elements into the current storage and
    /// release the old buffer once nothing is pending.
    fn migrate(&mut self, budget: usize) {
        let Migration::Migrating(b) = &mut self.migration else {
            return;
        };
        let end = b.len.min(b.cursor.saturating_add(budget));
        while b.cursor < end {
            let p = b.cursor;
            let value = b.take(p);
            debug_assert!(value.is_some(), "pending slot {p} is vacant");
            debug_assert!(self.slots[p].is_none(), "migration target {p} is occupied");
            self.slots[p] = value;
            b.cursor += 1;
        }
        if b.is_drained() {
            let old_capacity = b.slots.len();
            self.migration = Migration::Stable;
            tracing::trace!(old_capacity, capacity = self.slots.len(), "migration complete");
        }
    }

    /// The bounded slice of migration every mutation pays for.
    #[inline]
    fn migrate_step(&mut self) {
        if self.is_migrating() {
            self.migrate((self.len >> 2).max(1));
        }
    }

    fn finish_migration(&mut self) {
        self.migrate(usize::MAX);
    }

    fn resize(&mut self, new_capacity: usize) {
        self.finish_migration();
        let alloc = self.slots.allocator();
        let old = core::mem::replace(
            &mut self.slots,
            Buffer::new_with(alloc, new_capacity, |_| None),
        );
        tracing::debug!(
            from = old.len(),
            to = new_capacity,
            len = self.len,
            "amortized array resize"
        );
        let backlog = Backlog {
            slots: old,
            first: self.first,
            len: self.len,
            cursor: 0,
        };
        self.first = 0;
        if !backlog.is_drained() {
            self.migration = Migration::Migrating(backlog);
        }
    }

    fn maybe_grow(&mut self) {
        let capacity = self.capacity();
        if self.len == capacity {
            match capacity.checked_mul(2) {
                Some(c) => self.resize(c),
                None => capacity_overflow(),
            }
        }
    }

    fn maybe_shrink(&mut self) {
        let capacity = self.capacity();
        if self.len <= capacity / 4 && capacity > MIN_CAPACITY {
            self.resize(capacity / 2);
        }
    }

    /// Checked access.
    pub fn at(&self, index: usize) -> Result<&T, ContainerError> {
        if index >= self.len {
            return Err(ContainerError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(self.slot(index))
    }

    /// Checked mutable access. Pays a migration step like any mutation.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ContainerError> {
        if index >= self.len {
            return Err(ContainerError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.migrate_step();
        Ok(self.slot_mut(index))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.at(index).ok()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.at_mut(index).ok()
    }

    pub fn front(&self) -> Option<&T> {
        self.at(0).ok()
    }

    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).map(|i| self.slot(i))
    }

    pub fn push(&mut self, value: T) {
        self.maybe_grow();
        self.migrate_step();
        let p = self.wrap(self.len);
        debug_assert!(self.slots[p].is_none());
        self.slots[p] = Some(value);
        self.len += 1;
        self.generation.bump();
    }

    pub fn push_front(&mut self, value: T) {
        self.maybe_grow();
        self.migrate_step();
        let mask = self.mask();
        self.first = (self.first + mask) & mask;
        debug_assert!(self.slots[self.first].is_none());
        self.slots[self.first] = Some(value);
        self.len += 1;
        self.generation.bump();
    }

    /// Insert at `index`, shifting the shorter side. `index == len` appends.
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<(), ContainerError> {
        if index > self.len {
            return Err(ContainerError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.maybe_grow();
        self.finish_migration();
        if index < self.len / 2 {
            let mask = self.mask();
            self.first = (self.first + mask) & mask;
            for k in 0..index {
                let (a, b) = (self.wrap(k), self.wrap(k + 1));
                self.slots.swap(a, b);
            }
        } else {
            for k in (index..self.len).rev() {
                let (a, b) = (self.wrap(k), self.wrap(k + 1));
                self.slots.swap(a, b);
            }
        }
        let p = self.wrap(index);
        debug_assert!(self.slots[p].is_none());
        self.slots[p] = Some(value);
        self.len += 1;
        self.generation.bump();
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.maybe_shrink();
        self.migrate_step();
        let p = self.wrap(self.len - 1);
        let value = match &mut self.migration {
            Migration::Migrating(b) if b.is_pending(p) => {
                debug_assert_eq!(p + 1, b.len);
                let v = b.take(p);
                b.len -= 1;
                v
            }
            _ => self.slots[p].take(),
        };
        debug_assert!(value.is_some());
        self.len -= 1;
        self.migrate(0);
        self.generation.bump();
        value
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.maybe_shrink();
        self.migrate_step();
        let p = self.first;
        let value = match &mut self.migration {
            Migration::Migrating(b) if b.is_pending(p) => {
                debug_assert_eq!(p, b.cursor);
                let v = b.take(p);
                b.cursor += 1;
                v
            }
            _ => self.slots[p].take(),
        };
        debug_assert!(value.is_some());
        self.first = (self.first + 1) & self.mask();
        self.len -= 1;
        self.migrate(0);
        self.generation.bump();
        value
    }

    /// Remove and return the item at `index`, shifting the shorter side.
    pub fn remove_at(&mut self, index: usize) -> Result<T, ContainerError> {
        if index >= self.len {
            return Err(ContainerError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        self.maybe_shrink();
        self.finish_migration();
        let p = self.wrap(index);
        let value = self.slots[p].take();
        if index < self.len / 2 {
            for k in (0..index).rev() {
                let (a, b) = (self.wrap(k), self.wrap(k + 1));
                self.slots.swap(a, b);
            }
            self.first = (self.first + 1) & self.mask();
        } else {
            for k in index..self.len - 1 {
                let (a, b) = (self.wrap(k), self.wrap(k + 1));
                self.slots.swap(a, b);
            }
        }
        self.len -= 1;
        self.generation.bump();
        match value {
            Some(v) => Ok(v),
            None => vacant_slot(index),
        }
    }

    /// Drop every item. Capacity is kept; a pending old buffer is released.
    pub fn clear(&mut self) {
        self.migration = Migration::Stable;
        for i in 0..self.len {
            let p = self.wrap(i);
            self.slots[p] = None;
        }
        self.first = 0;
        self.len = 0;
        self.generation.bump();
    }

    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter {
            array: self,
            front: 0,
            back: self.len,
        }
    }

    /// Mutable iteration. Completes any outstanding migration first so the
    /// live window is one contiguous (possibly wrapped) region.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.finish_migration();
        let capacity = self.slots.len();
        let (first, len) = (self.first, self.len);
        let (head, tail): (&mut [Option<T>], &mut [Option<T>]) = if first + len <= capacity {
            (&mut self.slots[first..first + len], &mut [])
        } else {
            let (wrapped, from_first) = self.slots.split_at_mut(first);
            (from_first, &mut wrapped[..first + len - capacity])
        };
        IterMut {
            inner: head.iter_mut().chain(tail.iter_mut()),
        }
    }

    /// A generation-stamped cursor at the first item.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl<'a, T: PartialEq, A: Allocator + ?Sized> AmortizedArray<'a, T, A> {
    /// Logical index of the first item equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.iter().position(|v| v == value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.index_of(value).is_some()
    }

    /// Remove the first item equal to `value`; returns whether one was found.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.index_of(value) {
            Some(i) => self.remove_at(i).is_ok(),
            None => false,
        }
    }
}

impl<'a, T, A: Allocator + ?Sized> Index<usize> for AmortizedArray<'a, T, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        if index >= self.len {
            out_of_bounds(index, self.len);
        }
        self.slot(index)
    }
}

impl<'a, T, A: Allocator + ?Sized> IndexMut<usize> for AmortizedArray<'a, T, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        if index >= self.len {
            out_of_bounds(index, self.len);
        }
        self.migrate_step();
        self.slot_mut(index)
    }
}

impl<'a, T, A: Allocator + ?Sized> Tracked for AmortizedArray<'a, T, A> {
    type Item = T;

    fn generation(&self) -> Generation {
        self.generation
    }

    fn start(&self) -> usize {
        0
    }

    fn step(&self, position: usize, _visited: usize) -> Option<(&T, usize)> {
        (position < self.len).then(|| (self.slot(position), position + 1))
    }
}

impl<'a, T: Clone, A: Allocator + ?Sized> Clone for AmortizedArray<'a, T, A> {
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity_in(self.capacity(), self.slots.allocator());
        for v in self.iter() {
            out.push(v.clone());
        }
        out
    }
}

impl<'a, T: fmt::Debug, A: Allocator + ?Sized> fmt::Debug for AmortizedArray<'a, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, 'b, T: PartialEq, A: Allocator + ?Sized, B: Allocator + ?Sized>
    PartialEq<AmortizedArray<'b, T, B>> for AmortizedArray<'a, T, A>
{
    fn eq(&self, other: &AmortizedArray<'b, T, B>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<'a, T: Eq, A: Allocator + ?Sized> Eq for AmortizedArray<'a, T, A> {}

impl<'a, T, A: Allocator + ?Sized> Extend<T> for AmortizedArray<'a, T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.push(v);
        }
    }
}

impl<T> FromIterator<T> for AmortizedArray<'static, T, Heap> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

/// Shared iterator in logical order; reads through the backlog while
/// migrating.
pub struct Iter<'s, T, A: Allocator + ?Sized = Heap> {
    array: &'s AmortizedArray<'s, T, A>,
    front: usize,
    back: usize,
}

impl<'s, T, A: Allocator + ?Sized> Iterator for Iter<'s, T, A> {
    type Item = &'s T;

    #[inline]
    fn next(&mut self) -> Option<&'s T> {
        if self.front == self.back {
            return None;
        }
        let v = self.array.slot(self.front);
        self.front += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<'s, T, A: Allocator + ?Sized> DoubleEndedIterator for Iter<'s, T, A> {
    fn next_back(&mut self) -> Option<&'s T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.array.slot(self.back))
    }
}

impl<'s, T, A: Allocator + ?Sized> ExactSizeIterator for Iter<'s, T, A> {}

/// Mutable iterator in logical order.
pub struct IterMut<'s, T> {
    inner: core::iter::Chain<
        core::slice::IterMut<'s, Option<T>>,
        core::slice::IterMut<'s, Option<T>>,
    >,
}

impl<'s, T> Iterator for IterMut<'s, T> {
    type Item = &'s mut T;

    #[inline]
    fn next(&mut self) -> Option<&'s mut T> {
        self.inner.next().and_then(Option::as_mut)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'s, T> DoubleEndedIterator for IterMut<'s, T> {
    fn next_back(&mut self) -> Option<&'s mut T> {
        self.inner.next_back().and_then(Option::as_mut)
    }
}

/// Owning iterator; drains from the front.
pub struct IntoIter<'a, T, A: Allocator + ?Sized = Heap> {
    array: AmortizedArray<'a, T, A>,
}

impl<'a, T, A: Allocator + ?Sized> Iterator for IntoIter<'a, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.array.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.array.len, Some(self.array.len))
    }
}

impl<'a, T, A: Allocator + ?Sized> DoubleEndedIterator for IntoIter<'a, T, A> {
    fn next_back(&mut self) -> Option<T> {
        self.array.pop()
    }
}

impl<'a, T, A: Allocator + ?Sized> ExactSizeIterator for IntoIter<'a, T, A> {}

impl<'a, T, A: Allocator + ?Sized> IntoIterator for AmortizedArray<'a, T, A> {
    type Item = T;
    type IntoIter = IntoIter<'a, T, A>;

    fn into_iter(self) -> IntoIter<'a, T, A> {
        IntoIter { array: self }
    }
}

impl<'s, 'a: 's, T, A: Allocator + ?Sized> IntoIterator for &'s AmortizedArray<'a, T, A> {
    type Item = &'s T;
    type IntoIter = Iter<'s, T, A>;

    fn into_iter(self) -> Iter<'s, T, A> {
        self.iter()
    }
}

impl<'s, 'a: 's, T, A: Allocator + ?Sized> IntoIterator for &'s mut AmortizedArray<'a, T, A> {
    type Item = &'s mut T;
    type IntoIter = IterMut<'s, T>;

    fn into_iter(self) -> IterMut<'s, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::CountingAllocator;

    /// Invariant: pushing N values then reading 0..N yields them in order
    /// across several grow cycles, including reads taken mid-migration.
    #[test]
    fn push_1024_reads_back_in_order() {
        let mut a = AmortizedArray::new();
        assert_eq!(a.capacity(), MIN_CAPACITY);
        let mut saw_migration = false;
        for i in 0..1024u32 {
            a.push(i);
            saw_migration |= a.is_migrating();
            for j in [0, i / 2, i] {
                assert_eq!(a[j as usize], j);
            }
        }
        assert!(saw_migration);
        assert_eq!(a.len(), 1024);
        for i in 0..1024u32 {
            assert_eq!(a[i as usize], i);
        }
    }

    /// Invariant: growth leaves both buffers alive only until the backlog
    /// drains in `len / 4` batches.
    #[test]
    fn migration_spreads_over_following_pushes() {
        let c = CountingAllocator::new();
        {
            let mut a = AmortizedArray::new_in(&c);
            for i in 0..32 {
                a.push(i);
            }
            assert_eq!(c.live_allocations(), 1);
            a.push(32);
            assert_eq!(a.capacity(), 64);
            assert!(a.is_migrating());
            assert_eq!(c.live_allocations(), 2);
            a.push(33);
            a.push(34);
            assert!(a.is_migrating());
            a.push(35);
            assert!(!a.is_migrating());
            assert_eq!(c.live_allocations(), 1);
            assert!(a.iter().copied().eq(0..36));
        }
        assert_eq!(c.live_allocations(), 0);
    }

    /// Invariant: popping during migration takes pending items straight from
    /// the old buffer and keeps LIFO order.
    #[test]
    fn pop_reaches_into_backlog() {
        let mut a = AmortizedArray::new();
        for i in 0..33 {
            a.push(i);
        }
        assert!(a.is_migrating());
        for expected in (0..33).rev() {
            assert_eq!(a.pop(), Some(expected));
        }
        assert_eq!(a.pop(), None);
        assert!(!a.is_migrating());
    }

    /// Invariant: popping from the front during migration keeps FIFO order.
    #[test]
    fn pop_front_reaches_into_backlog() {
        let mut a = AmortizedArray::new();
        for i in 0..33 {
            a.push(i);
        }
        a.push_front(-1);
        let drained: Vec<i32> = core::iter::from_fn(|| a.pop_front()).collect();
        assert_eq!(drained, (-1..33).collect::<Vec<_>>());
    }

    #[test]
    fn push_front_wraps_around() {
        let mut a = AmortizedArray::new();
        for i in 0..100 {
            a.push_front(i);
        }
        assert!(a.iter().copied().eq((0..100).rev()));
        assert_eq!(a.front(), Some(&99));
        assert_eq!(a.back(), Some(&0));
    }

    /// Invariant: capacity shrinks below 25% occupancy, never below the floor,
    /// and a push right after a shrink does not grow again.
    #[test]
    fn shrink_has_hysteresis() {
        let mut a = AmortizedArray::new();
        for i in 0..33 {
            a.push(i);
        }
        assert_eq!(a.capacity(), 64);
        while a.len() > 16 {
            a.pop();
        }
        assert_eq!(a.capacity(), 64);
        a.pop();
        assert_eq!(a.capacity(), 32);
        a.push(100);
        assert_eq!(a.capacity(), 32);
        while a.pop().is_some() {}
        assert_eq!(a.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn alternating_at_threshold_does_not_thrash() {
        let mut a = AmortizedArray::new();
        for i in 0..32 {
            a.push(i);
        }
        let mut changes = 0;
        let mut cap = a.capacity();
        for i in 0..100 {
            a.push(i);
            a.pop();
            if a.capacity() != cap {
                changes += 1;
                cap = a.capacity();
            }
        }
        assert!(changes <= 1, "capacity changed {changes} times");
    }

    #[test]
    fn insert_and_remove_shift_shorter_side() {
        let mut a: AmortizedArray<i32> = (0..10).collect();
        a.insert_at(2, 100).unwrap();
        a.insert_at(9, 200).unwrap();
        a.insert_at(a.len(), 300).unwrap();
        a.insert_at(0, 400).unwrap();
        assert!(a
            .iter()
            .copied()
            .eq([400, 0, 1, 100, 2, 3, 4, 5, 6, 7, 200, 8, 9, 300]));
        assert_eq!(a.remove_at(3), Ok(100));
        assert_eq!(a.remove_at(10), Ok(8));
        assert_eq!(a.remove_at(0), Ok(400));
        assert!(a.iter().copied().eq([0, 1, 2, 3, 4, 5, 6, 7, 200, 9, 300]));
    }

    #[test]
    fn insert_during_migration_finishes_it() {
        let mut a: AmortizedArray<i32> = (0..33).collect();
        assert!(a.is_migrating());
        a.insert_at(16, -1).unwrap();
        assert!(!a.is_migrating());
        assert_eq!(a[16], -1);
        assert_eq!(a[17], 16);
        assert_eq!(a.len(), 34);
    }

    /// Invariant: checked operations report errors and leave the array as is.
    #[test]
    fn checked_paths_report_out_of_bounds() {
        let mut a: AmortizedArray<i32> = (0..3).collect();
        assert_eq!(a.at(3), Err(ContainerError::OutOfBounds { index: 3, len: 3 }));
        assert_eq!(
            a.insert_at(5, 0),
            Err(ContainerError::OutOfBounds { index: 5, len: 3 })
        );
        assert_eq!(a.remove_at(3), Err(ContainerError::OutOfBounds { index: 3, len: 3 }));
        assert!(a.iter().copied().eq(0..3));
        assert_eq!(a.at(1), Ok(&1));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_past_end_panics() {
        let a: AmortizedArray<i32> = (0..3).collect();
        let _v = a[3];
    }

    #[test]
    fn iter_mut_sees_wrapped_window() {
        let mut a = AmortizedArray::new();
        for i in 0..10 {
            a.push(i);
            a.push_front(-i);
        }
        for v in a.iter_mut() {
            *v *= 2;
        }
        let expected: Vec<i32> = (0..10).rev().map(|i| -i * 2).chain((0..10).map(|i| i * 2)).collect();
        assert!(a.iter().copied().eq(expected.iter().copied()));
        assert!(a.iter().rev().copied().eq(expected.iter().rev().copied()));
    }

    #[test]
    fn index_mut_during_migration() {
        let mut a: AmortizedArray<i32> = (0..33).collect();
        a[32] = 1000;
        a[0] = -1000;
        assert_eq!(a[32], 1000);
        assert_eq!(a[0], -1000);
    }

    #[test]
    fn clear_keeps_capacity_and_releases_backlog() {
        let c = CountingAllocator::new();
        let mut a = AmortizedArray::new_in(&c);
        for i in 0..40 {
            a.push(i);
        }
        let cap = a.capacity();
        a.clear();
        assert!(a.is_empty());
        assert_eq!(a.capacity(), cap);
        assert_eq!(c.live_allocations(), 1);
        a.push(7);
        assert_eq!(a[0], 7);
    }

    #[test]
    fn clone_is_deep_and_take_resets() {
        let mut a: AmortizedArray<String> = (0..40).map(|i| i.to_string()).collect();
        let b = a.clone();
        a[0].push('!');
        assert_eq!(b[0], "0");
        assert_eq!(a[0], "0!");
        assert_eq!(a, {
            let mut c = b.clone();
            c[0].push('!');
            c
        });
        let taken = core::mem::take(&mut a);
        assert_eq!(taken.len(), 40);
        assert!(a.is_empty());
        assert_eq!(a.capacity(), MIN_CAPACITY);
        a.push("again".to_string());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn value_search_and_remove() {
        let mut a: AmortizedArray<i32> = [5, 6, 7, 6].into_iter().collect();
        assert_eq!(a.index_of(&6), Some(1));
        assert!(a.contains(&7));
        assert!(a.remove(&6));
        assert!(a.iter().copied().eq([5, 7, 6]));
        assert!(!a.remove(&42));
    }

    #[test]
    fn into_iter_both_ends() {
        let a: AmortizedArray<i32> = (0..50).collect();
        let mut it = a.into_iter();
        assert_eq!(it.next(), Some(0));
        assert_eq!(it.next_back(), Some(49));
        assert_eq!(it.len(), 48);
        assert!(it.eq(1..49));
    }

    #[test]
    fn cursor_goes_stale_after_push() {
        let mut a: AmortizedArray<i32> = (0..5).collect();
        let mut c = a.cursor();
        assert_eq!(c.advance(&a), Ok(Some(&0)));
        assert_eq!(c.advance(&a), Ok(Some(&1)));
        a.push(5);
        assert!(matches!(c.advance(&a), Err(ContainerError::StaleCursor { .. })));
        c.rewind(&a);
        let mut seen = Vec::new();
        while let Ok(Some(v)) = c.advance(&a) {
            seen.push(*v);
        }
        assert_eq!(seen, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn get_mut_advances_migration() {
        let mut a: AmortizedArray<usize> = (0..33).collect();
        assert!(a.is_migrating());
        for _ in 0..10 {
            if let Some(v) = a.get_mut(0) {
                *v += 1;
            }
        }
        assert!(!a.is_migrating());
        assert_eq!(a.get(0), Some(&10));
        assert_eq!(a.get(33), None);
    }

    #[test]
    fn drops_every_item_on_drop() {
        use std::rc::Rc;
        let token = Rc::new(());
        {
            let mut a = AmortizedArray::new();
            for _ in 0..33 {
                a.push(token.clone());
            }
            assert!(a.is_migrating());
        }
        assert_eq!(Rc::strong_count(&token), 1);
    }
}
