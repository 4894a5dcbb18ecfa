//! Set: a table with `()` values.

use crate::alloc::{Allocator, Heap};
use crate::amortized_array;
use crate::cursor::{Cursor, Generation, Tracked};
use crate::table::{Entry, OpenAddressTable};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use std::collections::hash_map::RandomState;

/// Open-addressing hash set with insertion-ordered iteration.
pub struct Set<'a, T, S = RandomState, A: Allocator + ?Sized = Heap> {
    table: OpenAddressTable<'a, T, (), S, A>,
}

impl<T> Set<'static, T, RandomState, Heap> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<T, S> Set<'static, T, S, Heap> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::with_capacity_and_hasher_in(capacity, hasher, Heap::global())
    }
}

impl<'a, T, A: Allocator + ?Sized> Set<'a, T, RandomState, A> {
    pub fn new_in(alloc: &'a A) -> Self {
        Self::with_capacity_and_hasher_in(0, RandomState::new(), alloc)
    }

    pub fn with_capacity_in(capacity: usize, alloc: &'a A) -> Self {
        Self::with_capacity_and_hasher_in(capacity, RandomState::new(), alloc)
    }
}

impl<'a, T, S, A: Allocator + ?Sized> Set<'a, T, S, A> {
    pub fn with_hasher_in(hasher: S, alloc: &'a A) -> Self {
        Self::with_capacity_and_hasher_in(0, hasher, alloc)
    }

    pub fn with_capacity_and_hasher_in(capacity: usize, hasher: S, alloc: &'a A) -> Self {
        Self {
            table: OpenAddressTable::with_capacity_and_hasher_in(capacity, hasher, alloc),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Member at `index` in backing (insertion) order.
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.table.entry_at(index).map(Entry::key)
    }

    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter {
            inner: self.table.entries(),
        }
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::new(self)
    }

    pub fn generation(&self) -> Generation {
        self.table.generation()
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.table.assert_consistent();
    }
}

impl<'a, T, S, A> Set<'a, T, S, A>
where
    T: Eq + Hash,
    S: BuildHasher,
    A: Allocator + ?Sized,
{
    /// Insert if absent; returns whether the value was added.
    pub fn add(&mut self, value: T) -> bool {
        self.table.insert(value, ()).is_none()
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.find(value).is_some()
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get(value).map(Entry::key)
    }

    /// Remove `value`; returns whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(value).is_some()
    }

    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(value).map(|(t, ())| t)
    }
}

impl<'a, T, S, A: Allocator + ?Sized> Index<usize> for Set<'a, T, S, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.get_index(index) {
            Some(v) => v,
            None => panic!("index {index} is out of bounds for length {}", self.len()),
        }
    }
}

impl<'a, T, S, A: Allocator + ?Sized> Tracked for Set<'a, T, S, A> {
    type Item = T;

    fn generation(&self) -> Generation {
        self.table.generation()
    }

    fn start(&self) -> usize {
        0
    }

    fn step(&self, position: usize, _visited: usize) -> Option<(&T, usize)> {
        self.get_index(position).map(|v| (v, position + 1))
    }
}

impl<'a, T: Clone, S: Clone, A: Allocator + ?Sized> Clone for Set<'a, T, S, A> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<T, S: Default> Default for Set<'static, T, S, Heap> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<'a, T: fmt::Debug, S, A: Allocator + ?Sized> fmt::Debug for Set<'a, T, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, S, A> Extend<T> for Set<'a, T, S, A>
where
    T: Eq + Hash,
    S: BuildHasher,
    A: Allocator + ?Sized,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.add(v);
        }
    }
}

impl<T, S> FromIterator<T> for Set<'static, T, S, Heap>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = Self::default();
        s.extend(iter);
        s
    }
}

pub struct Iter<'s, T, A: Allocator + ?Sized = Heap> {
    inner: amortized_array::Iter<'s, Entry<T, ()>, A>,
}

impl<'s, T, A: Allocator + ?Sized> Iterator for Iter<'s, T, A> {
    type Item = &'s T;

    #[inline]
    fn next(&mut self) -> Option<&'s T> {
        self.inner.next().map(Entry::key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'s, T, A: Allocator + ?Sized> DoubleEndedIterator for Iter<'s, T, A> {
    fn next_back(&mut self) -> Option<&'s T> {
        self.inner.next_back().map(Entry::key)
    }
}

impl<'s, T, A: Allocator + ?Sized> ExactSizeIterator for Iter<'s, T, A> {}

impl<'s, 'a, T, S, A: Allocator + ?Sized> IntoIterator for &'s Set<'a, T, S, A> {
    type Item = &'s T;
    type IntoIter = Iter<'s, T, A>;

    fn into_iter(self) -> Iter<'s, T, A> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::FnvBuildHasher;

    #[test]
    fn add_is_insert_if_absent() {
        let mut s = Set::new();
        assert!(s.add("a"));
        assert!(!s.add("a"));
        assert_eq!(s.len(), 1);
        assert!(s.contains("a"));
    }

    #[test]
    fn remove_reports_presence() {
        let mut s: Set<String> = ["x", "y"].iter().map(|v| v.to_string()).collect();
        assert!(s.remove("x"));
        assert!(!s.remove("x"));
        assert_eq!(s.take("y"), Some("y".to_string()));
        assert!(s.is_empty());
    }

    /// Invariant: indexing follows backing order, which is insertion order
    /// with removals compacted.
    #[test]
    fn index_in_backing_order() {
        let mut s = Set::with_hasher(FnvBuildHasher);
        for v in [5, 3, 9, 1] {
            s.add(v);
        }
        assert_eq!(s[0], 5);
        assert_eq!(s[3], 1);
        s.remove(&3);
        assert_eq!(s[1], 9);
        assert_eq!(s.get_index(3), None);
        assert!(s.iter().rev().copied().eq([1, 9, 5]));
    }

    #[test]
    fn clone_and_debug() {
        let s: Set<u8, FnvBuildHasher> = [1, 2].into_iter().collect();
        let c = s.clone();
        assert_eq!(format!("{c:?}"), "{1, 2}");
        assert_eq!(c.get(&2), Some(&2));
    }

    #[test]
    fn cursor_over_members() {
        let mut s = Set::new();
        s.extend(['p', 'q']);
        let mut c = s.cursor();
        assert_eq!(c.advance(&s), Ok(Some(&'p')));
        assert_eq!(c.advance(&s), Ok(Some(&'q')));
        assert_eq!(c.advance(&s), Ok(None));
        s.add('p');
        assert!(c.peek(&s).is_ok(), "re-adding a member is not structural");
        s.remove(&'p');
        assert!(c.peek(&s).is_err());
    }
}
