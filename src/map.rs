//! Map: key/value table with insertion-ordered iteration.

use crate::alloc::{Allocator, Heap};
use crate::amortized_array;
use crate::cursor::{Cursor, Generation, Tracked};
use crate::table::{Entry, OpenAddressTable};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use std::collections::hash_map::RandomState;

/// Open-addressing hash map.
///
/// Iteration follows insertion order; removing an entry closes the gap, so
/// later entries move up by one.
pub struct Map<'a, K, V, S = RandomState, A: Allocator + ?Sized = Heap> {
    table: OpenAddressTable<'a, K, V, S, A>,
}

impl<K, V> Map<'static, K, V, RandomState, Heap> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V, S> Map<'static, K, V, S, Heap> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::with_capacity_and_hasher_in(capacity, hasher, Heap::global())
    }
}

impl<'a, K, V, A: Allocator + ?Sized> Map<'a, K, V, RandomState, A> {
    pub fn new_in(alloc: &'a A) -> Self {
        Self::with_capacity_in(0, alloc)
    }

    pub fn with_capacity_in(capacity: usize, alloc: &'a A) -> Self {
        Self::with_capacity_and_hasher_in(capacity, RandomState::new(), alloc)
    }
}

impl<'a, K, V, S, A: Allocator + ?Sized> Map<'a, K, V, S, A> {
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

    /// Remove every entry, keeping the allocated bins.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V, A> {
        Iter {
            inner: self.table.entries(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V, A> {
        Keys {
            inner: self.table.entries(),
        }
    }

    pub fn values(&self) -> Values<'_, K, V, A> {
        Values {
            inner: self.table.entries(),
        }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.table.entries_mut(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.entries_mut(),
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

impl<'a, K, V, S, A> Map<'a, K, V, S, A>
where
    K: Eq + Hash,
    S: BuildHasher,
    A: Allocator + ?Sized,
{
    /// Insert or update. Returns the previous value when `key` was present;
    /// the length only changes when it was not.
    pub fn assign(&mut self, key: K, value: V) -> Option<V> {
        self.table.insert(key, value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get(key).map(Entry::value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get(key).map(Entry::pair)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get_mut(key).map(Entry::value_mut)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.find(key).is_some()
    }

    /// Remove `key`, returning its value. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key)
    }
}

impl<'a, K, V: PartialEq, S, A: Allocator + ?Sized> Map<'a, K, V, S, A> {
    /// Linear scan over the values.
    pub fn contains_value(&self, value: &V) -> bool {
        self.values().any(|v| v == value)
    }
}

impl<'a, K, Q, V, S, A> Index<&Q> for Map<'a, K, V, S, A>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
    A: Allocator + ?Sized,
{
    type Output = V;

    #[track_caller]
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not found in Map"),
        }
    }
}

impl<'a, K, V, S, A: Allocator + ?Sized> Tracked for Map<'a, K, V, S, A> {
    type Item = Entry<K, V>;

    fn generation(&self) -> Generation {
        self.table.generation()
    }

    fn start(&self) -> usize {
        0
    }

    fn step(&self, position: usize, _visited: usize) -> Option<(&Entry<K, V>, usize)> {
        self.table.entry_at(position).map(|e| (e, position + 1))
    }
}

impl<'a, K, V, S, A> Clone for Map<'a, K, V, S, A>
where
    K: Clone,
    V: Clone,
    S: Clone,
    A: Allocator + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K, V, S: Default> Default for Map<'static, K, V, S, Heap> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<'a, K: fmt::Debug, V: fmt::Debug, S, A: Allocator + ?Sized> fmt::Debug
    for Map<'a, K, V, S, A>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S, A> Extend<(K, V)> for Map<'a, K, V, S, A>
where
    K: Eq + Hash,
    S: BuildHasher,
    A: Allocator + ?Sized,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.assign(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for Map<'static, K, V, S, Heap>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::default();
        m.extend(iter);
        m
    }
}

pub struct Iter<'s, K, V, A: Allocator + ?Sized = Heap> {
    inner: amortized_array::Iter<'s, Entry<K, V>, A>,
}

impl<'s, K, V, A: Allocator + ?Sized> Iterator for Iter<'s, K, V, A> {
    type Item = (&'s K, &'s V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Entry::pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'s, K, V, A: Allocator + ?Sized> ExactSizeIterator for Iter<'s, K, V, A> {}

pub struct IterMut<'s, K, V> {
    inner: amortized_array::IterMut<'s, Entry<K, V>>,
}

impl<'s, K, V> Iterator for IterMut<'s, K, V> {
    type Item = (&'s K, &'s mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Entry::pair_mut)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Keys<'s, K, V, A: Allocator + ?Sized = Heap> {
    inner: amortized_array::Iter<'s, Entry<K, V>, A>,
}

impl<'s, K, V, A: Allocator + ?Sized> Iterator for Keys<'s, K, V, A> {
    type Item = &'s K;

    #[inline]
    fn next(&mut self) -> Option<&'s K> {
        self.inner.next().map(Entry::key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Values<'s, K, V, A: Allocator + ?Sized = Heap> {
    inner: amortized_array::Iter<'s, Entry<K, V>, A>,
}

impl<'s, K, V, A: Allocator + ?Sized> Iterator for Values<'s, K, V, A> {
    type Item = &'s V;

    #[inline]
    fn next(&mut self) -> Option<&'s V> {
        self.inner.next().map(Entry::value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct ValuesMut<'s, K, V> {
    inner: amortized_array::IterMut<'s, Entry<K, V>>,
}

impl<'s, K, V> Iterator for ValuesMut<'s, K, V> {
    type Item = &'s mut V;

    #[inline]
    fn next(&mut self) -> Option<&'s mut V> {
        self.inner.next().map(Entry::value_mut)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'s, 'a, K, V, S, A: Allocator + ?Sized> IntoIterator for &'s Map<'a, K, V, S, A> {
    type Item = (&'s K, &'s V);
    type IntoIter = Iter<'s, K, V, A>;

    fn into_iter(self) -> Iter<'s, K, V, A> {
        self.iter()
    }
}
