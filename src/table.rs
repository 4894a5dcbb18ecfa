//! OpenAddressTable: linear-probing bins over a dense entry array.
//!
//! Entries live in an `AmortizedArray` in insertion order; bins hold an
//! entry index or `BIN_EMPTY`. Each entry keeps the hash computed at insert,
//! so rehashing never calls back into `K: Hash`.
//!
//! Removal keeps the entry array dense: the removed entry's bin is emptied,
//! the probe chain behind it is closed by backward-shift deletion (no
//! tombstones), the entry is removed from the array, and every bin pointing
//! past it is decremented. That last pass is O(bin_count) per removal.

use crate::alloc::Allocator;
use crate::amortized_array::{self, AmortizedArray};
use crate::buffer::Buffer;
use crate::cursor::Generation;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

/// Smallest bin count.
pub const MIN_BINS: usize = 32;
/// Grow when `bins_in_use * 100 / bin_count` reaches this before an insert.
pub const GROW_THRESHOLD: usize = 70;
/// Shrink when `bins_in_use * 100 / bin_count` is at most this before a
/// removal.
pub const SHRINK_THRESHOLD: usize = 30;
/// Marker for a vacant bin.
pub const BIN_EMPTY: u32 = u32::MAX;

/// A stored key/value pair.
pub struct Entry<K, V> {
    hash: u64,
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) fn pair(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    pub(crate) fn pair_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }
}

impl<K: Clone, V: Clone> Clone for Entry<K, V> {
    fn clone(&self) -> Self {
        Entry {
            hash: self.hash,
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entry").field(&self.key).field(&self.value).finish()
    }
}

enum Probe {
    Found { bin: usize, index: usize },
    Vacant(usize),
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

/// Bins needed to hold `capacity` entries below the grow threshold.
fn bins_for(capacity: usize) -> usize {
    let wanted = capacity
        .checked_mul(100)
        .map(|n| n / GROW_THRESHOLD + 1)
        .and_then(|n| n.max(MIN_BINS).checked_next_power_of_two());
    match wanted {
        Some(n) if n <= BIN_EMPTY as usize => n,
        _ => capacity_overflow(),
    }
}

pub(crate) struct OpenAddressTable<'a, K, V, S, A: Allocator + ?Sized> {
    hasher: S,
    entries: AmortizedArray<'a, Entry<K, V>, A>,
    bins: Buffer<'a, u32, A>,
    bins_in_use: usize,
}

impl<'a, K, V, S, A: Allocator + ?Sized> OpenAddressTable<'a, K, V, S, A> {
    pub(crate) fn with_capacity_and_hasher_in(capacity: usize, hasher: S, alloc: &'a A) -> Self {
        Self {
            hasher,
            entries: AmortizedArray::with_capacity_in(capacity, alloc),
            bins: Buffer::new_with(alloc, bins_for(capacity), |_| BIN_EMPTY),
            bins_in_use: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub(crate) fn hasher(&self) -> &S {
        &self.hasher
    }

    pub(crate) fn generation(&self) -> Generation {
        self.entries.generation()
    }

    pub(crate) fn entry_at(&self, index: usize) -> Option<&Entry<K, V>> {
        self.entries.at(index).ok()
    }

    pub(crate) fn entries(&self) -> amortized_array::Iter<'_, Entry<K, V>, A> {
        self.entries.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> amortized_array::IterMut<'_, Entry<K, V>> {
        self.entries.iter_mut()
    }

    /// Rebuild the bins at `bin_count` from the stored hashes.
    fn resize(&mut self, bin_count: usize) {
        tracing::debug!(
            from = self.bins.len(),
            to = bin_count,
            len = self.entries.len(),
            "table rehash"
        );
        let alloc = self.bins.allocator();
        self.bins = Buffer::new_with(alloc, bin_count, |_| BIN_EMPTY);
        let mask = bin_count - 1;
        for (index, entry) in self.entries.iter().enumerate() {
            let mut bin = entry.hash as usize & mask;
            while self.bins[bin] != BIN_EMPTY {
                bin = (bin + 1) & mask;
            }
            self.bins[bin] = index as u32;
        }
    }

    fn load(&self) -> usize {
        self.bins_in_use * 100 / self.bins.len()
    }

    /// Close the gap left at `hole` by pulling back later members of the
    /// probe run whose home bin lies at or before the hole.
    fn close_gap(&mut self, mut hole: usize) {
        let mask = self.bins.len() - 1;
        let mut j = (hole + 1) & mask;
        loop {
            let slot = self.bins[j];
            if slot == BIN_EMPTY {
                break;
            }
            let home = self.entries[slot as usize].hash as usize & mask;
            if j.wrapping_sub(home) & mask >= j.wrapping_sub(hole) & mask {
                self.bins[hole] = slot;
                self.bins[j] = BIN_EMPTY;
                hole = j;
            }
            j = (j + 1) & mask;
        }
    }

    /// Drop every entry; bins and entry capacity are kept.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        for bin in self.bins.iter_mut() {
            *bin = BIN_EMPTY;
        }
        self.bins_in_use = 0;
    }

    /// Bins and entries must agree: every occupied bin points at a distinct
    /// entry whose probe run from its home bin reaches it without a gap.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mask = self.bins.len() - 1;
        let mut seen = vec![false; self.entries.len()];
        let mut occupied = 0;
        for (bin, &slot) in self.bins.iter().enumerate() {
            if slot == BIN_EMPTY {
                continue;
            }
            occupied += 1;
            let index = slot as usize;
            assert!(index < self.entries.len(), "bin {bin} points past the entries");
            assert!(!seen[index], "entry {index} referenced twice");
            seen[index] = true;
            let mut b = self.entries[index].hash as usize & mask;
            while b != bin {
                assert_ne!(self.bins[b], BIN_EMPTY, "gap in probe run for entry {index}");
                b = (b + 1) & mask;
            }
        }
        assert_eq!(occupied, self.bins_in_use);
        assert_eq!(occupied, self.entries.len());
    }
}

impl<'a, K, V, S, A> OpenAddressTable<'a, K, V, S, A>
where
    K: Eq + Hash,
    S: BuildHasher,
    A: Allocator + ?Sized,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn probe<Q>(&self, hash: u64, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mask = self.bins.len() - 1;
        let mut bin = hash as usize & mask;
        loop {
            let slot = self.bins[bin];
            if slot == BIN_EMPTY {
                return Probe::Vacant(bin);
            }
            let entry = &self.entries[slot as usize];
            if entry.hash == hash && entry.key.borrow() == q {
                return Probe::Found {
                    bin,
                    index: slot as usize,
                };
            }
            bin = (bin + 1) & mask;
        }
    }

    /// Index of the entry for `q`.
    pub(crate) fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        match self.probe(hash, q) {
            Probe::Found { index, .. } => Some(index),
            Probe::Vacant(_) => None,
        }
    }

    pub(crate) fn get<Q>(&self, q: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.find(q)?;
        Some(&self.entries[index])
    }

    pub(crate) fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.find(q)?;
        Some(&mut self.entries[index])
    }

    /// Insert `key`, or overwrite the value of an equal key already present
    /// and return the previous value.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.load() >= GROW_THRESHOLD {
            match self.bins.len().checked_mul(2) {
                Some(n) if n <= BIN_EMPTY as usize => self.resize(n),
                _ => capacity_overflow(),
            }
        }
        let hash = self.make_hash(&key);
        match self.probe(hash, &key) {
            Probe::Found { index, .. } => {
                Some(core::mem::replace(&mut self.entries[index].value, value))
            }
            Probe::Vacant(bin) => {
                self.bins[bin] = self.entries.len() as u32;
                self.entries.push(Entry { hash, key, value });
                self.bins_in_use += 1;
                None
            }
        }
    }

    /// Remove the entry for `q`. May shrink the bins first, even when `q`
    /// turns out to be absent.
    pub(crate) fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let bin_count = self.bins.len();
        if self.load() <= SHRINK_THRESHOLD && bin_count > MIN_BINS {
            self.resize(bin_count / 2);
        }
        let hash = self.make_hash(q);
        let Probe::Found { bin, index } = self.probe(hash, q) else {
            return None;
        };
        self.bins[bin] = BIN_EMPTY;
        self.close_gap(bin);
        let entry = self.entries.remove_at(index).ok()?;
        let removed = index as u32;
        for slot in self.bins.iter_mut() {
            if *slot != BIN_EMPTY && *slot > removed {
                *slot -= 1;
            }
        }
        self.bins_in_use -= 1;
        Some((entry.key, entry.value))
    }
}

impl<'a, K, V, S, A> Clone for OpenAddressTable<'a, K, V, S, A>
where
    K: Clone,
    V: Clone,
    S: Clone,
    A: Allocator + ?Sized,
{
    fn clone(&self) -> Self {
        // Entry order is preserved, so the bins can be copied as they are.
        let bins = &self.bins;
        Self {
            hasher: self.hasher.clone(),
            entries: self.entries.clone(),
            bins: Buffer::new_with(bins.allocator(), bins.len(), |i| bins[i]),
            bins_in_use: self.bins_in_use,
        }
    }
}
