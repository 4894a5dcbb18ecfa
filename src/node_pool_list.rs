//! NodePoolList: a doubly-linked list living in one node array.
//!
//! Every slot of the array belongs to exactly one of two circular,
//! index-linked rings: the live ring (list order, starting at `first`) or
//! the free ring (starting at `free`). Acquiring a node pops the head of the
//! free ring; releasing one pushes it back on the head, so both are O(1).
//! An empty free ring doubles the array; a removal that leaves the list at a
//! quarter of capacity halves it. Both resizes relink the live nodes into
//! slots `0..len` in list order.
//!
//! Slot numbers are never exposed except as the opaque positions of the
//! `Tracked` impl, which a `Cursor` carries without interpreting.

use crate::alloc::{Allocator, Heap};
use crate::buffer::Buffer;
use crate::cursor::{Cursor, Generation, Tracked};
use crate::error::ContainerError;
use core::fmt;
use core::ops::{Index, IndexMut};

/// Smallest node array a list ever has.
pub const MIN_CAPACITY: usize = 32;

const NIL: u32 = u32::MAX;

struct Node<T> {
    next: u32,
    prev: u32,
    value: Option<T>,
}

impl<T> Node<T> {
    fn vacant() -> Self {
        Node {
            next: NIL,
            prev: NIL,
            value: None,
        }
    }
}

pub struct NodePoolList<'a, T, A: Allocator + ?Sized = Heap> {
    nodes: Buffer<'a, Node<T>, A>,
    // Head of the live ring, or NIL when empty.
    first: u32,
    // Head of the free ring, or NIL when every slot is live.
    free: u32,
    len: usize,
    generation: Generation,
}

#[cold]
#[track_caller]
fn out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index {index} is out of bounds for length {len}")
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

fn round_capacity(requested: usize) -> usize {
    let capacity = match requested.max(MIN_CAPACITY).checked_next_power_of_two() {
        Some(c) => c,
        None => capacity_overflow(),
    };
    // Slot numbers are u32 and NIL is reserved.
    if capacity > NIL as usize {
        capacity_overflow();
    }
    capacity
}

/// Close `nodes[start..end]` into a ring in slot order.
fn link_range<T>(nodes: &mut [Node<T>], start: usize, end: usize) {
    for i in start..end {
        let next = if i + 1 == end { start } else { i + 1 };
        let prev = if i == start { end - 1 } else { i - 1 };
        nodes[i].next = next as u32;
        nodes[i].prev = prev as u32;
    }
}

impl<T> NodePoolList<'static, T, Heap> {
    pub fn new() -> Self {
        Self::new_in(Heap::global())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Heap::global())
    }
}

impl<T> Default for NodePoolList<'static, T, Heap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, A: Allocator + ?Sized> NodePoolList<'a, T, A> {
    pub fn new_in(alloc: &'a A) -> Self {
        Self::with_capacity_in(MIN_CAPACITY, alloc)
    }

    pub fn with_capacity_in(capacity: usize, alloc: &'a A) -> Self {
        let capacity = round_capacity(capacity);
        let mut nodes = Buffer::new_with(alloc, capacity, |_| Node::vacant());
        link_range(&mut nodes, 0, capacity);
        Self {
            nodes,
            first: NIL,
            free: 0,
            len: 0,
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

    /// Slots in the node array.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Reallocate at `new_capacity`, moving live values into slots `0..len`
    /// in list order and threading the rest into the free ring.
    fn relink(&mut self, new_capacity: usize) {
        let len = self.len;
        debug_assert!(new_capacity >= len);
        let alloc = self.nodes.allocator();
        let mut old = core::mem::replace(
            &mut self.nodes,
            Buffer::new_with(alloc, new_capacity, |_| Node::vacant()),
        );
        tracing::debug!(from = old.len(), to = new_capacity, len, "node pool relink");
        let mut at = self.first;
        for slot in 0..len {
            let node = &mut old[at as usize];
            self.nodes[slot].value = node.value.take();
            at = node.next;
        }
        link_range(&mut self.nodes, 0, len);
        link_range(&mut self.nodes, len, new_capacity);
        self.first = if len == 0 { NIL } else { 0 };
        self.free = if len == new_capacity { NIL } else { len as u32 };
    }

    /// Detach `n` from whichever ring it is in; returns the ring's new head
    /// candidate (`n`'s successor), or NIL if the ring is now empty.
    fn detach(&mut self, n: u32) -> u32 {
        let Node { next, prev, .. } = self.nodes[n as usize];
        if next == n {
            return NIL;
        }
        self.nodes[prev as usize].next = next;
        self.nodes[next as usize].prev = prev;
        next
    }

    /// Splice the detached node `n` into a ring right before `at`.
    fn attach_before(&mut self, at: u32, n: u32) {
        let prev = self.nodes[at as usize].prev;
        self.nodes[n as usize].next = at;
        self.nodes[n as usize].prev = prev;
        self.nodes[prev as usize].next = n;
        self.nodes[at as usize].prev = n;
    }

    fn attach_alone(&mut self, n: u32) {
        self.nodes[n as usize].next = n;
        self.nodes[n as usize].prev = n;
    }

    /// Pop the head of the free ring, growing first if it is empty.
    fn acquire(&mut self) -> u32 {
        if self.free == NIL {
            let capacity = self.capacity();
            match capacity.checked_mul(2) {
                Some(c) if c <= NIL as usize => self.relink(c),
                _ => capacity_overflow(),
            }
        }
        let n = self.free;
        self.free = self.detach(n);
        n
    }

    /// Push `n` on the head of the free ring.
    fn release(&mut self, n: u32) {
        if self.free == NIL {
            self.attach_alone(n);
        } else {
            self.attach_before(self.free, n);
        }
        self.free = n;
    }

    /// Slot of logical index `index < len`, walking from the nearer end.
    fn node_pos(&self, index: usize) -> u32 {
        debug_assert!(index < self.len);
        let mut at = self.first;
        if index <= self.len / 2 {
            for _ in 0..index {
                at = self.nodes[at as usize].next;
            }
        } else {
            at = self.nodes[at as usize].prev;
            for _ in 0..self.len - 1 - index {
                at = self.nodes[at as usize].prev;
            }
        }
        at
    }

    fn value(&self, n: u32) -> &T {
        match &self.nodes[n as usize].value {
            Some(v) => v,
            None => unreachable!("live node {n} holds no value"),
        }
    }

    fn value_mut(&mut self, n: u32) -> &mut T {
        match &mut self.nodes[n as usize].value {
            Some(v) => v,
            None => unreachable!("live node {n} holds no value"),
        }
    }

    /// Take a free node, store `value`, and place it before `at` in the live
    /// ring (at the tail when `at` is `None`).
    fn link_value(&mut self, at: Option<usize>, value: T) -> u32 {
        let n = self.acquire();
        self.nodes[n as usize].value = Some(value);
        if self.first == NIL {
            self.attach_alone(n);
            self.first = n;
        } else {
            // Resolve the successor after `acquire`, which may relink.
            let before = match at {
                Some(i) => self.node_pos(i),
                None => self.first,
            };
            self.attach_before(before, n);
        }
        self.len += 1;
        self.generation.bump();
        n
    }

    pub fn push(&mut self, value: T) {
        self.link_value(None, value);
    }

    pub fn push_front(&mut self, value: T) {
        let n = self.link_value(None, value);
        self.first = n;
    }

    /// Insert so that `value` ends up at `index`; `index == len` appends.
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<(), ContainerError> {
        if index > self.len {
            return Err(ContainerError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        if index == self.len {
            self.push(value);
        } else {
            let n = self.link_value(Some(index), value);
            if index == 0 {
                self.first = n;
            }
        }
        Ok(())
    }

    /// Unlink live node `n`, recycle its slot, and shrink if the list was
    /// already at a quarter of capacity before the removal.
    fn unlink(&mut self, n: u32) -> T {
        let capacity = self.capacity();
        let shrink = self.len <= capacity / 4 && capacity > MIN_CAPACITY;
        let next = self.detach(n);
        if self.first == n {
            self.first = next;
        }
        let value = self.nodes[n as usize].value.take();
        self.release(n);
        self.len -= 1;
        if shrink {
            self.relink(capacity / 2);
        }
        self.generation.bump();
        match value {
            Some(v) => v,
            None => unreachable!("live node {n} held no value"),
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, ContainerError> {
        if index >= self.len {
            return Err(ContainerError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        let n = self.node_pos(index);
        Ok(self.unlink(n))
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.first == NIL {
            return None;
        }
        let last = self.nodes[self.first as usize].prev;
        Some(self.unlink(last))
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.first == NIL {
            return None;
        }
        Some(self.unlink(self.first))
    }

    pub fn at(&self, index: usize) -> Result<&T, ContainerError> {
        if index >= self.len {
            return Err(ContainerError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(self.value(self.node_pos(index)))
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ContainerError> {
        if index >= self.len {
            return Err(ContainerError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        let n = self.node_pos(index);
        Ok(self.value_mut(n))
    }

    pub fn front(&self) -> Option<&T> {
        (self.first != NIL).then(|| self.value(self.first))
    }

    pub fn back(&self) -> Option<&T> {
        (self.first != NIL).then(|| self.value(self.nodes[self.first as usize].prev))
    }

    /// Drop every value. Capacity is kept and all slots return to the free
    /// ring.
    pub fn clear(&mut self) {
        for node in self.nodes.iter_mut() {
            node.value = None;
        }
        let capacity = self.capacity();
        link_range(&mut self.nodes, 0, capacity);
        self.first = NIL;
        self.free = 0;
        self.len = 0;
        self.generation.bump();
    }

    pub fn iter(&self) -> Iter<'_, T> {
        let back = if self.first == NIL {
            NIL
        } else {
            self.nodes[self.first as usize].prev
        };
        Iter {
            nodes: &self.nodes,
            front: self.first,
            back,
            remaining: self.len,
        }
    }

    /// A cursor that can modify values in place and remove them. Starts at
    /// the first item.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, 'a, T, A> {
        let at = self.first;
        CursorMut {
            list: self,
            at,
            index: 0,
        }
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::new(self)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Check both rings: links agree in both directions, the live ring holds
    /// `len` occupied slots, the free ring the rest, and no slot is in both.
    #[cfg(test)]
    pub(crate) fn assert_rings(&self) {
        let capacity = self.capacity();
        let mut seen = vec![false; capacity];
        let mut walk = |head: u32, expected: usize, occupied: bool| {
            if expected == 0 {
                assert_eq!(head, NIL);
                return;
            }
            let mut at = head;
            for _ in 0..expected {
                let node = &self.nodes[at as usize];
                assert!(!seen[at as usize], "slot {at} reached twice");
                seen[at as usize] = true;
                assert_eq!(node.value.is_some(), occupied, "slot {at} occupancy");
                assert_eq!(self.nodes[node.next as usize].prev, at);
                at = node.next;
            }
            assert_eq!(at, head, "ring did not close after {expected} steps");
        };
        walk(self.first, self.len, true);
        walk(self.free, capacity - self.len, false);
        assert!(seen.iter().all(|s| *s));
    }
}

impl<'a, T: PartialEq, A: Allocator + ?Sized> NodePoolList<'a, T, A> {
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.iter().position(|v| v == value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.index_of(value).is_some()
    }

    /// Remove the first item equal to `value`.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.index_of(value) {
            Some(i) => self.remove_at(i).is_ok(),
            None => false,
        }
    }
}

impl<'a, T, A: Allocator + ?Sized> Index<usize> for NodePoolList<'a, T, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        if index >= self.len {
            out_of_bounds(index, self.len);
        }
        self.value(self.node_pos(index))
    }
}

impl<'a, T, A: Allocator + ?Sized> IndexMut<usize> for NodePoolList<'a, T, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        if index >= self.len {
            out_of_bounds(index, self.len);
        }
        let n = self.node_pos(index);
        self.value_mut(n)
    }
}

impl<'a, T, A: Allocator + ?Sized> Tracked for NodePoolList<'a, T, A> {
    type Item = T;

    fn generation(&self) -> Generation {
        self.generation
    }

    fn start(&self) -> usize {
        self.first as usize
    }

    /// `position` is a slot number. Out-of-range or vacant slots end the
    /// walk, so a cursor taken from another list never panics.
    fn step(&self, position: usize, visited: usize) -> Option<(&T, usize)> {
        if visited >= self.len {
            return None;
        }
        let node = self.nodes.get(position)?;
        node.value.as_ref().map(|v| (v, node.next as usize))
    }
}

impl<'a, T: Clone, A: Allocator + ?Sized> Clone for NodePoolList<'a, T, A> {
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity_in(self.capacity(), self.nodes.allocator());
        for v in self.iter() {
            out.push(v.clone());
        }
        out
    }
}

impl<'a, T: fmt::Debug, A: Allocator + ?Sized> fmt::Debug for NodePoolList<'a, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, 'b, T: PartialEq, A: Allocator + ?Sized, B: Allocator + ?Sized>
    PartialEq<NodePoolList<'b, T, B>> for NodePoolList<'a, T, A>
{
    fn eq(&self, other: &NodePoolList<'b, T, B>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<'a, T: Eq, A: Allocator + ?Sized> Eq for NodePoolList<'a, T, A> {}

impl<'a, T, A: Allocator + ?Sized> Extend<T> for NodePoolList<'a, T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.push(v);
        }
    }
}

impl<T> FromIterator<T> for NodePoolList<'static, T, Heap> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

/// Live-ring iterator.
pub struct Iter<'s, T> {
    nodes: &'s [Node<T>],
    front: u32,
    back: u32,
    remaining: usize,
}

impl<'s, T> Iterator for Iter<'s, T> {
    type Item = &'s T;

    fn next(&mut self) -> Option<&'s T> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.front as usize];
        self.front = node.next;
        self.remaining -= 1;
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'s, T> DoubleEndedIterator for Iter<'s, T> {
    fn next_back(&mut self) -> Option<&'s T> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.back as usize];
        self.back = node.prev;
        self.remaining -= 1;
        node.value.as_ref()
    }
}

impl<'s, T> ExactSizeIterator for Iter<'s, T> {}

impl<'s, 'a, T, A: Allocator + ?Sized> IntoIterator for &'s NodePoolList<'a, T, A> {
    type Item = &'s T;
    type IntoIter = Iter<'s, T>;

    fn into_iter(self) -> Iter<'s, T> {
        self.iter()
    }
}

/// Owning iterator; drains from the front.
pub struct IntoIter<'a, T, A: Allocator + ?Sized = Heap> {
    list: NodePoolList<'a, T, A>,
}

impl<'a, T, A: Allocator + ?Sized> Iterator for IntoIter<'a, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<'a, T, A: Allocator + ?Sized> DoubleEndedIterator for IntoIter<'a, T, A> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop()
    }
}

impl<'a, T, A: Allocator + ?Sized> IntoIterator for NodePoolList<'a, T, A> {
    type Item = T;
    type IntoIter = IntoIter<'a, T, A>;

    fn into_iter(self) -> IntoIter<'a, T, A> {
        IntoIter { list: self }
    }
}

/// Mutable walk over the live ring.
///
/// Besides the items, the cursor has a "ghost" position past the end;
/// moving forward from the last item or backward from the first lands on
/// it, and moving off it wraps to the other end.
pub struct CursorMut<'s, 'a, T, A: Allocator + ?Sized = Heap> {
    list: &'s mut NodePoolList<'a, T, A>,
    at: u32,
    index: usize,
}

impl<'s, 'a, T, A: Allocator + ?Sized> CursorMut<'s, 'a, T, A> {
    /// Logical index of the current item; `None` on the ghost position.
    pub fn index(&self) -> Option<usize> {
        (self.at != NIL).then_some(self.index)
    }

    pub fn current(&mut self) -> Option<&mut T> {
        if self.at == NIL {
            return None;
        }
        Some(self.list.value_mut(self.at))
    }

    pub fn move_next(&mut self) {
        if self.at == NIL {
            self.at = self.list.first;
            self.index = 0;
            return;
        }
        self.index += 1;
        self.at = if self.index == self.list.len {
            NIL
        } else {
            self.list.nodes[self.at as usize].next
        };
    }

    pub fn move_prev(&mut self) {
        if self.at == NIL {
            if let Some(last) = self.list.len.checked_sub(1) {
                self.at = self.list.nodes[self.list.first as usize].prev;
                self.index = last;
            }
            return;
        }
        if self.index == 0 {
            self.at = NIL;
        } else {
            self.index -= 1;
            self.at = self.list.nodes[self.at as usize].prev;
        }
    }

    /// Remove the current item; the cursor moves to the item that followed
    /// it (or the ghost position).
    pub fn remove_current(&mut self) -> Option<T> {
        if self.at == NIL {
            return None;
        }
        let value = self.list.unlink(self.at);
        // The removal may have relinked the array, so re-resolve by index.
        self.at = if self.index < self.list.len {
            self.list.node_pos(self.index)
        } else {
            NIL
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::CountingAllocator;

    #[test]
    fn fresh_list_is_all_free() {
        let l: NodePoolList<u8> = NodePoolList::new();
        assert_eq!(l.capacity(), MIN_CAPACITY);
        assert!(l.is_empty());
        l.assert_rings();
    }

    #[test]
    fn lifo_and_fifo() {
        let mut l: NodePoolList<i32> = (0..10).collect();
        assert_eq!(l.pop(), Some(9));
        assert_eq!(l.pop_front(), Some(0));
        l.push_front(-1);
        assert!(l.iter().copied().eq([-1, 1, 2, 3, 4, 5, 6, 7, 8]));
        assert!(l.iter().rev().copied().eq([8, 7, 6, 5, 4, 3, 2, 1, -1]));
        l.assert_rings();
    }

    /// Invariant: push 64, remove every other one, push 32 more: length is
    /// 64 and no slot is shared between logical positions.
    #[test]
    fn remove_alternate_then_refill() {
        let mut l = NodePoolList::new();
        for i in 0..64 {
            l.push(i);
        }
        assert_eq!(l.capacity(), 64);
        for k in 0..32 {
            assert_eq!(l.remove_at(k), Ok(2 * k));
            l.assert_rings();
        }
        assert!(l.iter().copied().eq((0..32).map(|k| 2 * k + 1)));
        for i in 100..132 {
            l.push(i);
        }
        assert_eq!(l.len(), 64);
        l.assert_rings();
        for k in 0..32 {
            assert_eq!(l[k], 2 * k + 1);
            assert_eq!(l[32 + k], 100 + k);
        }
    }

    /// Invariant: growth relinks in list order and keeps every value.
    #[test]
    fn grow_relinks_in_order() {
        let c = CountingAllocator::new();
        let mut l = NodePoolList::new_in(&c);
        for i in 0..32 {
            if i % 2 == 0 {
                l.push(i);
            } else {
                l.push_front(i);
            }
        }
        let before: Vec<i32> = l.iter().copied().collect();
        l.push(1000);
        assert_eq!(l.capacity(), 64);
        assert_eq!(c.live_allocations(), 1);
        l.assert_rings();
        assert!(l.iter().copied().eq(before.into_iter().chain([1000])));
    }

    /// Invariant: the shrink check sees the length before the removal, so
    /// capacity halves on the removal that takes len below a quarter.
    #[test]
    fn shrink_after_removals() {
        let mut l: NodePoolList<i32> = (0..65).collect();
        assert_eq!(l.capacity(), 128);
        while l.len() > 32 {
            l.pop_front();
        }
        assert_eq!(l.capacity(), 128);
        l.pop_front();
        assert_eq!((l.len(), l.capacity()), (31, 64));
        while l.len() > 16 {
            l.pop();
        }
        assert_eq!(l.capacity(), 64);
        l.pop();
        assert_eq!((l.len(), l.capacity()), (15, 32));
        l.assert_rings();
        assert!(l.iter().copied().eq(34..49));
        while l.pop().is_some() {}
        assert_eq!(l.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn insert_at_positions() {
        let mut l: NodePoolList<i32> = (0..5).collect();
        l.insert_at(0, -1).unwrap();
        l.insert_at(3, 100).unwrap();
        l.insert_at(l.len(), 200).unwrap();
        l.insert_at(5, 300).unwrap();
        assert!(l.iter().copied().eq([-1, 0, 1, 100, 2, 300, 3, 4, 200]));
        assert_eq!(
            l.insert_at(100, 0),
            Err(ContainerError::OutOfBounds { index: 100, len: 9 })
        );
        l.assert_rings();
    }

    #[test]
    fn insert_at_when_full_grows_first() {
        let mut l: NodePoolList<i32> = (0..32).collect();
        l.insert_at(20, -20).unwrap();
        assert_eq!(l.capacity(), 64);
        assert_eq!(l[20], -20);
        assert_eq!(l[21], 20);
        l.assert_rings();
    }

    #[test]
    fn node_pos_walks_from_both_ends() {
        let l: NodePoolList<usize> = (0..31).collect();
        for i in 0..31 {
            assert_eq!(l[i], i);
            assert_eq!(l.at(i), Ok(&i));
        }
        assert!(l.at(31).is_err());
    }

    #[test]
    fn cursor_mut_edits_and_removes() {
        let mut l: NodePoolList<i32> = (0..40).collect();
        {
            let mut c = l.cursor_mut();
            while let Some(v) = c.current() {
                if *v % 2 == 0 {
                    c.remove_current();
                } else {
                    *v *= 10;
                    c.move_next();
                }
            }
            assert_eq!(c.index(), None);
            c.move_prev();
            assert_eq!(c.current().copied(), Some(390));
        }
        assert!(l.iter().copied().eq((0..20).map(|k| (2 * k + 1) * 10)));
        assert_eq!(l.capacity(), 64);
        l.assert_rings();
    }

    #[test]
    fn foreign_slot_positions_end_the_walk() {
        let mut l: NodePoolList<u8> = (0..10).collect();
        assert_eq!(Tracked::step(&l, 10_000, 0), None);
        assert_eq!(Tracked::step(&l, 20, 0), None, "vacant slot");
        assert_eq!(Tracked::step(&l, 3, 0), Some((&3, 4)));
        l.pop_front();
        assert_eq!(Tracked::step(&l, 0, 0), None, "released slot");
    }

    #[test]
    fn clear_returns_every_slot() {
        let mut l: NodePoolList<String> = (0..50).map(|i| i.to_string()).collect();
        l.clear();
        assert!(l.is_empty());
        l.assert_rings();
        l.push("x".into());
        assert_eq!(l.front().map(String::as_str), Some("x"));
        assert_eq!(l.back().map(String::as_str), Some("x"));
    }

    #[test]
    fn clone_and_eq() {
        let l: NodePoolList<i32> = (0..40).collect();
        let mut m = l.clone();
        assert_eq!(l, m);
        m[0] = 7;
        assert_ne!(l, m);
        assert!(l.contains(&39));
        assert_eq!(l.index_of(&5), Some(5));
    }

    #[test]
    fn stale_cursor_after_remove() {
        let mut l: NodePoolList<i32> = (0..4).collect();
        let mut c = l.cursor();
        assert_eq!(c.advance(&l), Ok(Some(&0)));
        l.remove_at(2).unwrap();
        assert!(c.advance(&l).is_err());
        c.rewind(&l);
        let mut seen = Vec::new();
        while let Ok(Some(v)) = c.advance(&l) {
            seen.push(*v);
        }
        assert_eq!(seen, [0, 1, 3]);
    }

    #[test]
    fn drop_releases_nodes() {
        let c = CountingAllocator::new();
        {
            let mut l = NodePoolList::new_in(&c);
            for i in 0..100 {
                l.push(vec![i]);
            }
            assert_eq!(c.live_allocations(), 1);
        }
        assert_eq!(c.live_allocations(), 0);
    }
}
