//! BoundedArray: a fixed-capacity contiguous array.
//!
//! Storage is either owned (acquired from the allocator at construction and
//! released on drop) or a view over caller-provided slots. Occupied slots
//! always form the prefix `[0, len)`.

use crate::alloc::{Allocator, Heap};
use crate::buffer::Buffer;
use crate::cursor::{Cursor, Generation, Tracked};
use crate::error::ContainerError;
use core::fmt;
use core::ops::{Index, IndexMut};

/// Capacity used by `BoundedArray::new`.
pub const DEFAULT_CAPACITY: usize = 32;

enum Storage<'a, T, A: Allocator + ?Sized> {
    Owned(Buffer<'a, Option<T>, A>),
    View(&'a mut [Option<T>]),
}

pub struct BoundedArray<'a, T, A: Allocator + ?Sized = Heap> {
    storage: Storage<'a, T, A>,
    len: usize,
    // Used by `clone`, which always produces owned storage.
    alloc: &'a A,
    generation: Generation,
}

#[cold]
#[track_caller]
fn out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index {index} is out of bounds for length {len}")
}

#[cold]
#[track_caller]
fn full(capacity: usize) -> ! {
    panic!("BoundedArray is full (capacity {capacity})")
}

impl<T> BoundedArray<'static, T, Heap> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Heap::global())
    }
}

impl<T> Default for BoundedArray<'static, T, Heap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> BoundedArray<'a, T, Heap> {
    /// View over `storage`; see [`BoundedArray::wrap_in`].
    pub fn wrap(storage: &'a mut [Option<T>]) -> Result<Self, ContainerError> {
        Self::wrap_in(storage, Heap::global())
    }
}

impl<'a, T, A: Allocator + ?Sized> BoundedArray<'a, T, A> {
    pub fn new_in(alloc: &'a A) -> Self {
        Self::with_capacity_in(DEFAULT_CAPACITY, alloc)
    }

    pub fn with_capacity_in(capacity: usize, alloc: &'a A) -> Self {
        Self {
            storage: Storage::Owned(Buffer::new_with(alloc, capacity, |_| None)),
            len: 0,
            alloc,
            generation: Generation::new(),
        }
    }

    /// A view over caller storage. The occupied slots must form a prefix;
    /// they become the initial contents. The storage is never released by
    /// the view, and items left in it when the view is dropped stay there.
    /// `alloc` is only used when the view is cloned.
    pub fn wrap_in(storage: &'a mut [Option<T>], alloc: &'a A) -> Result<Self, ContainerError> {
        let len = storage.iter().take_while(|s| s.is_some()).count();
        if let Some(offset) = storage[len..].iter().position(Option::is_some) {
            return Err(ContainerError::FragmentedView {
                index: len + offset,
            });
        }
        Ok(Self {
            storage: Storage::View(storage),
            len,
            alloc,
            generation: Generation::new(),
        })
    }

    #[inline]
    fn slots(&self) -> &[Option<T>] {
        match &self.storage {
            Storage::Owned(b) => b,
            Storage::View(s) => s,
        }
    }

    #[inline]
    fn slots_mut(&mut self) -> &mut [Option<T>] {
        match &mut self.storage {
            Storage::Owned(b) => b,
            Storage::View(s) => s,
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

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots().len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Whether this array borrows caller storage.
    pub fn is_view(&self) -> bool {
        matches!(self.storage, Storage::View(_))
    }

    /// Append; panics when full. See [`BoundedArray::try_push`].
    #[track_caller]
    pub fn push(&mut self, value: T) {
        if self.is_full() {
            full(self.capacity());
        }
        let len = self.len;
        self.slots_mut()[len] = Some(value);
        self.len += 1;
        self.generation.bump();
    }

    /// Checked append.
    pub fn try_push(&mut self, value: T) -> Result<(), ContainerError> {
        if self.is_full() {
            return Err(ContainerError::Full {
                capacity: self.capacity(),
            });
        }
        self.push(value);
        Ok(())
    }

    /// Prepend, shifting every item right. Panics when full.
    #[track_caller]
    pub fn push_front(&mut self, value: T) {
        if self.is_full() {
            full(self.capacity());
        }
        self.place(0, value);
    }

    fn place(&mut self, index: usize, value: T) {
        let len = self.len;
        let slots = self.slots_mut();
        slots[len] = Some(value);
        slots[index..=len].rotate_right(1);
        self.len += 1;
        self.generation.bump();
    }

    pub fn insert_at(&mut self, index: usize, value: T) -> Result<(), ContainerError> {
        if index > self.len {
            return Err(ContainerError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        if self.is_full() {
            return Err(ContainerError::Full {
                capacity: self.capacity(),
            });
        }
        self.place(index, value);
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, ContainerError> {
        let len = self.len;
        if index >= len {
            return Err(ContainerError::OutOfBounds { index, len });
        }
        let slots = self.slots_mut();
        let value = slots[index].take();
        slots[index..len].rotate_left(1);
        self.len -= 1;
        self.generation.bump();
        value.ok_or(ContainerError::OutOfBounds { index, len })
    }

    pub fn pop(&mut self) -> Option<T> {
        let last = self.len.checked_sub(1)?;
        let value = self.slots_mut()[last].take();
        self.len = last;
        self.generation.bump();
        value
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.remove_at(0).ok()
    }

    pub fn at(&self, index: usize) -> Result<&T, ContainerError> {
        self.slots()[..self.len]
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(ContainerError::OutOfBounds {
                index,
                len: self.len,
            })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ContainerError> {
        let len = self.len;
        self.slots_mut()[..len]
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(ContainerError::OutOfBounds { index, len })
    }

    pub fn clear(&mut self) {
        let len = self.len;
        for slot in &mut self.slots_mut()[..len] {
            *slot = None;
        }
        self.len = 0;
        self.generation.bump();
    }

    /// The occupied prefix `[0, len)` of the contiguous storage. Every slot
    /// in it is `Some`.
    pub fn as_slice(&self) -> &[Option<T>] {
        &self.slots()[..self.len]
    }

    /// Mutable access to the occupied prefix, for in-place edits, swaps and
    /// sorts. Every slot must stay `Some`; a slot emptied here is a gap that
    /// `at` and iteration skip.
    pub fn as_mut_slice(&mut self) -> &mut [Option<T>] {
        let len = self.len;
        &mut self.slots_mut()[..len]
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots()[..self.len].iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let len = self.len;
        IterMut {
            inner: self.slots_mut()[..len].iter_mut(),
        }
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::new(self)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl<'a, T: PartialEq, A: Allocator + ?Sized> BoundedArray<'a, T, A> {
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

impl<'a, T, A: Allocator + ?Sized> Index<usize> for BoundedArray<'a, T, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.at(index) {
            Ok(v) => v,
            Err(_) => out_of_bounds(index, self.len),
        }
    }
}

impl<'a, T, A: Allocator + ?Sized> IndexMut<usize> for BoundedArray<'a, T, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.at_mut(index) {
            Ok(v) => v,
            Err(_) => out_of_bounds(index, len),
        }
    }
}

impl<'a, T, A: Allocator + ?Sized> Tracked for BoundedArray<'a, T, A> {
    type Item = T;

    fn generation(&self) -> Generation {
        self.generation
    }

    fn start(&self) -> usize {
        0
    }

    fn step(&self, position: usize, _visited: usize) -> Option<(&T, usize)> {
        self.at(position).ok().map(|v| (v, position + 1))
    }
}

impl<'a, T: Clone, A: Allocator + ?Sized> Clone for BoundedArray<'a, T, A> {
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity_in(self.capacity(), self.alloc);
        for v in self.iter() {
            out.push(v.clone());
        }
        out
    }
}

impl<'a, T: fmt::Debug, A: Allocator + ?Sized> fmt::Debug for BoundedArray<'a, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, 'b, T: PartialEq, A: Allocator + ?Sized, B: Allocator + ?Sized>
    PartialEq<BoundedArray<'b, T, B>> for BoundedArray<'a, T, A>
{
    fn eq(&self, other: &BoundedArray<'b, T, B>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<'a, T: Eq, A: Allocator + ?Sized> Eq for BoundedArray<'a, T, A> {}

pub struct Iter<'s, T> {
    inner: core::slice::Iter<'s, Option<T>>,
}

impl<'s, T> Iterator for Iter<'s, T> {
    type Item = &'s T;

    #[inline]
    fn next(&mut self) -> Option<&'s T> {
        self.inner.next().and_then(Option::as_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'s, T> DoubleEndedIterator for Iter<'s, T> {
    fn next_back(&mut self) -> Option<&'s T> {
        self.inner.next_back().and_then(Option::as_ref)
    }
}

impl<'s, T> ExactSizeIterator for Iter<'s, T> {}

pub struct IterMut<'s, T> {
    inner: core::slice::IterMut<'s, Option<T>>,
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

impl<'s, T> ExactSizeIterator for IterMut<'s, T> {}

impl<'s, 'a, T, A: Allocator + ?Sized> IntoIterator for &'s BoundedArray<'a, T, A> {
    type Item = &'s T;
    type IntoIter = Iter<'s, T>;

    fn into_iter(self) -> Iter<'s, T> {
        self.iter()
    }
}

impl<'s, 'a, T, A: Allocator + ?Sized> IntoIterator for &'s mut BoundedArray<'a, T, A> {
    type Item = &'s mut T;
    type IntoIter = IterMut<'s, T>;

    fn into_iter(self) -> IterMut<'s, T> {
        self.iter_mut()
    }
}
