//! Fixed-length, fully initialized slices backed by an injected allocator.
//!
//! `Buffer` is the only place in the crate that touches raw memory. Every
//! slot is initialized at construction and dropped on release, so the
//! containers built on top of it work with ordinary safe slices.

use crate::alloc::Allocator;
use core::alloc::Layout;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;

pub(crate) struct Buffer<'a, T, A: Allocator + ?Sized> {
    ptr: NonNull<T>,
    // Initialized slots; equals `cap` once construction finishes.
    len: usize,
    cap: usize,
    alloc: &'a A,
    _owns: PhantomData<T>,
}

impl<'a, T, A: Allocator + ?Sized> Buffer<'a, T, A> {
    /// Acquire `len` slots from `alloc`, initializing slot `i` with `fill(i)`.
    pub(crate) fn new_with<F>(alloc: &'a A, len: usize, mut fill: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        let layout = Self::layout(len);
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            alloc.acquire(layout).cast::<T>()
        };
        let mut buf = Self {
            ptr,
            len: 0,
            cap: len,
            alloc,
            _owns: PhantomData,
        };
        // A panicking `fill` leaves `len` at the written prefix, which is
        // all `Drop` will drop.
        for i in 0..len {
            // SAFETY: `i < cap` and the block holds `cap` slots of `T`.
            unsafe { buf.ptr.as_ptr().add(i).write(fill(i)) };
            buf.len = i + 1;
        }
        buf
    }

    fn layout(len: usize) -> Layout {
        match Layout::array::<T>(len) {
            Ok(l) => l,
            Err(_) => capacity_overflow(),
        }
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &'a A {
        self.alloc
    }
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

impl<'a, T, A: Allocator + ?Sized> Deref for Buffer<'a, T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized and owned by us.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<'a, T, A: Allocator + ?Sized> DerefMut for Buffer<'a, T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: as in `deref`, and `&mut self` guarantees exclusivity.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<'a, T, A: Allocator + ?Sized> Drop for Buffer<'a, T, A> {
    fn drop(&mut self) {
        let len = self.len;
        // SAFETY: exactly `len` slots were initialized.
        unsafe {
            core::ptr::drop_in_place(core::ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), len));
        }
        let layout = Self::layout(self.cap);
        if layout.size() != 0 {
            // SAFETY: the block came from `alloc.acquire` with this layout.
            unsafe { self.alloc.release(self.ptr.cast::<u8>(), layout) };
        }
    }
}

impl<'a, T: core::fmt::Debug, A: Allocator + ?Sized> core::fmt::Debug for Buffer<'a, T, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
