//! Allocation capability shared by every container.
//!
//! Containers never own their allocator: they hold `&'a A` and the borrow
//! checker keeps the allocator alive for as long as any container uses it.
//! Buffers handed out by an allocator are owned by the container that
//! requested them and are returned through `release` with the same layout.

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Minimal acquire/release allocation interface.
///
/// # Safety
///
/// Implementors must return memory that is valid for reads and writes of
/// `layout.size()` bytes and aligned to `layout.align()`, and must keep it
/// valid until it is passed back to `release`. Callers never request
/// zero-sized layouts. Failing to allocate must not return: diverge through
/// [`std::alloc::handle_alloc_error`] or abort.
pub unsafe trait Allocator {
    /// Acquire a block for `layout`.
    fn acquire(&self, layout: Layout) -> NonNull<u8>;

    /// Release a block previously returned by `acquire`.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `acquire` on this allocator with the same
    /// `layout`, and must not be used afterwards.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Process-wide default allocator backed by the global heap.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Heap;

static HEAP: Heap = Heap;

impl Heap {
    /// The shared instance used by containers built without an allocator.
    #[inline]
    pub fn global() -> &'static Heap {
        &HEAP
    }
}

unsafe impl Allocator for Heap {
    #[inline]
    fn acquire(&self, layout: Layout) -> NonNull<u8> {
        debug_assert!(layout.size() > 0);
        // SAFETY: callers never request zero-sized layouts.
        let ptr = unsafe { std::alloc::alloc(layout) };
        match NonNull::new(ptr) {
            Some(p) => p,
            None => std::alloc::handle_alloc_error(layout),
        }
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        std::alloc::dealloc(ptr.as_ptr(), layout)
    }
}

static GLOBAL_LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);

/// Diagnostic allocator that counts what passes through it.
///
/// Counts are kept per instance and, for bytes, process-wide. Dropping a
/// `CountingAllocator` that still has live allocations is reported as a leak.
#[derive(Debug)]
pub struct CountingAllocator<'a, A: Allocator + ?Sized = Heap> {
    inner: &'a A,
    live_allocations: Cell<usize>,
    live_bytes: Cell<usize>,
    total_acquired: Cell<usize>,
}

impl CountingAllocator<'static, Heap> {
    pub fn new() -> Self {
        Self::wrapping(Heap::global())
    }
}

impl Default for CountingAllocator<'static, Heap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, A: Allocator + ?Sized> CountingAllocator<'a, A> {
    /// Count allocations performed by `inner`.
    pub fn wrapping(inner: &'a A) -> Self {
        Self {
            inner,
            live_allocations: Cell::new(0),
            live_bytes: Cell::new(0),
            total_acquired: Cell::new(0),
        }
    }

    /// Blocks acquired and not yet released.
    pub fn live_allocations(&self) -> usize {
        self.live_allocations.get()
    }

    /// Bytes acquired and not yet released.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }

    /// Blocks acquired over the lifetime of this allocator.
    pub fn total_acquired(&self) -> usize {
        self.total_acquired.get()
    }

    /// Bytes live across every `CountingAllocator` in the process.
    pub fn global_live_bytes() -> usize {
        GLOBAL_LIVE_BYTES.load(Ordering::Relaxed)
    }
}

unsafe impl<'a, A: Allocator + ?Sized> Allocator for CountingAllocator<'a, A> {
    fn acquire(&self, layout: Layout) -> NonNull<u8> {
        let ptr = self.inner.acquire(layout);
        self.live_allocations.set(self.live_allocations.get() + 1);
        self.live_bytes.set(self.live_bytes.get() + layout.size());
        self.total_acquired.set(self.total_acquired.get() + 1);
        GLOBAL_LIVE_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        tracing::trace!(bytes = layout.size(), live = self.live_allocations.get(), "acquire");
        ptr
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        let live = self.live_allocations.get();
        let bytes = self.live_bytes.get();
        assert!(live > 0, "CountingAllocator release without matching acquire");
        debug_assert!(bytes >= layout.size());
        self.live_allocations.set(live - 1);
        self.live_bytes.set(bytes - layout.size());
        GLOBAL_LIVE_BYTES.fetch_sub(layout.size(), Ordering::Relaxed);
        tracing::trace!(bytes = layout.size(), live = live - 1, "release");
        self.inner.release(ptr, layout)
    }
}

impl<'a, A: Allocator + ?Sized> Drop for CountingAllocator<'a, A> {
    fn drop(&mut self) {
        let live = self.live_allocations.get();
        if live > 0 {
            tracing::error!(
                allocations = live,
                bytes = self.live_bytes.get(),
                "counting allocator dropped with live allocations"
            );
            if !std::thread::panicking() {
                debug_assert_eq!(live, 0, "memory leak detected by CountingAllocator");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_round_trip() {
        let layout = Layout::array::<u64>(16).unwrap();
        let p = Heap.acquire(layout);
        unsafe {
            p.as_ptr().cast::<u64>().write(7);
            assert_eq!(p.as_ptr().cast::<u64>().read(), 7);
            Heap.release(p, layout);
        }
    }

    #[test]
    fn counting_tracks_live_and_total() {
        let c = CountingAllocator::new();
        let a = Layout::array::<u32>(8).unwrap();
        let b = Layout::array::<u8>(3).unwrap();
        let pa = c.acquire(a);
        let pb = c.acquire(b);
        assert_eq!(c.live_allocations(), 2);
        assert_eq!(c.live_bytes(), 35);
        unsafe { c.release(pa, a) };
        assert_eq!(c.live_allocations(), 1);
        assert_eq!(c.live_bytes(), 3);
        unsafe { c.release(pb, b) };
        assert_eq!(c.live_allocations(), 0);
        assert_eq!(c.total_acquired(), 2);
    }

    #[test]
    fn counting_can_wrap_another_counter() {
        let outer = CountingAllocator::new();
        let inner = CountingAllocator::wrapping(&outer);
        let l = Layout::new::<u128>();
        let p = inner.acquire(l);
        assert_eq!(outer.live_allocations(), 1);
        assert_eq!(inner.live_allocations(), 1);
        unsafe { inner.release(p, l) };
        assert_eq!(outer.live_allocations(), 0);
    }
}
