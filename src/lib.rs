//! nge-containers: single-threaded generic containers over an injectable
//! allocator.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small set of engine containers whose memory all flows through
//!   one borrowed `Allocator`, and whose resizes are cheap enough to run
//!   inside a frame loop.
//! - Layers:
//!   - `Allocator` / `Heap` / `CountingAllocator`: acquire/release of raw
//!     blocks. Containers borrow the allocator for their whole lifetime.
//!   - `Buffer<T>` (private): a fully initialized, fixed-length slice in one
//!     allocator block. The only `unsafe` memory handling in the crate.
//!   - `BoundedArray`: fixed capacity, owned storage or a view over caller
//!     slots.
//!   - `AmortizedArray`: circular growable array; grow/shrink migrate the
//!     contents a batch at a time across later operations.
//!   - `NodePoolList`: doubly-linked list in one node array, with live and
//!     free slots threaded into two index rings.
//!   - `OpenAddressTable` (private) behind `Map` and `Set`: linear-probing
//!     bins of indices into a dense `AmortizedArray` of entries.
//!
//! Constraints
//! - Single-threaded: containers are `!Send`/`!Sync` (raw block pointer,
//!   borrowed allocator). No atomics beyond the global byte counter of
//!   `CountingAllocator`.
//! - Containers store `Option<T>` slots, so vacancy is tracked by the type
//!   system instead of by convention; above `Buffer` everything is safe Rust.
//! - Capacities are powers of two with a floor of 32.
//! - Checked operations (`at`, `insert_at`, `remove_at`, `try_push`,
//!   cursor access) return `Result<_, ContainerError>` and leave the
//!   container unchanged on error. `Index`/`IndexMut` and
//!   `BoundedArray::push` panic on a broken precondition.
//!
//! Progressive resize
//! - `AmortizedArray` keeps an explicit `Stable | Migrating` state. Every
//!   mutation first pays one migration batch (`len / 4`, at least 1); reads
//!   resolve pending items through the old buffer. Index order is never
//!   affected by where an item currently lives.
//!
//! Table removal
//! - The entry array stays dense: removal closes the probe run with
//!   backward-shift deletion, compacts the entries, and decrements bin
//!   indices past the removed one. That pass is O(bin_count); no tombstones
//!   are ever left behind, so lookups never degrade.
//! - Probes match on stored hash and `Eq`, never on hash alone.
//! - Each entry stores its hash; rehashing never calls `K: Hash` again.
//! - Every mutation takes `&mut self`, so key `Hash`/`Eq` can only reach
//!   its own table through a shared lookup, which never sees bins in flux.
//!
//! Iterator invalidation
//! - Borrowing iterators cannot outlive a mutation. For positions held
//!   across mutations, `Cursor` records the container's `Generation`;
//!   structural mutations bump it and stale cursors are rejected.
//!
//! Notes and non-goals
//! - No thread-safety, persistence, sorting, or searching beyond equality.
//! - `NodePoolList` exposes slot numbers only as opaque cursor positions;
//!   use `cursor_mut` for in-place edits while walking.

pub mod alloc;
pub mod amortized_array;
pub mod bounded_array;
mod buffer;
pub mod cursor;
pub mod error;
pub mod hash;
pub mod map;
pub mod node_pool_list;
pub mod set;
mod table;

mod amortized_array_proptest;
mod map_proptest;
mod node_pool_list_proptest;

// Public surface
pub use alloc::{Allocator, CountingAllocator, Heap};
pub use amortized_array::AmortizedArray;
pub use bounded_array::BoundedArray;
pub use cursor::{Cursor, Generation, Tracked};
pub use error::ContainerError;
pub use hash::{fnv1a_32, FnvBuildHasher, FnvHasher};
pub use map::Map;
pub use node_pool_list::{CursorMut, NodePoolList};
pub use set::Set;
pub use table::{Entry, BIN_EMPTY, GROW_THRESHOLD, MIN_BINS, SHRINK_THRESHOLD};
