//! Generation-stamped cursors.
//!
//! Borrowing iterators (`iter`, `iter_mut`) cannot outlive a mutation, so
//! the borrow checker already rules out invalidated iteration. A `Cursor`
//! is the detached alternative: it holds a position plus the container's
//! `Generation` at the time it was taken, and every access re-checks the
//! stamp. Any structural change (push, pop, insert, remove, clear, resize)
//! bumps the generation, so a cursor taken before it reports
//! `ContainerError::StaleCursor` instead of reading a shifted element.

use crate::error::ContainerError;

/// Structural version of a container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const fn new() -> Self {
        Generation(0)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// A container that can be walked by a [`Cursor`].
///
/// Positions are opaque to callers: arrays use logical indices, the node
/// list uses slot numbers. `visited` is the number of items already
/// yielded from the start, which lets ring-shaped containers detect the end.
pub trait Tracked {
    type Item;

    /// Current structural generation.
    fn generation(&self) -> Generation;

    /// Position of the first item.
    fn start(&self) -> usize;

    /// Item at `position`, and the position that follows it.
    fn step(&self, position: usize, visited: usize) -> Option<(&Self::Item, usize)>;
}

/// Detached, restartable position into a [`Tracked`] container.
///
/// A cursor is bound to the container it was taken from. The generation
/// check cannot tell two containers apart, so using it on another one
/// yields that container's items at the same opaque position (or ends the
/// walk), never a panic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
    visited: usize,
    stamp: Generation,
}

impl Cursor {
    /// A cursor at the first item of `container`.
    pub fn new<C: Tracked + ?Sized>(container: &C) -> Self {
        Self {
            position: container.start(),
            visited: 0,
            stamp: container.generation(),
        }
    }

    /// Number of items this cursor has moved past; equals the logical index
    /// of the item it currently points at.
    pub fn index(&self) -> usize {
        self.visited
    }

    /// The generation this cursor was taken at.
    pub fn generation(&self) -> Generation {
        self.stamp
    }

    fn check<C: Tracked + ?Sized>(&self, container: &C) -> Result<(), ContainerError> {
        let current = container.generation();
        if current != self.stamp {
            return Err(ContainerError::StaleCursor {
                cursor: self.stamp.get(),
                current: current.get(),
            });
        }
        Ok(())
    }

    /// The item under the cursor, without moving.
    pub fn peek<'c, C: Tracked + ?Sized>(
        &self,
        container: &'c C,
    ) -> Result<Option<&'c C::Item>, ContainerError> {
        self.check(container)?;
        Ok(container
            .step(self.position, self.visited)
            .map(|(item, _)| item))
    }

    /// The item under the cursor; the cursor then moves to the next item.
    /// Returns `Ok(None)` once past the end.
    pub fn advance<'c, C: Tracked + ?Sized>(
        &mut self,
        container: &'c C,
    ) -> Result<Option<&'c C::Item>, ContainerError> {
        self.check(container)?;
        match container.step(self.position, self.visited) {
            Some((item, next)) => {
                self.position = next;
                self.visited += 1;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    /// Move back to the first item and adopt the container's current
    /// generation.
    pub fn rewind<C: Tracked + ?Sized>(&mut self, container: &C) {
        *self = Cursor::new(container);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        items: Vec<u8>,
        generation: Generation,
    }

    impl Tracked for Fixed {
        type Item = u8;
        fn generation(&self) -> Generation {
            self.generation
        }
        fn start(&self) -> usize {
            0
        }
        fn step(&self, position: usize, _visited: usize) -> Option<(&u8, usize)> {
            self.items.get(position).map(|v| (v, position + 1))
        }
    }

    #[test]
    fn walks_then_reports_end() {
        let f = Fixed {
            items: vec![1, 2],
            generation: Generation::new(),
        };
        let mut c = Cursor::new(&f);
        assert_eq!(c.advance(&f), Ok(Some(&1)));
        assert_eq!(c.index(), 1);
        assert_eq!(c.peek(&f), Ok(Some(&2)));
        assert_eq!(c.advance(&f), Ok(Some(&2)));
        assert_eq!(c.advance(&f), Ok(None));
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn stale_after_bump_until_rewound() {
        let mut f = Fixed {
            items: vec![1, 2, 3],
            generation: Generation::new(),
        };
        let mut c = Cursor::new(&f);
        c.advance(&f).unwrap();
        f.generation.bump();
        assert_eq!(
            c.peek(&f),
            Err(ContainerError::StaleCursor { cursor: 0, current: 1 })
        );
        c.rewind(&f);
        assert_eq!(c.advance(&f), Ok(Some(&1)));
    }
}
