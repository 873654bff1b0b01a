//! Fixed-capacity arena allocators for search nodes
//!
//! Every arena reserves all of its slots up front and hands out slot indices.
//! Construction never grows the backing buffer: once the arena is full,
//! [`Arena::construct`] returns `None` and callers degrade gracefully.
//!
//! Slots are write-once cells, which is what lets one worker thread allocate
//! into its own arena through a shared reference while other workers are
//! reading nodes out of it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

/// Common interface of the node pools
pub trait Arena<T>: Send + Sync {
    /// Creates an arena that can hold exactly `capacity` live values
    fn with_capacity(capacity: usize) -> Self
    where
        Self: Sized;

    /// Moves `value` into a free slot and returns the slot index
    ///
    /// Returns `None` when the arena is full; `value` is dropped in that case.
    /// Implementations must succeed whenever [`remain`](Arena::remain) is
    /// non-zero and no other thread constructs into the same arena.
    fn construct(&self, value: T) -> Option<usize>;

    /// Returns the value stored in `slot`, if the slot is live
    fn get(&self, slot: usize) -> Option<&T>;

    /// Frees a single slot for reuse
    ///
    /// Only reclaimable arenas support this; the others return `false`.
    fn destroy(&mut self, slot: usize) -> bool;

    /// Drops every value and makes the whole capacity available again
    fn flush(&mut self);

    /// Total number of slots
    fn capacity(&self) -> usize;

    /// Number of slots currently handed out
    fn len(&self) -> usize;

    /// Returns true if no slot is handed out
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots still available to [`construct`](Arena::construct)
    fn remain(&self) -> usize {
        self.capacity().saturating_sub(self.len())
    }

    /// Returns true if the next [`construct`](Arena::construct) will fail
    fn is_full(&self) -> bool {
        self.remain() == 0
    }
}

fn empty_slots<T>(capacity: usize) -> Box<[OnceLock<T>]> {
    (0..capacity).map(|_| OnceLock::new()).collect()
}

/// Bump allocator: slots are handed out in order and only released together
///
/// This is the arena the drivers use by default.
///
/// # Example
///
/// ```
/// use arena_mcts::arena::{Arena, LinearArena};
///
/// let arena = LinearArena::with_capacity(2);
/// assert_eq!(arena.construct("a"), Some(0));
/// assert_eq!(arena.construct("b"), Some(1));
/// assert_eq!(arena.construct("c"), None);
/// assert!(arena.is_full());
/// ```
pub struct LinearArena<T> {
    slots: Box<[OnceLock<T>]>,
    cursor: AtomicUsize,
}

impl<T: Send + Sync> Arena<T> for LinearArena<T> {
    fn with_capacity(capacity: usize) -> Self {
        LinearArena {
            slots: empty_slots(capacity),
            cursor: AtomicUsize::new(0),
        }
    }

    fn construct(&self, value: T) -> Option<usize> {
        let capacity = self.slots.len();
        let slot = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next < capacity).then_some(next + 1)
            })
            .ok()?;
        self.slots[slot].set(value).ok()?;
        Some(slot)
    }

    fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot)?.get()
    }

    fn destroy(&mut self, _slot: usize) -> bool {
        false
    }

    fn flush(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.take();
        }
        *self.cursor.get_mut() = 0;
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        self.cursor.load(Ordering::Acquire).min(self.slots.len())
    }
}

/// Reclaimable allocator: individual slots can be destroyed and are reused
/// last-freed-first
///
/// Freed slot indices are kept on a stack. The stack is only contended when
/// several threads allocate from the same arena, which the drivers never do.
pub struct StackArena<T> {
    slots: Box<[OnceLock<T>]>,
    free: Mutex<Vec<usize>>,
    live: AtomicUsize,
}

impl<T> StackArena<T> {
    fn initial_free_list(capacity: usize) -> Vec<usize> {
        // Reversed so that a fresh arena hands out slot 0 first.
        (0..capacity).rev().collect()
    }
}

impl<T: Send + Sync> Arena<T> for StackArena<T> {
    fn with_capacity(capacity: usize) -> Self {
        StackArena {
            slots: empty_slots(capacity),
            free: Mutex::new(Self::initial_free_list(capacity)),
            live: AtomicUsize::new(0),
        }
    }

    fn construct(&self, value: T) -> Option<usize> {
        let slot = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()?;
        self.slots[slot].set(value).ok()?;
        self.live.fetch_add(1, Ordering::AcqRel);
        Some(slot)
    }

    fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot)?.get()
    }

    fn destroy(&mut self, slot: usize) -> bool {
        let Some(cell) = self.slots.get_mut(slot) else {
            return false;
        };
        if cell.take().is_none() {
            return false;
        }
        self.free
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(slot);
        *self.live.get_mut() -= 1;
        true
    }

    fn flush(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.take();
        }
        *self.free.get_mut().unwrap_or_else(PoisonError::into_inner) =
            Self::initial_free_list(self.slots.len());
        *self.live.get_mut() = 0;
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}
