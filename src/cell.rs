//! Cells for state shared between interrupt producers and the main loop.
//!
//! The cell type names the access discipline:
//!
//! | Cell | Writers | Readers | Access |
//! |------|---------|---------|--------|
//! | [`SharedCell`] | any context | any context | inside a critical section |
//! | [`WordCell`] | exactly one context | any context | single atomic word load/store |
//!
//! Anything wider than a machine word, or written from more than one context,
//! goes in a [`SharedCell`]. Closures passed to [`SharedCell::lock`] should
//! only copy data in or out; conversion work belongs outside.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;

// =============================================================================
// SharedCell
// =============================================================================

/// Aggregate guarded by a global critical section.
pub struct SharedCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> SharedCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access, interrupts masked.
    #[inline]
    pub fn lock<R>(
        &self,
        f: impl FnOnce(&mut T) -> R,
    ) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }
}

impl<T: Copy> SharedCell<T> {
    /// Copy the whole value out in one critical section.
    #[inline]
    pub fn snapshot(&self) -> T { self.lock(|value| *value) }
}

// =============================================================================
// WordCell
// =============================================================================

/// One machine word with a single writing context.
///
/// Loads and stores are individually atomic, so readers in other contexts
/// never see a torn value. Read-modify-write sequences are only correct
/// because one context owns every store; the owning port keeps `store`
/// reachable from that context alone.
pub struct WordCell {
    word: AtomicU32,
}

impl WordCell {
    pub const fn new(value: u32) -> Self {
        Self {
            word: AtomicU32::new(value),
        }
    }

    #[inline]
    pub fn load(&self) -> u32 { self.word.load(Ordering::Acquire) }

    #[inline]
    pub(crate) fn store(
        &self,
        value: u32,
    ) {
        self.word.store(value, Ordering::Release);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
