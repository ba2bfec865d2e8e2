//! Shared handles to aggregates.

use std::cell::RefCell;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

thread_local! {
    /// Addresses of the handles whose value is being formatted on this thread.
    static FORMATTING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a handle as being formatted until dropped.
struct FormatGuard(usize);

impl FormatGuard {
    /// Returns `None` if the handle at `addr` is already being formatted.
    fn enter(addr: usize) -> Option<Self> {
        FORMATTING.with_borrow_mut(|addrs| {
            if addrs.contains(&addr) {
                None
            } else {
                addrs.push(addr);
                Some(Self(addr))
            }
        })
    }
}

impl Drop for FormatGuard {
    fn drop(&mut self) {
        FORMATTING.with_borrow_mut(|addrs| addrs.retain(|&addr| addr != self.0));
    }
}

/// [`Shared`] is a clonable handle to a value behind a lock.
///
/// Aggregates are registered through this handle so that populating the registered copy is
/// observed by every other holder of the handle, including handlers receiving it as a parameter.
///
/// Only handles registered with [`Descriptor::aggregate`](crate::Descriptor::aggregate) or
/// [`Descriptor::named_aggregate`](crate::Descriptor::named_aggregate) are populated. A handle
/// registered as a plain value is never visited.
///
/// A poisoned lock is recovered by taking the inner value. A handle reached again while its own
/// value is being formatted is printed as `Shared(<cycle>)`.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wraps `value` in a new handle.
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Locks the value for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the value for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles point to the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_tuple("Shared");
        let Some(_guard) = FormatGuard::enter(Arc::as_ptr(&self.0).addr()) else {
            return d.field(&format_args!("<cycle>")).finish();
        };
        match self.0.try_read() {
            Ok(guard) => d.field(&&*guard),
            Err(TryLockError::Poisoned(err)) => d.field(&&*err.into_inner()),
            Err(TryLockError::WouldBlock) => d.field(&format_args!("<locked>")),
        };
        d.finish()
    }
}
