//! Scoped locking
//!
//! [`LockGuard`] acquires any [`Lockable`] primitive on construction and
//! releases it when dropped. Acquisition may fail (timeout, not created), so
//! the guard records whether it actually owns the lock and only releases what
//! it took.

use core::marker::PhantomData;

use crate::types::{OsStatus, Timeout, WAIT_FOREVER};

/// Anything with mutex-shaped acquire/release.
pub trait Lockable {
    fn lock(&self, timeout: Timeout) -> OsStatus;
    fn unlock(&self) -> OsStatus;
}

impl<L: Lockable + ?Sized> Lockable for &L {
    fn lock(&self, timeout: Timeout) -> OsStatus {
        (**self).lock(timeout)
    }

    fn unlock(&self) -> OsStatus {
        (**self).unlock()
    }
}

/// RAII lock over a [`Lockable`].
///
/// # Example
///
/// ```
/// use osal::{LockGuard, Mutex};
///
/// let mut m: Mutex = Mutex::new();
/// m.create(false);
/// {
///     let guard = LockGuard::new(&m);
///     assert!(guard.owns());
///     // lock held here
/// }
/// // released
/// ```
#[must_use = "if unused the lock is released immediately"]
pub struct LockGuard<'a, L: Lockable + ?Sized> {
    lock: &'a L,
    owned: bool,
    // Release must happen on the acquiring thread.
    _not_send: PhantomData<*const ()>,
}

impl<'a, L: Lockable + ?Sized> LockGuard<'a, L> {
    /// Acquires `lock`, waiting as long as it takes.
    pub fn new(lock: &'a L) -> Self {
        Self::with_timeout(lock, WAIT_FOREVER)
    }

    /// Acquires `lock`, giving up after `timeout` ms. Check [`owns`](Self::owns).
    pub fn with_timeout(lock: &'a L, timeout: Timeout) -> Self {
        let owned = lock.lock(timeout).is_ok();
        Self {
            lock,
            owned,
            _not_send: PhantomData,
        }
    }

    /// Whether acquisition succeeded.
    #[inline]
    pub fn owns(&self) -> bool {
        self.owned
    }

    /// Releases early and reports the release status.
    pub fn unlock(mut self) -> OsStatus {
        if !self.owned {
            return OsStatus::Error;
        }
        self.owned = false;
        self.lock.unlock()
    }
}

impl<L: Lockable + ?Sized> Drop for LockGuard<'_, L> {
    fn drop(&mut self) {
        if self.owned {
            let _ = self.lock.unlock();
        }
    }
}
