//! Mutual exclusion lock
//!
//! A [`Mutex`] guards a critical section rather than a value: it is created
//! in place, locked with an explicit timeout and unlocked by the thread that
//! holds it. A recursive mutex may be relocked by its owner and must be
//! unlocked the same number of times before another thread can take it.
//!
//! Use [`Mutex::guard`] (or [`LockGuard`]) to tie the locked region to a
//! scope.

use crate::dispatch::{query, Capabilities, Capable};
use crate::port::{Backend, DefaultBackend};
use crate::sync::guard::{LockGuard, Lockable};
use crate::trace;
use crate::types::*;

/// Backend half of a mutex.
///
/// Optional: [`try_lock`](RawMutex::try_lock) (`TRY_LOCK`).
pub trait RawMutex: Capable + Default + Send + Sync {
    /// Busy if already created.
    fn create(&mut self, recursive: bool) -> OsStatus;
    /// Ok whether or not the mutex exists.
    fn delete(&mut self) -> OsStatus;
    fn lock(&self, timeout: Timeout) -> OsStatus;
    /// Error unless the caller holds the lock.
    fn unlock(&self) -> OsStatus;

    fn try_lock(&self) -> OsStatus {
        OsStatus::Error
    }
}

/// A mutual exclusion lock with timed acquisition.
///
/// # Example
///
/// ```
/// use osal::{Mutex, OsStatus, WAIT_FOREVER};
///
/// let mut m: Mutex = Mutex::new();
/// assert_eq!(m.create(false), OsStatus::Ok);
/// assert_eq!(m.lock(WAIT_FOREVER), OsStatus::Ok);
/// assert_eq!(m.unlock(), OsStatus::Ok);
///
/// {
///     let _held = m.guard();
///     // critical section
/// }
/// assert_eq!(m.try_lock(), OsStatus::Ok);
/// assert_eq!(m.unlock(), OsStatus::Ok);
/// ```
pub struct Mutex<B: Backend = DefaultBackend> {
    raw: B::Mutex,
}

impl<B: Backend> Mutex<B> {
    /// Returns a mutex in the not-created state.
    pub fn new() -> Self {
        Self { raw: B::Mutex::default() }
    }

    pub fn create(&mut self, recursive: bool) -> OsStatus {
        let status = self.raw.create(recursive);
        trace::trace_mutex_create(self.trace_id(), recursive, status);
        status
    }

    /// Releases the underlying lock. Deleting twice is fine.
    pub fn delete(&mut self) -> OsStatus {
        trace::trace_mutex_delete(self.trace_id());
        self.raw.delete()
    }

    pub fn lock(&self, timeout: Timeout) -> OsStatus {
        let status = self.raw.lock(timeout);
        trace::trace_mutex_lock(self.trace_id(), timeout, status);
        status
    }

    pub fn unlock(&self) -> OsStatus {
        let status = self.raw.unlock();
        trace::trace_mutex_unlock(self.trace_id(), status);
        status
    }

    /// Same as `lock(NO_WAIT)`. Error on backends without `TRY_LOCK`.
    pub fn try_lock(&self) -> OsStatus {
        let status = query::<B::Mutex, _>(Capabilities::TRY_LOCK, OsStatus::Error, || self.raw.try_lock());
        trace::trace_mutex_lock(self.trace_id(), NO_WAIT, status);
        status
    }

    /// Locks with no deadline and unlocks when the guard goes out of scope.
    pub fn guard(&self) -> LockGuard<'_, Self> {
        LockGuard::new(self)
    }

    /// Like [`guard`](Self::guard), but gives up after `timeout` ms.
    pub fn guard_timeout(&self, timeout: Timeout) -> LockGuard<'_, Self> {
        LockGuard::with_timeout(self, timeout)
    }

    #[inline(always)]
    fn trace_id(&self) -> trace::TraceId {
        self as *const Self as *const ()
    }
}

impl<B: Backend> Default for Mutex<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Drop for Mutex<B> {
    fn drop(&mut self) {
        let _ = self.raw.delete();
    }
}

impl<B: Backend> Lockable for Mutex<B> {
    fn lock(&self, timeout: Timeout) -> OsStatus {
        Mutex::lock(self, timeout)
    }

    fn unlock(&self) -> OsStatus {
        Mutex::unlock(self)
    }
}
