//! Counting semaphore
//!
//! The count lives in `0..=max_count`. [`Semaphore::acquire`] waits for a
//! positive count and takes one; [`Semaphore::release`] gives one back and
//! fails if the count is already at its maximum. A semaphore created with
//! `max_count == 1` behaves as a binary semaphore.

use crate::dispatch::{query, Capabilities, Capable};
use crate::port::{Backend, DefaultBackend};
use crate::sync::guard::Lockable;
use crate::trace;
use crate::types::*;

/// Backend half of a counting semaphore.
///
/// Optional: [`get_count`](RawSemaphore::get_count) (`SEMAPHORE_COUNT`).
pub trait RawSemaphore: Capable + Default + Send + Sync {
    /// Busy if already created, Error if `max_count == 0` or
    /// `initial_count > max_count`.
    fn create(&mut self, max_count: u32, initial_count: u32) -> OsStatus;
    fn delete(&mut self) -> OsStatus;
    fn acquire(&self, timeout: Timeout) -> OsStatus;
    /// Error at `max_count`.
    fn release(&self) -> OsStatus;

    fn get_count(&self) -> u32 {
        0
    }
}

/// A counting semaphore with a bounded maximum.
///
/// ```
/// use osal::{OsStatus, Semaphore, NO_WAIT};
///
/// let mut sem: Semaphore = Semaphore::new();
/// sem.create(2, 1);
/// assert_eq!(sem.acquire(NO_WAIT), OsStatus::Ok);
/// assert_eq!(sem.acquire(NO_WAIT), OsStatus::Timeout);
/// assert_eq!(sem.release(), OsStatus::Ok);
/// assert_eq!(sem.get_count(), 1);
/// ```
pub struct Semaphore<B: Backend = DefaultBackend> {
    raw: B::Semaphore,
}

impl<B: Backend> Semaphore<B> {
    pub fn new() -> Self {
        Self {
            raw: B::Semaphore::default(),
        }
    }

    pub fn create(&mut self, max_count: u32, initial_count: u32) -> OsStatus {
        let status = self.raw.create(max_count, initial_count);
        trace::trace_semaphore_create(self.trace_id(), max_count, initial_count, status);
        status
    }

    pub fn delete(&mut self) -> OsStatus {
        trace::trace_semaphore_delete(self.trace_id());
        self.raw.delete()
    }

    pub fn acquire(&self, timeout: Timeout) -> OsStatus {
        let status = self.raw.acquire(timeout);
        trace::trace_semaphore_acquire(self.trace_id(), timeout, status);
        status
    }

    pub fn release(&self) -> OsStatus {
        let status = self.raw.release();
        trace::trace_semaphore_release(self.trace_id(), status);
        status
    }

    /// Current count, or 0 where the backend cannot report it.
    pub fn get_count(&self) -> u32 {
        query::<B::Semaphore, _>(Capabilities::SEMAPHORE_COUNT, 0, || self.raw.get_count())
    }

    #[inline(always)]
    fn trace_id(&self) -> trace::TraceId {
        self as *const Self as *const ()
    }
}

impl<B: Backend> Default for Semaphore<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Drop for Semaphore<B> {
    fn drop(&mut self) {
        let _ = self.raw.delete();
    }
}

impl<B: Backend> Lockable for Semaphore<B> {
    fn lock(&self, timeout: Timeout) -> OsStatus {
        self.acquire(timeout)
    }

    fn unlock(&self) -> OsStatus {
        self.release()
    }
}
