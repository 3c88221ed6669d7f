//! Worker threads
//!
//! A [`Thread`] owns one execution context running a user entry function.
//! Stopping is cooperative: the entry receives a [`StopToken`] and is
//! expected to return once [`StopToken::stop_requested`] turns true.
//! [`Thread::terminate`] raises the token and waits for the entry to return.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::dispatch::{query, Capabilities, Capable};
use crate::port::{Backend, DefaultBackend};
use crate::trace;
use crate::types::*;

/// Entry type handed to the backend.
pub type ThreadEntry = Box<dyn FnOnce(&StopToken) + Send + 'static>;

/// Cooperative cancellation flag shared between a thread and its owner.
#[derive(Clone, Debug, Default)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the owner asked the thread to finish.
    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

/// Backend half of a thread.
///
/// Optional: `join` (`THREAD_JOIN`), `detach` (`THREAD_DETACH`),
/// `is_running` (`THREAD_IS_RUNNING`), `name` (`THREAD_NAME`), `priority`
/// (`THREAD_PRIORITY`), `stack_size` (`THREAD_STACK_SIZE`), `suspend` and
/// `resume` (`THREAD_SUSPEND`), `set_priority` (`THREAD_SET_PRIORITY`) and
/// `set_affinity` (`THREAD_SET_AFFINITY`).
pub trait RawThread: Capable + Default + Send + Sync {
    /// Busy while a previous thread is still attached. A `stack_size` of 0
    /// selects the port default.
    fn create(&mut self, name: &str, entry: ThreadEntry, stack_size: usize, priority: ThreadPriority) -> OsStatus;

    /// Requests a stop and waits for the entry to return. Ok when nothing is
    /// attached.
    fn terminate(&self) -> OsStatus;

    fn join(&self) -> OsStatus {
        OsStatus::Error
    }

    fn detach(&self) -> OsStatus {
        OsStatus::Error
    }

    fn is_running(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        ""
    }

    fn priority(&self) -> ThreadPriority {
        ThreadPriority::Normal
    }

    fn stack_size(&self) -> usize {
        0
    }

    fn suspend(&self) -> OsStatus {
        OsStatus::Error
    }

    fn resume(&self) -> OsStatus {
        OsStatus::Error
    }

    fn set_priority(&self, priority: ThreadPriority) -> OsStatus {
        let _ = priority;
        OsStatus::Error
    }

    fn set_affinity(&self, core: u32) -> OsStatus {
        let _ = core;
        OsStatus::Error
    }
}

/// An owned worker thread. Dropping it terminates the thread.
///
/// ```
/// use osal::{OsStatus, Thread, ThreadPriority};
///
/// let mut worker: Thread = Thread::new();
/// let status = worker.create(
///     "poller",
///     |stop| {
///         while !stop.stop_requested() {
///             std::thread::yield_now();
///         }
///     },
///     0,
///     ThreadPriority::Normal,
/// );
/// assert_eq!(status, OsStatus::Ok);
/// assert_eq!(worker.name(), "poller");
/// assert_eq!(worker.terminate(), OsStatus::Ok);
/// assert!(!worker.is_running());
/// ```
pub struct Thread<B: Backend = DefaultBackend> {
    raw: B::Thread,
}

impl<B: Backend> Thread<B> {
    pub fn new() -> Self {
        Self {
            raw: B::Thread::default(),
        }
    }

    pub fn create<F>(&mut self, name: &str, entry: F, stack_size: usize, priority: ThreadPriority) -> OsStatus
    where
        F: FnOnce(&StopToken) + Send + 'static,
    {
        let status = self.raw.create(name, Box::new(entry), stack_size, priority);
        trace::trace_thread_create(self.trace_id(), name, stack_size, status);
        status
    }

    pub fn terminate(&self) -> OsStatus {
        let status = self.raw.terminate();
        trace::trace_thread_terminate(self.trace_id(), status);
        status
    }

    /// Waits for the entry to return. Error if nothing is attached, when
    /// called from the thread itself, or if the entry panicked.
    pub fn join(&self) -> OsStatus {
        let status = query::<B::Thread, _>(Capabilities::THREAD_JOIN, OsStatus::Error, || self.raw.join());
        trace::trace_thread_join(self.trace_id(), status);
        status
    }

    /// Lets the thread run on unowned.
    pub fn detach(&self) -> OsStatus {
        query::<B::Thread, _>(Capabilities::THREAD_DETACH, OsStatus::Error, || self.raw.detach())
    }

    pub fn is_running(&self) -> bool {
        query::<B::Thread, _>(Capabilities::THREAD_IS_RUNNING, false, || self.raw.is_running())
    }

    pub fn name(&self) -> &str {
        query::<B::Thread, _>(Capabilities::THREAD_NAME, "", || self.raw.name())
    }

    pub fn priority(&self) -> ThreadPriority {
        query::<B::Thread, _>(Capabilities::THREAD_PRIORITY, ThreadPriority::Normal, || self.raw.priority())
    }

    pub fn stack_size(&self) -> usize {
        query::<B::Thread, _>(Capabilities::THREAD_STACK_SIZE, 0, || self.raw.stack_size())
    }

    pub fn suspend(&self) -> OsStatus {
        query::<B::Thread, _>(Capabilities::THREAD_SUSPEND, OsStatus::Error, || self.raw.suspend())
    }

    pub fn resume(&self) -> OsStatus {
        query::<B::Thread, _>(Capabilities::THREAD_SUSPEND, OsStatus::Error, || self.raw.resume())
    }

    pub fn set_priority(&self, priority: ThreadPriority) -> OsStatus {
        query::<B::Thread, _>(Capabilities::THREAD_SET_PRIORITY, OsStatus::Error, || {
            self.raw.set_priority(priority)
        })
    }

    pub fn set_affinity(&self, core: u32) -> OsStatus {
        query::<B::Thread, _>(Capabilities::THREAD_SET_AFFINITY, OsStatus::Error, || self.raw.set_affinity(core))
    }

    #[inline(always)]
    fn trace_id(&self) -> trace::TraceId {
        self as *const Self as *const ()
    }
}

impl<B: Backend> Default for Thread<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Drop for Thread<B> {
    fn drop(&mut self) {
        let _ = self.raw.terminate();
    }
}
