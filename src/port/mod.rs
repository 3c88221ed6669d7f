/*
 * SPDX-License-Identifier: MIT
 *
 * The port layer bundles one concrete implementation of every primitive
 * together with the time services of the underlying scheduler. Application
 * code picks a port once (a type parameter, or an `Osal` value) and everything
 * else is generic over it.
 */

//! Port Layer
//!
//! A [`Backend`] names the raw implementation of each primitive and supplies
//! the time services. The public wrappers in [`sync`](crate::sync) and
//! [`memory`](crate::memory) are generic over it.
//!
//! ## Available Ports
//!
//! - [`StdBackend`] - `std::sync` and `std::thread` (feature `std`, default)
//! - [`DummyBackend`] - builds anywhere, every primitive reports `NotReady`
//!
//! [`DefaultBackend`] is the default type parameter of every wrapper: the std
//! port when it is built, the dummy port otherwise.

use core::marker::PhantomData;

use crate::delay;
use crate::memory::pool::{MemoryPool, RawMemoryPool};
use crate::sync::event_flags::{EventFlags, RawEventFlags};
use crate::sync::mutex::{Mutex, RawMutex};
use crate::sync::queue::{MessageQueue, RawQueue};
use crate::sync::semaphore::{RawSemaphore, Semaphore};
#[cfg(feature = "threads")]
use crate::sync::thread::{RawThread, StopToken, Thread};
#[cfg(feature = "timers")]
use crate::sync::timer::{RawTimer, Timer};
use crate::types::*;

mod dummy;
pub use dummy::*;

#[cfg(feature = "std")]
pub mod std;
#[cfg(feature = "std")]
pub use self::std::StdBackend;

/// Port used when a wrapper is named without one.
#[cfg(feature = "std")]
pub type DefaultBackend = StdBackend;

/// Port used when a wrapper is named without one.
#[cfg(not(feature = "std"))]
pub type DefaultBackend = DummyBackend;

// =============================================================================
// Backend strategy
// =============================================================================

/// One scheduler's implementation of every primitive plus its time services.
pub trait Backend: Sized + 'static {
    /// Short name used in diagnostics.
    const NAME: &'static str;

    /// Native priority range as `(lowest, highest)`. A scheduler where lower
    /// numbers are more urgent lists the larger number first.
    const PRIORITY_RANGE: (i32, i32);

    type Mutex: RawMutex;
    type Semaphore: RawSemaphore;
    type EventFlags: RawEventFlags;
    type Queue<T: Copy + Send + 'static>: RawQueue<T>;
    type MemoryPool<T: Send + 'static>: RawMemoryPool<T>;
    #[cfg(feature = "timers")]
    type Timer: RawTimer;
    #[cfg(feature = "threads")]
    type Thread: RawThread;

    /// Suspends the calling context for at least `ms` milliseconds.
    fn delay(ms: u32);

    /// Milliseconds since an arbitrary epoch. Wraps at `u32::MAX`.
    fn tick_count() -> u32;

    /// Ticks per second of [`tick_count`](Backend::tick_count).
    fn tick_freq() -> u32;

    /// Sleeps until `*previous_wake + increment_ms`, then advances
    /// `previous_wake` by exactly `increment_ms`.
    ///
    /// A caller that is already late does not sleep, and the wake time still
    /// advances by one increment so the cadence catches up.
    fn delay_until(previous_wake: &mut u32, increment_ms: u32) {
        let remaining = delay::remaining_until(*previous_wake, increment_ms, Self::tick_count());
        if remaining > 0 {
            Self::delay(remaining);
        }
        *previous_wake = previous_wake.wrapping_add(increment_ms);
    }

    /// Maps a normalized priority onto [`PRIORITY_RANGE`](Backend::PRIORITY_RANGE).
    fn map_priority(priority: ThreadPriority) -> i32 {
        let (min, max) = Self::PRIORITY_RANGE;
        map_priority(priority.normalized(), min, max)
    }
}

// =============================================================================
// Strategy handle
// =============================================================================

/// A copyable handle to a port, chosen once and passed to application code.
///
/// Every factory returns a created primitive, or the status that prevented
/// creation.
///
/// ```
/// use osal::{Osal, StdBackend, WAIT_FOREVER};
///
/// let os = Osal::<StdBackend>::new();
/// let queue = os.queue::<u32>(4).unwrap();
/// queue.put(7, WAIT_FOREVER);
/// assert_eq!(queue.get(WAIT_FOREVER), Ok(7));
/// ```
pub struct Osal<B: Backend = DefaultBackend> {
    _backend: PhantomData<fn() -> B>,
}

impl<B: Backend> Clone for Osal<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Backend> Copy for Osal<B> {}

impl<B: Backend> Default for Osal<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> core::fmt::Debug for Osal<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Osal").field(&B::NAME).finish()
    }
}

impl<B: Backend> Osal<B> {
    pub const fn new() -> Self {
        Self { _backend: PhantomData }
    }

    /// Name of the selected port.
    pub const fn name(&self) -> &'static str {
        B::NAME
    }

    pub fn mutex(&self, recursive: bool) -> OsResult<Mutex<B>> {
        let mut mutex = Mutex::new();
        mutex.create(recursive).into_result()?;
        Ok(mutex)
    }

    pub fn semaphore(&self, max_count: u32, initial_count: u32) -> OsResult<Semaphore<B>> {
        let mut sem = Semaphore::new();
        sem.create(max_count, initial_count).into_result()?;
        Ok(sem)
    }

    pub fn event_flags(&self) -> OsResult<EventFlags<B>> {
        let mut flags = EventFlags::new();
        flags.create().into_result()?;
        Ok(flags)
    }

    pub fn queue<T: Copy + Send + 'static>(&self, capacity: u32) -> OsResult<MessageQueue<T, B>> {
        let mut queue = MessageQueue::new();
        queue.create(capacity).into_result()?;
        Ok(queue)
    }

    pub fn memory_pool<T: Send + 'static>(&self, block_count: u32) -> OsResult<MemoryPool<T, B>> {
        let mut pool = MemoryPool::new();
        pool.create(block_count).into_result()?;
        Ok(pool)
    }

    /// Creates a stopped timer; call [`Timer::start`] to arm it.
    #[cfg(feature = "timers")]
    pub fn timer<F>(&self, name: &str, callback: F, period_ms: u32, auto_reload: bool) -> OsResult<Timer<B>>
    where
        F: FnMut() + Send + 'static,
    {
        let mut timer = Timer::new();
        timer.create(name, callback, period_ms, auto_reload).into_result()?;
        Ok(timer)
    }

    /// Spawns a thread running `entry`.
    #[cfg(feature = "threads")]
    pub fn thread<F>(
        &self,
        name: &str,
        entry: F,
        stack_size: usize,
        priority: ThreadPriority,
    ) -> OsResult<Thread<B>>
    where
        F: FnOnce(&StopToken) + Send + 'static,
    {
        let mut thread = Thread::new();
        thread.create(name, entry, stack_size, priority).into_result()?;
        Ok(thread)
    }

    pub fn delay(&self, ms: u32) {
        B::delay(ms)
    }

    pub fn delay_until(&self, previous_wake: &mut u32, increment_ms: u32) {
        B::delay_until(previous_wake, increment_ms)
    }

    pub fn tick_count(&self) -> u32 {
        B::tick_count()
    }

    pub fn tick_freq(&self) -> u32 {
        B::tick_freq()
    }

    pub fn map_priority(&self, priority: ThreadPriority) -> i32 {
        B::map_priority(priority)
    }
}

