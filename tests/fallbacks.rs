//! Capability fallbacks: what callers see from ports that leave optional
//! operations out.

#![cfg(all(feature = "std", feature = "timers", feature = "threads"))]

use std::ptr::NonNull;

use osal::dispatch::{Capabilities, Capable};
use osal::port::std::{StdEventFlags, StdMemoryPool, StdMutex, StdQueue, StdSemaphore, StdThread, StdTimer};
use osal::sync::RawQueue;
use osal::{
    Backend, DummyBackend, EventFlags, MemoryPool, MessageQueue, Mutex, OsError, OsStatus, Osal, Semaphore,
    StdBackend, Thread, ThreadPriority, Timer, NO_WAIT, WAIT_FOREVER,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Dummy port
// =============================================================================

#[test]
fn dummy_primitives_are_never_created() {
    init_logging();
    let os: Osal<DummyBackend> = Osal::new();
    assert_eq!(os.name(), "dummy");
    assert_eq!(os.mutex(false).err(), Some(OsError::NotReady));
    assert_eq!(os.semaphore(1, 1).err(), Some(OsError::NotReady));
    assert_eq!(os.event_flags().err(), Some(OsError::NotReady));
    assert_eq!(os.queue::<u8>(1).err(), Some(OsError::NotReady));
    assert_eq!(os.memory_pool::<u8>(1).err(), Some(OsError::NotReady));
    assert_eq!(os.timer("t", || {}, 10, true).err(), Some(OsError::NotReady));
    assert_eq!(
        os.thread("t", |_| {}, 0, ThreadPriority::Normal).err(),
        Some(OsError::NotReady)
    );
}

#[test]
fn dummy_optional_operations_return_fallbacks() {
    let m: Mutex<DummyBackend> = Mutex::new();
    assert_eq!(m.try_lock(), OsStatus::Error);
    assert_eq!(m.lock(WAIT_FOREVER), OsStatus::Error);
    assert!(!m.guard().owns());

    let sem: Semaphore<DummyBackend> = Semaphore::new();
    assert_eq!(sem.get_count(), 0);
    assert_eq!(sem.release(), OsStatus::Error);

    let flags: EventFlags<DummyBackend> = EventFlags::new();
    assert_eq!(flags.set(0b1), 0);
    assert_eq!(flags.clear(0b1), 0);
    assert_eq!(flags.get(), 0);
    assert_eq!(flags.wait(0b1, false, false, NO_WAIT), Err(OsError::Error));

    let q: MessageQueue<u32, DummyBackend> = MessageQueue::new();
    assert_eq!(q.put_to_front(1, NO_WAIT), OsStatus::Error);
    assert_eq!(q.reset(), OsStatus::Error);
    assert_eq!(q.get_count(), 0);
    assert_eq!(q.get_capacity(), 0);
    assert_eq!(q.get(NO_WAIT), Err(OsError::Error));

    let pool: MemoryPool<u32, DummyBackend> = MemoryPool::new();
    assert!(pool.alloc(NO_WAIT).is_none());
    assert_eq!(pool.get_count(), 0);
    assert_eq!(pool.get_free_count(), 0);
    let mut local = 0u32;
    assert_eq!(pool.free(NonNull::from(&mut local)), OsStatus::Error);

    let timer: Timer<DummyBackend> = Timer::new();
    assert_eq!(timer.set_period(10), OsStatus::Error);
    assert!(!timer.is_running());
    assert_eq!(timer.start(), OsStatus::Error);

    let thread: Thread<DummyBackend> = Thread::new();
    assert_eq!(thread.join(), OsStatus::Error);
    assert_eq!(thread.detach(), OsStatus::Error);
    assert!(!thread.is_running());
    assert_eq!(thread.name(), "");
    assert_eq!(thread.priority(), ThreadPriority::Normal);
    assert_eq!(thread.stack_size(), 0);
    assert_eq!(thread.suspend(), OsStatus::Error);
    assert_eq!(thread.resume(), OsStatus::Error);
    assert_eq!(thread.set_priority(ThreadPriority::High), OsStatus::Error);
    assert_eq!(thread.set_affinity(0), OsStatus::Error);
    assert_eq!(thread.terminate(), OsStatus::Ok);
}

// =============================================================================
// Partial port
// =============================================================================

/// A queue that overrides every optional method but declares none of them.
struct QuietQueue<T>(StdQueue<T>);

impl<T> Default for QuietQueue<T> {
    fn default() -> Self {
        Self(StdQueue::default())
    }
}

impl<T> Capable for QuietQueue<T> {
    const CAPABILITIES: Capabilities = Capabilities::empty();
}

impl<T: Copy + Send> RawQueue<T> for QuietQueue<T> {
    fn create(&mut self, capacity: u32) -> OsStatus {
        self.0.create(capacity)
    }

    fn delete(&mut self) -> OsStatus {
        self.0.delete()
    }

    fn put(&self, msg: T, timeout: u32) -> OsStatus {
        self.0.put(msg, timeout)
    }

    fn get(&self, timeout: u32) -> Result<T, OsError> {
        self.0.get(timeout)
    }

    fn put_to_front(&self, msg: T, timeout: u32) -> OsStatus {
        self.0.put_to_front(msg, timeout)
    }

    fn get_count(&self) -> u32 {
        self.0.get_count()
    }

    fn reset(&self) -> OsStatus {
        self.0.reset()
    }
}

/// The std port with a queue that opts out of every optional operation.
struct PartialBackend;

impl Backend for PartialBackend {
    const NAME: &'static str = "partial";
    const PRIORITY_RANGE: (i32, i32) = (99, 1);

    type Mutex = StdMutex;
    type Semaphore = StdSemaphore;
    type EventFlags = StdEventFlags;
    type Queue<T: Copy + Send + 'static> = QuietQueue<T>;
    type MemoryPool<T: Send + 'static> = StdMemoryPool<T>;
    type Timer = StdTimer;
    type Thread = StdThread;

    fn delay(ms: u32) {
        StdBackend::delay(ms)
    }

    fn tick_count() -> u32 {
        StdBackend::tick_count()
    }

    fn tick_freq() -> u32 {
        StdBackend::tick_freq()
    }
}

#[test]
fn undeclared_operations_are_never_called() {
    let os: Osal<PartialBackend> = Osal::new();
    let q = os.queue::<u32>(2).unwrap();
    assert_eq!(q.put(1, NO_WAIT), OsStatus::Ok);

    assert_eq!(q.put_to_front(0, NO_WAIT), OsStatus::Error);
    assert_eq!(q.get_count(), 0);
    assert_eq!(q.reset(), OsStatus::Error);

    // Only the back insertion happened, and reset did not run.
    assert_eq!(q.get(NO_WAIT), Ok(1));
    assert_eq!(q.get(NO_WAIT), Err(OsError::Timeout));

    // Declared operations of the other primitives still pass through.
    let m = os.mutex(false).unwrap();
    assert_eq!(m.try_lock(), OsStatus::Ok);
    assert_eq!(m.unlock(), OsStatus::Ok);
}

#[test]
fn inverted_priority_ranges_map_downwards() {
    let os: Osal<PartialBackend> = Osal::new();
    assert_eq!(os.map_priority(ThreadPriority::Idle), 99);
    assert_eq!(os.map_priority(ThreadPriority::Normal), 50);
    assert!(os.map_priority(ThreadPriority::Realtime) < os.map_priority(ThreadPriority::High));

    let std_os: Osal<StdBackend> = Osal::new();
    assert_eq!(std_os.map_priority(ThreadPriority::High), 75);
}
