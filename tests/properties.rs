//! Behavioral properties of every primitive on the std port.

#![cfg(all(feature = "std", feature = "timers", feature = "threads"))]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use osal::{
    EventFlags, MemoryPool, MessageQueue, Mutex, OsError, OsStatus, Osal, Semaphore, StdBackend, ThreadPriority,
    Timer, NO_WAIT, WAIT_FOREVER,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn os() -> Osal<StdBackend> {
    Osal::new()
}

// =============================================================================
// Mutex
// =============================================================================

/// Unsynchronized read-modify-write guarded only by the mutex.
struct Racy(std::cell::UnsafeCell<u64>);
unsafe impl Sync for Racy {}

#[test]
fn mutex_serializes_critical_sections() {
    init_logging();
    const THREADS: usize = 8;
    const ROUNDS: u64 = 2_000;

    let mutex = Arc::new(os().mutex(false).unwrap());
    let counter = Arc::new(Racy(std::cell::UnsafeCell::new(0)));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let (mutex, counter) = (Arc::clone(&mutex), Arc::clone(&counter));
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    let _held = mutex.guard();
                    // SAFETY: only touched with the mutex held.
                    unsafe {
                        let v = *counter.0.get();
                        thread::yield_now();
                        *counter.0.get() = v + 1;
                    }
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    assert_eq!(unsafe { *counter.0.get() }, THREADS as u64 * ROUNDS);
}

#[test]
fn mutex_lock_times_out_while_held_elsewhere() {
    init_logging();
    let mutex = Arc::new(os().mutex(false).unwrap());
    assert_eq!(mutex.lock(WAIT_FOREVER), OsStatus::Ok);

    let other = Arc::clone(&mutex);
    let (status, waited) = thread::spawn(move || {
        let start = Instant::now();
        (other.lock(30), start.elapsed())
    })
    .join()
    .unwrap();
    assert_eq!(status, OsStatus::Timeout);
    assert!(waited >= Duration::from_millis(30));
    assert_eq!(mutex.unlock(), OsStatus::Ok);
}

#[test]
fn recursive_mutex_counts_depth() {
    let m = os().mutex(true).unwrap();
    for _ in 0..3 {
        assert_eq!(m.lock(NO_WAIT), OsStatus::Ok);
    }
    for _ in 0..3 {
        assert_eq!(m.unlock(), OsStatus::Ok);
    }
    assert_eq!(m.unlock(), OsStatus::Error);
}

#[test]
fn guard_with_timeout_reports_failure() {
    let m = Arc::new(os().mutex(false).unwrap());
    let _held = m.guard();
    let other = Arc::clone(&m);
    let owned = thread::spawn(move || other.guard_timeout(NO_WAIT).owns()).join().unwrap();
    assert!(!owned);
}

// =============================================================================
// Semaphore
// =============================================================================

#[test]
fn semaphore_limits_concurrency() {
    init_logging();
    let sem = Arc::new(os().semaphore(2, 2).unwrap());
    let inside = Arc::new(AtomicU32::new(0));
    let peak = Arc::new(AtomicU32::new(0));

    let workers: Vec<_> = (0..6)
        .map(|_| {
            let (sem, inside, peak) = (Arc::clone(&sem), Arc::clone(&inside), Arc::clone(&peak));
            thread::spawn(move || {
                assert_eq!(sem.acquire(WAIT_FOREVER), OsStatus::Ok);
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(5));
                inside.fetch_sub(1, Ordering::SeqCst);
                assert_eq!(sem.release(), OsStatus::Ok);
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(sem.get_count(), 2);
}

// =============================================================================
// Message queue
// =============================================================================

#[test]
fn queue_never_exceeds_capacity() {
    init_logging();
    let q = os().queue::<u32>(4).unwrap();
    for i in 0..4 {
        assert_eq!(q.put(i, NO_WAIT), OsStatus::Ok);
    }
    assert_eq!(q.put(4, NO_WAIT), OsStatus::Timeout);

    let start = Instant::now();
    assert_eq!(q.put(4, 20), OsStatus::Timeout);
    assert!(start.elapsed() >= Duration::from_millis(20));
    assert_eq!(q.get_count(), 4);
    assert_eq!(q.get_capacity(), 4);
}

#[test]
fn queue_is_fifo_and_put_to_front_overtakes() {
    let q = os().queue::<u32>(4).unwrap();
    q.put(1, NO_WAIT);
    q.put(2, NO_WAIT);
    q.put_to_front(0, NO_WAIT);
    q.put(3, NO_WAIT);
    let drained: Vec<u32> = (0..4).map(|_| q.get(NO_WAIT).unwrap()).collect();
    assert_eq!(drained, [0, 1, 2, 3]);
    assert_eq!(q.get(NO_WAIT), Err(OsError::Timeout));
}

#[test]
fn queue_preserves_order_across_threads() {
    init_logging();
    const COUNT: u32 = 500;
    let q = Arc::new(os().queue::<u32>(8).unwrap());
    let producer = {
        let q = Arc::clone(&q);
        thread::spawn(move || {
            for i in 0..COUNT {
                assert_eq!(q.put(i, WAIT_FOREVER), OsStatus::Ok);
            }
        })
    };
    for expected in 0..COUNT {
        assert_eq!(q.get(WAIT_FOREVER), Ok(expected));
    }
    producer.join().unwrap();
}

#[test]
fn queue_reset_wakes_producers_but_not_consumers() {
    let q = Arc::new(os().queue::<u8>(1).unwrap());
    q.put(1, NO_WAIT);
    let producer = {
        let q = Arc::clone(&q);
        thread::spawn(move || q.put(2, 1_000))
    };
    thread::sleep(Duration::from_millis(10));
    assert_eq!(q.reset(), OsStatus::Ok);
    assert_eq!(producer.join().unwrap(), OsStatus::Ok);
    assert_eq!(q.get(NO_WAIT), Ok(2));

    q.reset();
    let consumer = {
        let q = Arc::clone(&q);
        thread::spawn(move || q.get(30))
    };
    thread::sleep(Duration::from_millis(5));
    q.reset();
    assert_eq!(consumer.join().unwrap(), Err(OsError::Timeout));
}

// =============================================================================
// Event flags
// =============================================================================

#[test]
fn wait_all_needs_every_bit_wait_any_needs_one() {
    init_logging();
    let flags = Arc::new(os().event_flags().unwrap());
    let barrier = Arc::new(Barrier::new(3));

    let all = {
        let (flags, barrier) = (Arc::clone(&flags), Arc::clone(&barrier));
        thread::spawn(move || {
            barrier.wait();
            flags.wait(0b11, true, false, 1_000)
        })
    };
    let any = {
        let (flags, barrier) = (Arc::clone(&flags), Arc::clone(&barrier));
        thread::spawn(move || {
            barrier.wait();
            flags.wait(0b11, false, false, 1_000)
        })
    };
    barrier.wait();

    thread::sleep(Duration::from_millis(10));
    flags.set(0b01);
    assert_eq!(any.join().unwrap(), Ok(0b01));
    thread::sleep(Duration::from_millis(10));
    assert!(!all.is_finished());

    flags.set(0b10);
    assert_eq!(all.join().unwrap(), Ok(0b11));
}

#[test]
fn auto_clear_consumes_matched_bits() {
    let flags = os().event_flags().unwrap();
    flags.set(0b0111);
    assert_eq!(flags.wait(0b0011, true, true, NO_WAIT), Ok(0b0011));
    assert_eq!(flags.get(), 0b0100);
    assert_eq!(flags.wait(0b0011, false, true, NO_WAIT), Err(OsError::Timeout));
}

#[test]
fn empty_mask_is_rejected() {
    let flags = os().event_flags().unwrap();
    flags.set(0xFFFF_FFFF);
    assert_eq!(flags.wait(0, false, false, NO_WAIT), Err(OsError::Error));
    assert_eq!(flags.clear(0xFFFF_0000), 0xFFFF_FFFF);
    assert_eq!(flags.get(), 0x0000_FFFF);
}

// =============================================================================
// Memory pool
// =============================================================================

#[test]
fn pool_exhausts_and_reuses_lifo() {
    init_logging();
    let pool = os().memory_pool::<[u32; 4]>(3).unwrap();
    let blocks: Vec<_> = (0..3).map(|_| pool.alloc(NO_WAIT).unwrap()).collect();
    assert!(pool.alloc(NO_WAIT).is_none());
    assert_eq!(pool.get_free_count(), 0);

    assert_eq!(pool.free(blocks[0]), OsStatus::Ok);
    assert_eq!(pool.free(blocks[2]), OsStatus::Ok);
    assert_eq!(pool.alloc(NO_WAIT), Some(blocks[2]));
    assert_eq!(pool.alloc(NO_WAIT), Some(blocks[0]));
    assert_eq!(pool.get_count(), 3);
}

#[test]
fn pool_rejects_foreign_and_double_frees() {
    let pool = os().memory_pool::<u64>(2).unwrap();
    let other = os().memory_pool::<u64>(2).unwrap();

    let mine = pool.alloc_init(42, NO_WAIT).unwrap();
    assert_eq!(unsafe { *mine.as_ptr() }, 42);
    let theirs = other.alloc(NO_WAIT).unwrap();

    assert_eq!(pool.free(theirs), OsStatus::Error);
    assert_eq!(pool.free(mine), OsStatus::Ok);
    assert_eq!(pool.free(mine), OsStatus::Error);
    assert_eq!(pool.get_free_count(), 2);
}

#[test]
fn pool_blocks_can_travel_through_a_queue() {
    let pool = Arc::new(os().memory_pool::<[u8; 32]>(4).unwrap());
    let q = Arc::new(os().queue::<usize>(4).unwrap());

    let consumer = {
        let (pool, q) = (Arc::clone(&pool), Arc::clone(&q));
        thread::spawn(move || {
            let mut sum = 0u32;
            for _ in 0..4 {
                let addr = q.get(WAIT_FOREVER).unwrap();
                let block = std::ptr::NonNull::new(addr as *mut [u8; 32]).unwrap();
                sum += unsafe { block.as_ref()[0] } as u32;
                assert_eq!(pool.free(block), OsStatus::Ok);
            }
            sum
        })
    };
    for i in 1..=4u8 {
        let block = pool.alloc_init([i; 32], NO_WAIT).unwrap();
        q.put(block.as_ptr() as usize, WAIT_FOREVER);
    }
    assert_eq!(consumer.join().unwrap(), 10);
    assert_eq!(pool.get_free_count(), 4);
}

// =============================================================================
// Timer
// =============================================================================

fn counting_timer(period_ms: u32, auto_reload: bool) -> (Timer<StdBackend>, Arc<AtomicU32>) {
    let fired = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&fired);
    let timer = os()
        .timer(
            "counter",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            period_ms,
            auto_reload,
        )
        .unwrap();
    (timer, fired)
}

#[test]
fn periodic_timer_fires_at_its_period() {
    init_logging();
    let (timer, fired) = counting_timer(10, true);
    let start = Instant::now();
    assert_eq!(timer.start(), OsStatus::Ok);
    thread::sleep(Duration::from_millis(55));
    assert_eq!(timer.stop(), OsStatus::Ok);
    let elapsed_ms = start.elapsed().as_millis() as u32;

    // Deadlines advance by one period per firing, so the count follows wall
    // time even when the worker is scheduled late.
    let count = fired.load(Ordering::SeqCst);
    assert!(count >= 4 && count <= elapsed_ms / 10, "fired {count} times in {elapsed_ms} ms");

    thread::sleep(Duration::from_millis(30));
    assert_eq!(fired.load(Ordering::SeqCst), count);
}

#[test]
fn one_shot_timer_fires_once() {
    let (timer, fired) = counting_timer(5, false);
    timer.start();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!timer.is_running());
    assert_eq!(timer.start(), OsStatus::Ok);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[test]
fn set_period_applies_to_following_cycles() {
    let (timer, fired) = counting_timer(200, true);
    assert_eq!(timer.set_period(0), OsStatus::Error);
    assert_eq!(timer.set_period(5), OsStatus::Ok);
    timer.start();
    thread::sleep(Duration::from_millis(60));
    timer.stop();
    assert!(fired.load(Ordering::SeqCst) >= 3);
}

// =============================================================================
// Thread
// =============================================================================

#[test]
fn thread_observes_stop_token() {
    init_logging();
    let ticks = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&ticks);
    let worker = os()
        .thread(
            "ticker",
            move |stop| {
                while !stop.stop_requested() {
                    seen.fetch_add(1, Ordering::Relaxed);
                    thread::sleep(Duration::from_millis(1));
                }
            },
            0,
            ThreadPriority::AboveNormal,
        )
        .unwrap();
    thread::sleep(Duration::from_millis(20));
    assert!(worker.is_running());
    assert_eq!(worker.name(), "ticker");
    assert_eq!(worker.priority(), ThreadPriority::AboveNormal);

    assert_eq!(worker.terminate(), OsStatus::Ok);
    assert!(!worker.is_running());
    assert!(ticks.load(Ordering::Relaxed) > 0);
}

#[test]
fn names_with_nul_do_not_escape_as_panics() {
    let worker = os().thread("bad\0name", |_| {}, 0, ThreadPriority::Normal).unwrap();
    assert_eq!(worker.name(), "bad");
    assert_eq!(worker.join(), OsStatus::Ok);

    let (timer, fired) = {
        let fired = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fired);
        let timer = os()
            .timer(
                "bad\0",
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
                5,
                false,
            )
            .unwrap();
        (timer, fired)
    };
    assert_eq!(timer.start(), OsStatus::Ok);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!timer.is_running());
    assert_eq!(timer.start(), OsStatus::Ok);
    assert_eq!(timer.stop(), OsStatus::Ok);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn delete_is_idempotent_and_recreate_works() {
    let mut m: Mutex<StdBackend> = Mutex::new();
    assert_eq!(m.create(false), OsStatus::Ok);
    assert_eq!(m.create(false), OsStatus::Busy);
    assert_eq!(m.delete(), OsStatus::Ok);
    assert_eq!(m.delete(), OsStatus::Ok);
    assert_eq!(m.lock(NO_WAIT), OsStatus::Error);
    assert_eq!(m.create(true), OsStatus::Ok);
    assert_eq!(m.lock(NO_WAIT), OsStatus::Ok);
    assert_eq!(m.unlock(), OsStatus::Ok);

    let mut sem: Semaphore<StdBackend> = Semaphore::new();
    assert_eq!(sem.create(1, 1), OsStatus::Ok);
    assert_eq!(sem.delete(), OsStatus::Ok);
    assert_eq!(sem.delete(), OsStatus::Ok);
    assert_eq!(sem.create(1, 0), OsStatus::Ok);

    let mut q: MessageQueue<u8, StdBackend> = MessageQueue::new();
    assert_eq!(q.create(2), OsStatus::Ok);
    q.put(7, NO_WAIT);
    assert_eq!(q.delete(), OsStatus::Ok);
    assert_eq!(q.delete(), OsStatus::Ok);
    assert_eq!(q.create(2), OsStatus::Ok);
    assert_eq!(q.get(NO_WAIT), Err(OsError::Timeout));

    let mut flags: EventFlags<StdBackend> = EventFlags::new();
    assert_eq!(flags.create(), OsStatus::Ok);
    assert_eq!(flags.delete(), OsStatus::Ok);
    assert_eq!(flags.delete(), OsStatus::Ok);
    assert_eq!(flags.set(1), 0);

    let mut pool: MemoryPool<u32, StdBackend> = MemoryPool::new();
    assert_eq!(pool.create(1), OsStatus::Ok);
    assert_eq!(pool.delete(), OsStatus::Ok);
    assert_eq!(pool.delete(), OsStatus::Ok);
    assert_eq!(pool.create(1), OsStatus::Ok);
    assert!(pool.alloc(NO_WAIT).is_some());

    let (mut timer, _) = counting_timer(10, true);
    timer.start();
    assert_eq!(timer.delete(), OsStatus::Ok);
    assert_eq!(timer.delete(), OsStatus::Ok);
    assert_eq!(timer.start(), OsStatus::Error);
}

#[test]
fn take_leaves_source_not_created() {
    let mut q = os().queue::<u8>(1).unwrap();
    let moved = std::mem::take(&mut q);
    assert_eq!(moved.put(1, NO_WAIT), OsStatus::Ok);
    assert_eq!(q.put(1, NO_WAIT), OsStatus::Error);
    assert_eq!(q.create(1), OsStatus::Ok);
}

#[test]
fn drop_stops_a_running_timer() {
    let (timer, fired) = counting_timer(5, true);
    timer.start();
    thread::sleep(Duration::from_millis(20));
    drop(timer);
    let count = fired.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(fired.load(Ordering::SeqCst), count);
}

// =============================================================================
// Time services
// =============================================================================

#[test]
fn delay_until_keeps_cadence() {
    let os = os();
    let start = Instant::now();
    let mut wake = os.tick_count();
    for _ in 0..5 {
        os.delay_until(&mut wake, 10);
    }
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(45), "{elapsed:?}");
    assert_eq!(os.tick_freq(), 1000);
}

#[test]
fn late_delay_until_does_not_sleep() {
    let os = os();
    let mut wake = os.tick_count();
    os.delay(30);
    let start = Instant::now();
    os.delay_until(&mut wake, 10);
    assert!(start.elapsed() < Duration::from_millis(10));
    os.delay_until(&mut wake, 10);
    assert!(start.elapsed() < Duration::from_millis(10));
}
