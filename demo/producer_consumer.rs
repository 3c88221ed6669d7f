//! osal Demo Application
//!
//! Runs a small producer/consumer system on the std port using:
//! - Thread for the producer and consumer contexts
//! - MemoryPool for message payloads, passed by address through a MessageQueue
//! - Mutex guarding the shared statistics
//! - EventFlags to signal shutdown and completion
//! - Timer for a periodic heartbeat
//!
//! Run with `RUST_LOG=debug cargo run --example producer_consumer`.

use std::cell::UnsafeCell;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use osal::{
    EventFlags, MemoryPool, MessageQueue, Mutex, OsResult, OsStatus, Osal, StdBackend, ThreadPriority,
    WAIT_FOREVER,
};

// =============================================================================
// Configuration
// =============================================================================

const MESSAGES: u32 = 32;
const POOL_BLOCKS: u32 = 4;
const QUEUE_DEPTH: u32 = 4;

const PRODUCER_DONE: u32 = 1 << 0;
const CONSUMER_DONE: u32 = 1 << 1;

// =============================================================================
// Shared Resources
// =============================================================================

struct Reading {
    sequence: u32,
    value: u64,
}

struct Stats {
    received: u32,
    checksum: u64,
}

/// Everything the contexts share. Primitives are `Sync`; `stats` is only
/// touched with `stats_lock` held.
struct Shared {
    pool: MemoryPool<Reading, StdBackend>,
    queue: MessageQueue<usize, StdBackend>,
    stats_lock: Mutex<StdBackend>,
    stats: UnsafeCell<Stats>,
    done: EventFlags<StdBackend>,
}

// SAFETY: `stats` is guarded by `stats_lock`.
unsafe impl Sync for Shared {}

impl Shared {
    fn record(&self, reading: &Reading) {
        let _held = self.stats_lock.guard();
        // SAFETY: the lock is held.
        let stats = unsafe { &mut *self.stats.get() };
        stats.received += 1;
        stats.checksum = stats.checksum.wrapping_add(reading.value);
    }
}

// =============================================================================
// Tasks
// =============================================================================

fn producer(shared: &Shared, os: Osal<StdBackend>) {
    for sequence in 0..MESSAGES {
        // Pool allocation never waits; back off until the consumer frees a block.
        let block = loop {
            let reading = Reading {
                sequence,
                value: u64::from(sequence) * 3,
            };
            match shared.pool.alloc_init(reading, WAIT_FOREVER) {
                Some(block) => break block,
                None => os.delay(1),
            }
        };
        if shared.queue.put(block.as_ptr() as usize, WAIT_FOREVER) != OsStatus::Ok {
            log::error!("queue rejected reading #{}", sequence);
            shared.pool.free(block);
        }
    }
    shared.done.set(PRODUCER_DONE);
}

fn consumer(shared: &Shared) {
    for _ in 0..MESSAGES {
        let Ok(addr) = shared.queue.get(WAIT_FOREVER) else {
            log::error!("queue closed under the consumer");
            return;
        };
        let Some(block) = NonNull::new(addr as *mut Reading) else {
            continue;
        };
        // SAFETY: the producer initialized the block before queueing it.
        let reading = unsafe { block.as_ptr().read() };
        log::trace!("reading #{} = {}", reading.sequence, reading.value);
        shared.record(&reading);
        shared.pool.free(block);
    }
    shared.done.set(CONSUMER_DONE);
}

// =============================================================================
// Main
// =============================================================================

fn main() -> OsResult<()> {
    env_logger::init();

    let os: Osal<StdBackend> = Osal::new();
    log::info!("osal demo on the {} port, tick {} Hz", os.name(), os.tick_freq());

    let shared = Arc::new(Shared {
        pool: os.memory_pool(POOL_BLOCKS)?,
        queue: os.queue(QUEUE_DEPTH)?,
        stats_lock: os.mutex(false)?,
        stats: UnsafeCell::new(Stats {
            received: 0,
            checksum: 0,
        }),
        done: os.event_flags()?,
    });

    let beats = Arc::new(AtomicU32::new(0));
    let heartbeat = {
        let beats = Arc::clone(&beats);
        os.timer(
            "heartbeat",
            move || {
                let n = beats.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!("heartbeat {}", n);
            },
            5,
            true,
        )?
    };
    heartbeat.start().into_result()?;

    let producer_thread = {
        let shared = Arc::clone(&shared);
        os.thread("producer", move |_| producer(&shared, os), 0, ThreadPriority::AboveNormal)?
    };
    let consumer_thread = {
        let shared = Arc::clone(&shared);
        os.thread("consumer", move |_| consumer(&shared), 0, ThreadPriority::Normal)?
    };

    let done = shared.done.wait(PRODUCER_DONE | CONSUMER_DONE, true, false, 5_000)?;
    heartbeat.stop().into_result()?;
    producer_thread.join().into_result()?;
    consumer_thread.join().into_result()?;

    let _held = shared.stats_lock.guard();
    // SAFETY: both contexts have been joined and the lock is held.
    let stats = unsafe { &*shared.stats.get() };
    log::info!(
        "done flags {:#04b}: {} readings, checksum {}, {} heartbeats, {} blocks free",
        done,
        stats.received,
        stats.checksum,
        beats.load(Ordering::Relaxed),
        shared.pool.get_free_count()
    );
    Ok(())
}
