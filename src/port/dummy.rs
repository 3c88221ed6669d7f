/*
 * SPDX-License-Identifier: MIT
 *
 * Dummy port. Builds on every target and implements only the mandatory
 * operations; nothing can ever be created.
 */

//! Dummy Port Implementation
//!
//! Every `create` reports [`OsStatus::NotReady`], and every other operation
//! answers the way a primitive that was never created does. No optional
//! capability is declared, so every optional operation resolves to its
//! fallback.
//!
//! Useful for building the abstraction layer on targets without a threading
//! substrate, and for checking that application code copes with primitives
//! being unavailable.

use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::config::TICK_RATE_HZ;
use crate::dispatch::{Capabilities, Capable};
use crate::memory::pool::RawMemoryPool;
use crate::port::Backend;
use crate::sync::event_flags::RawEventFlags;
use crate::sync::mutex::RawMutex;
use crate::sync::queue::RawQueue;
use crate::sync::semaphore::RawSemaphore;
#[cfg(feature = "threads")]
use crate::sync::thread::{RawThread, ThreadEntry};
#[cfg(feature = "timers")]
use crate::sync::timer::{RawTimer, TimerCallback};
use crate::types::*;

/// The dummy port.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyBackend;

impl Backend for DummyBackend {
    const NAME: &'static str = "dummy";
    const PRIORITY_RANGE: (i32, i32) = (0, 0);

    type Mutex = DummyMutex;
    type Semaphore = DummySemaphore;
    type EventFlags = DummyEventFlags;
    type Queue<T: Copy + Send + 'static> = DummyQueue<T>;
    type MemoryPool<T: Send + 'static> = DummyMemoryPool<T>;
    #[cfg(feature = "timers")]
    type Timer = DummyTimer;
    #[cfg(feature = "threads")]
    type Thread = DummyThread;

    fn delay(_ms: u32) {}

    fn tick_count() -> u32 {
        0
    }

    fn tick_freq() -> u32 {
        TICK_RATE_HZ
    }
}

// =============================================================================
// Primitives
// =============================================================================

macro_rules! no_capabilities {
    ($($ty:ident $(<$param:ident>)?),+ $(,)?) => {
        $(
            impl$(<$param>)? Capable for $ty$(<$param>)? {
                const CAPABILITIES: Capabilities = Capabilities::empty();
            }
        )+
    };
}

#[derive(Debug, Default)]
pub struct DummyMutex;

#[derive(Debug, Default)]
pub struct DummySemaphore;

#[derive(Debug, Default)]
pub struct DummyEventFlags;

#[derive(Debug)]
pub struct DummyQueue<T>(PhantomData<fn() -> T>);

#[derive(Debug)]
pub struct DummyMemoryPool<T>(PhantomData<fn() -> T>);

#[cfg(feature = "timers")]
#[derive(Debug, Default)]
pub struct DummyTimer;

#[cfg(feature = "threads")]
#[derive(Debug, Default)]
pub struct DummyThread;

impl<T> Default for DummyQueue<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for DummyMemoryPool<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

no_capabilities!(DummyMutex, DummySemaphore, DummyEventFlags, DummyQueue<T>, DummyMemoryPool<T>);
#[cfg(feature = "timers")]
no_capabilities!(DummyTimer);
#[cfg(feature = "threads")]
no_capabilities!(DummyThread);

impl RawMutex for DummyMutex {
    fn create(&mut self, _recursive: bool) -> OsStatus {
        OsStatus::NotReady
    }

    fn delete(&mut self) -> OsStatus {
        OsStatus::Ok
    }

    fn lock(&self, _timeout: Timeout) -> OsStatus {
        OsStatus::Error
    }

    fn unlock(&self) -> OsStatus {
        OsStatus::Error
    }
}

impl RawSemaphore for DummySemaphore {
    fn create(&mut self, _max_count: u32, _initial_count: u32) -> OsStatus {
        OsStatus::NotReady
    }

    fn delete(&mut self) -> OsStatus {
        OsStatus::Ok
    }

    fn acquire(&self, _timeout: Timeout) -> OsStatus {
        OsStatus::Error
    }

    fn release(&self) -> OsStatus {
        OsStatus::Error
    }
}

impl RawEventFlags for DummyEventFlags {
    fn create(&mut self) -> OsStatus {
        OsStatus::NotReady
    }

    fn delete(&mut self) -> OsStatus {
        OsStatus::Ok
    }

    fn set(&self, _mask: EventBits) -> EventBits {
        0
    }

    fn wait(&self, _mask: EventBits, _wait_all: bool, _auto_clear: bool, _timeout: Timeout) -> OsResult<EventBits> {
        Err(OsError::Error)
    }
}

impl<T: Copy + Send> RawQueue<T> for DummyQueue<T> {
    fn create(&mut self, _capacity: u32) -> OsStatus {
        OsStatus::NotReady
    }

    fn delete(&mut self) -> OsStatus {
        OsStatus::Ok
    }

    fn put(&self, _msg: T, _timeout: Timeout) -> OsStatus {
        OsStatus::Error
    }

    fn get(&self, _timeout: Timeout) -> OsResult<T> {
        Err(OsError::Error)
    }
}

impl<T: Send> RawMemoryPool<T> for DummyMemoryPool<T> {
    fn create(&mut self, _block_count: u32) -> OsStatus {
        OsStatus::NotReady
    }

    fn delete(&mut self) -> OsStatus {
        OsStatus::Ok
    }

    fn alloc(&self, _timeout: Timeout) -> Option<NonNull<T>> {
        None
    }

    fn free(&self, _block: NonNull<T>) -> OsStatus {
        OsStatus::Error
    }
}

#[cfg(feature = "timers")]
impl RawTimer for DummyTimer {
    fn create(&mut self, _name: &str, _callback: TimerCallback, _period_ms: u32, _auto_reload: bool) -> OsStatus {
        OsStatus::NotReady
    }

    fn delete(&mut self) -> OsStatus {
        OsStatus::Ok
    }

    fn start(&self) -> OsStatus {
        OsStatus::Error
    }

    fn stop(&self) -> OsStatus {
        OsStatus::Error
    }
}

#[cfg(feature = "threads")]
impl RawThread for DummyThread {
    fn create(&mut self, _name: &str, _entry: ThreadEntry, _stack_size: usize, _priority: ThreadPriority) -> OsStatus {
        OsStatus::NotReady
    }

    fn terminate(&self) -> OsStatus {
        OsStatus::Ok
    }
}
