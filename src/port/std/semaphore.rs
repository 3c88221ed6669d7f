use std::sync::{Condvar, Mutex};

use crate::dispatch::{Capabilities, Capable};
use crate::sync::semaphore::RawSemaphore;
use crate::types::*;

use super::{lock, wait_while};

struct Inner {
    max: u32,
    count: Mutex<u32>,
    available: Condvar,
}

#[derive(Default)]
pub struct StdSemaphore {
    inner: Option<Inner>,
}

impl Capable for StdSemaphore {
    const CAPABILITIES: Capabilities = Capabilities::SEMAPHORE_COUNT;
}

impl RawSemaphore for StdSemaphore {
    fn create(&mut self, max_count: u32, initial_count: u32) -> OsStatus {
        if self.inner.is_some() {
            return OsStatus::Busy;
        }
        if max_count == 0 || initial_count > max_count {
            return OsStatus::Error;
        }
        self.inner = Some(Inner {
            max: max_count,
            count: Mutex::new(initial_count),
            available: Condvar::new(),
        });
        OsStatus::Ok
    }

    fn delete(&mut self) -> OsStatus {
        self.inner = None;
        OsStatus::Ok
    }

    fn acquire(&self, timeout: Timeout) -> OsStatus {
        let Some(inner) = &self.inner else {
            return OsStatus::Error;
        };
        let (mut count, timed_out) = wait_while(&inner.available, lock(&inner.count), timeout, |c| *c == 0);
        if timed_out {
            return OsStatus::Timeout;
        }
        *count -= 1;
        OsStatus::Ok
    }

    fn release(&self) -> OsStatus {
        let Some(inner) = &self.inner else {
            return OsStatus::Error;
        };
        let mut count = lock(&inner.count);
        if *count >= inner.max {
            return OsStatus::Error;
        }
        *count += 1;
        drop(count);
        inner.available.notify_one();
        OsStatus::Ok
    }

    fn get_count(&self) -> u32 {
        self.inner.as_ref().map_or(0, |inner| *lock(&inner.count))
    }
}
