use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Condvar, Mutex};

use crate::dispatch::{Capabilities, Capable};
use crate::sync::event_flags::{satisfied, RawEventFlags};
use crate::types::*;

use super::{lock, wait_while};

struct Inner {
    // Written only with `lock` held; read lock-free by `get`.
    word: AtomicU32,
    lock: Mutex<()>,
    changed: Condvar,
}

#[derive(Default)]
pub struct StdEventFlags {
    inner: Option<Inner>,
}

impl Capable for StdEventFlags {
    const CAPABILITIES: Capabilities = Capabilities::FLAGS_CLEAR.union(Capabilities::FLAGS_GET);
}

impl RawEventFlags for StdEventFlags {
    fn create(&mut self) -> OsStatus {
        if self.inner.is_some() {
            return OsStatus::Busy;
        }
        self.inner = Some(Inner {
            word: AtomicU32::new(0),
            lock: Mutex::new(()),
            changed: Condvar::new(),
        });
        OsStatus::Ok
    }

    fn delete(&mut self) -> OsStatus {
        self.inner = None;
        OsStatus::Ok
    }

    fn set(&self, mask: EventBits) -> EventBits {
        let Some(inner) = &self.inner else {
            return 0;
        };
        let guard = lock(&inner.lock);
        let word = inner.word.fetch_or(mask, Ordering::AcqRel) | mask;
        drop(guard);
        inner.changed.notify_all();
        word
    }

    fn wait(&self, mask: EventBits, wait_all: bool, auto_clear: bool, timeout: Timeout) -> OsResult<EventBits> {
        let Some(inner) = &self.inner else {
            return Err(OsError::Error);
        };
        let (_guard, timed_out) = wait_while(&inner.changed, lock(&inner.lock), timeout, |_| {
            !satisfied(inner.word.load(Ordering::Acquire), mask, wait_all)
        });
        if timed_out {
            return Err(OsError::Timeout);
        }
        let matched = inner.word.load(Ordering::Acquire) & mask;
        if auto_clear {
            inner.word.fetch_and(!matched, Ordering::AcqRel);
        }
        Ok(matched)
    }

    fn clear(&self, mask: EventBits) -> EventBits {
        let Some(inner) = &self.inner else {
            return 0;
        };
        let _guard = lock(&inner.lock);
        inner.word.fetch_and(!mask, Ordering::AcqRel)
    }

    fn get(&self) -> EventBits {
        self.inner.as_ref().map_or(0, |inner| inner.word.load(Ordering::Acquire))
    }
}
