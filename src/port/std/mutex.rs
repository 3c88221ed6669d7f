use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};

use crate::config::USE_RECURSIVE_MUTEXES;
use crate::dispatch::{Capabilities, Capable};
use crate::sync::mutex::RawMutex;
use crate::types::*;

use super::{lock, wait_while};

struct Owner {
    thread: Option<ThreadId>,
    depth: u32,
}

struct Inner {
    recursive: bool,
    owner: Mutex<Owner>,
    released: Condvar,
}

/// Owner-tracking mutex. Unlock by any thread but the owner is an error.
#[derive(Default)]
pub struct StdMutex {
    inner: Option<Inner>,
}

impl Capable for StdMutex {
    const CAPABILITIES: Capabilities = Capabilities::TRY_LOCK;
}

impl RawMutex for StdMutex {
    fn create(&mut self, recursive: bool) -> OsStatus {
        if self.inner.is_some() {
            return OsStatus::Busy;
        }
        self.inner = Some(Inner {
            recursive: recursive && USE_RECURSIVE_MUTEXES,
            owner: Mutex::new(Owner { thread: None, depth: 0 }),
            released: Condvar::new(),
        });
        OsStatus::Ok
    }

    fn delete(&mut self) -> OsStatus {
        self.inner = None;
        OsStatus::Ok
    }

    fn lock(&self, timeout: Timeout) -> OsStatus {
        let Some(inner) = &self.inner else {
            return OsStatus::Error;
        };
        let me = thread::current().id();
        let owner = lock(&inner.owner);

        if owner.thread == Some(me) {
            if inner.recursive {
                let mut owner = owner;
                owner.depth += 1;
                return OsStatus::Ok;
            }
            if timeout == WAIT_FOREVER {
                log::warn!("non-recursive mutex relocked by its owner, refusing to deadlock");
                return OsStatus::Error;
            }
        }

        let (mut owner, timed_out) = wait_while(&inner.released, owner, timeout, |o| o.thread.is_some());
        if timed_out {
            return OsStatus::Timeout;
        }
        owner.thread = Some(me);
        owner.depth = 1;
        OsStatus::Ok
    }

    fn unlock(&self) -> OsStatus {
        let Some(inner) = &self.inner else {
            return OsStatus::Error;
        };
        let mut owner = lock(&inner.owner);
        if owner.thread != Some(thread::current().id()) {
            log::warn!("mutex unlocked by a thread that does not hold it");
            return OsStatus::Error;
        }
        owner.depth -= 1;
        if owner.depth == 0 {
            owner.thread = None;
            drop(owner);
            inner.released.notify_one();
        }
        OsStatus::Ok
    }

    fn try_lock(&self) -> OsStatus {
        self.lock(NO_WAIT)
    }
}
