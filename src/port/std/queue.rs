use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::dispatch::{Capabilities, Capable};
use crate::sync::queue::RawQueue;
use crate::types::*;

use super::{lock, wait_while};

struct Inner<T> {
    capacity: usize,
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

pub struct StdQueue<T> {
    inner: Option<Inner<T>>,
}

impl<T> Default for StdQueue<T> {
    fn default() -> Self {
        Self { inner: None }
    }
}

impl<T> Capable for StdQueue<T> {
    const CAPABILITIES: Capabilities = Capabilities::QUEUE_PUT_TO_FRONT
        .union(Capabilities::QUEUE_COUNT)
        .union(Capabilities::QUEUE_CAPACITY)
        .union(Capabilities::QUEUE_RESET);
}

impl<T: Copy + Send> StdQueue<T> {
    fn push(&self, msg: T, timeout: Timeout, front: bool) -> OsStatus {
        let Some(inner) = &self.inner else {
            return OsStatus::Error;
        };
        let (mut items, timed_out) = wait_while(&inner.not_full, lock(&inner.items), timeout, |q| {
            q.len() >= inner.capacity
        });
        if timed_out {
            return OsStatus::Timeout;
        }
        if front {
            items.push_front(msg);
        } else {
            items.push_back(msg);
        }
        drop(items);
        inner.not_empty.notify_one();
        OsStatus::Ok
    }
}

impl<T: Copy + Send> RawQueue<T> for StdQueue<T> {
    fn create(&mut self, capacity: u32) -> OsStatus {
        if self.inner.is_some() {
            return OsStatus::Busy;
        }
        if capacity == 0 {
            return OsStatus::Error;
        }
        let capacity = capacity as usize;
        let mut items = VecDeque::new();
        if items.try_reserve_exact(capacity).is_err() {
            log::debug!("queue storage for {} messages unavailable", capacity);
            return OsStatus::NoMemory;
        }
        self.inner = Some(Inner {
            capacity,
            items: Mutex::new(items),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        });
        OsStatus::Ok
    }

    fn delete(&mut self) -> OsStatus {
        self.inner = None;
        OsStatus::Ok
    }

    fn put(&self, msg: T, timeout: Timeout) -> OsStatus {
        self.push(msg, timeout, false)
    }

    fn put_to_front(&self, msg: T, timeout: Timeout) -> OsStatus {
        self.push(msg, timeout, true)
    }

    fn get(&self, timeout: Timeout) -> OsResult<T> {
        let Some(inner) = &self.inner else {
            return Err(OsError::Error);
        };
        let (mut items, timed_out) = wait_while(&inner.not_empty, lock(&inner.items), timeout, |q| q.is_empty());
        if timed_out {
            return Err(OsError::Timeout);
        }
        let msg = items.pop_front().ok_or(OsError::Error)?;
        drop(items);
        inner.not_full.notify_one();
        Ok(msg)
    }

    fn get_count(&self) -> u32 {
        self.inner.as_ref().map_or(0, |inner| lock(&inner.items).len() as u32)
    }

    fn get_capacity(&self) -> u32 {
        self.inner.as_ref().map_or(0, |inner| inner.capacity as u32)
    }

    fn reset(&self) -> OsStatus {
        let Some(inner) = &self.inner else {
            return OsStatus::Error;
        };
        lock(&inner.items).clear();
        inner.not_full.notify_all();
        OsStatus::Ok
    }
}
