//! Bounded message queue
//!
//! A fixed-capacity FIFO of `Copy` messages. Producers block while the queue
//! is full and consumers while it is empty, each for at most their timeout.
//! A message put to the front overtakes everything already queued.
//!
//! The queue stores messages by value. For large messages, send an index or
//! a block from a [`MemoryPool`](crate::MemoryPool) instead.

use core::mem::size_of;

use crate::dispatch::{query, Capabilities, Capable};
use crate::port::{Backend, DefaultBackend};
use crate::trace;
use crate::types::*;

/// Backend half of a message queue.
///
/// Optional: [`put_to_front`](RawQueue::put_to_front) (`QUEUE_PUT_TO_FRONT`),
/// [`get_count`](RawQueue::get_count) (`QUEUE_COUNT`),
/// [`get_capacity`](RawQueue::get_capacity) (`QUEUE_CAPACITY`) and
/// [`reset`](RawQueue::reset) (`QUEUE_RESET`).
pub trait RawQueue<T: Copy + Send>: Capable + Default + Send + Sync {
    /// Busy if already created, Error for a zero capacity.
    fn create(&mut self, capacity: u32) -> OsStatus;
    fn delete(&mut self) -> OsStatus;
    fn put(&self, msg: T, timeout: Timeout) -> OsStatus;
    fn get(&self, timeout: Timeout) -> OsResult<T>;

    fn put_to_front(&self, msg: T, timeout: Timeout) -> OsStatus {
        let _ = (msg, timeout);
        OsStatus::Error
    }

    fn get_count(&self) -> u32 {
        0
    }

    fn get_capacity(&self) -> u32 {
        0
    }

    /// Empties the queue and wakes every blocked producer.
    fn reset(&self) -> OsStatus {
        OsStatus::Error
    }
}

/// A bounded FIFO of `T`.
///
/// # Example
///
/// ```
/// use osal::{MessageQueue, OsError, NO_WAIT};
///
/// let mut q: MessageQueue<u8> = MessageQueue::new();
/// q.create(2);
/// q.put(1, NO_WAIT);
/// q.put_to_front(0, NO_WAIT);
/// assert_eq!(q.get_count(), 2);
/// assert_eq!(q.get(NO_WAIT), Ok(0));
/// assert_eq!(q.get(NO_WAIT), Ok(1));
/// assert_eq!(q.get(NO_WAIT), Err(OsError::Timeout));
/// ```
pub struct MessageQueue<T: Copy + Send + 'static, B: Backend = DefaultBackend> {
    raw: B::Queue<T>,
}

impl<T: Copy + Send + 'static, B: Backend> MessageQueue<T, B> {
    pub fn new() -> Self {
        Self {
            raw: Default::default(),
        }
    }

    pub fn create(&mut self, capacity: u32) -> OsStatus {
        let status = self.raw.create(capacity);
        trace::trace_queue_create(self.trace_id(), capacity, size_of::<T>(), status);
        status
    }

    pub fn delete(&mut self) -> OsStatus {
        trace::trace_queue_delete(self.trace_id());
        self.raw.delete()
    }

    /// Appends `msg`, waiting up to `timeout` for space.
    pub fn put(&self, msg: T, timeout: Timeout) -> OsStatus {
        let status = self.raw.put(msg, timeout);
        trace::trace_queue_send(self.trace_id(), false, timeout, status);
        status
    }

    /// Puts `msg` at the head, waiting up to `timeout` for space. Error on
    /// backends without `QUEUE_PUT_TO_FRONT`.
    pub fn put_to_front(&self, msg: T, timeout: Timeout) -> OsStatus {
        let status = query::<B::Queue<T>, _>(Capabilities::QUEUE_PUT_TO_FRONT, OsStatus::Error, || {
            self.raw.put_to_front(msg, timeout)
        });
        trace::trace_queue_send(self.trace_id(), true, timeout, status);
        status
    }

    /// Removes the head, waiting up to `timeout` for a message.
    pub fn get(&self, timeout: Timeout) -> OsResult<T> {
        let result = self.raw.get(timeout);
        trace::trace_queue_receive(self.trace_id(), timeout, OsStatus::from(result.map(|_| ())));
        result
    }

    /// Messages currently queued.
    pub fn get_count(&self) -> u32 {
        query::<B::Queue<T>, _>(Capabilities::QUEUE_COUNT, 0, || self.raw.get_count())
    }

    /// Capacity given at creation.
    pub fn get_capacity(&self) -> u32 {
        query::<B::Queue<T>, _>(Capabilities::QUEUE_CAPACITY, 0, || self.raw.get_capacity())
    }

    /// Drops every queued message and wakes blocked producers. Consumers
    /// keep waiting.
    pub fn reset(&self) -> OsStatus {
        let status = query::<B::Queue<T>, _>(Capabilities::QUEUE_RESET, OsStatus::Error, || self.raw.reset());
        trace::trace_queue_reset(self.trace_id(), status);
        status
    }

    #[inline(always)]
    fn trace_id(&self) -> trace::TraceId {
        self as *const Self as *const ()
    }
}

impl<T: Copy + Send + 'static, B: Backend> Default for MessageQueue<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Send + 'static, B: Backend> Drop for MessageQueue<T, B> {
    fn drop(&mut self) {
        let _ = self.raw.delete();
    }
}
