//! Event flag group
//!
//! Thirty-two independent flags shared between threads. Setters OR bits in
//! and wake every waiter; a waiter blocks until any (or all) of the bits it
//! names are set, optionally clearing the bits it consumed in the same step.

use crate::dispatch::{query, Capabilities, Capable};
use crate::port::{Backend, DefaultBackend};
use crate::trace;
use crate::types::*;

/// Backend half of an event flag group.
///
/// Optional: [`clear`](RawEventFlags::clear) (`FLAGS_CLEAR`) and
/// [`get`](RawEventFlags::get) (`FLAGS_GET`).
pub trait RawEventFlags: Capable + Default + Send + Sync {
    fn create(&mut self) -> OsStatus;
    fn delete(&mut self) -> OsStatus;

    /// ORs `mask` in and wakes all waiters. Returns the resulting word, or 0
    /// if not created.
    fn set(&self, mask: EventBits) -> EventBits;

    /// Waits until the word satisfies `mask`. On success returns
    /// `word & mask`, clearing exactly those bits when `auto_clear` is set.
    /// A timeout leaves the word untouched.
    fn wait(&self, mask: EventBits, wait_all: bool, auto_clear: bool, timeout: Timeout) -> OsResult<EventBits>;

    /// Clears `mask` and returns the word as it was before.
    fn clear(&self, mask: EventBits) -> EventBits {
        let _ = mask;
        0
    }

    /// Snapshot of the word.
    fn get(&self) -> EventBits {
        0
    }
}

/// A group of 32 event flags.
///
/// ```
/// use osal::{EventFlags, OsError, NO_WAIT};
///
/// let mut flags: EventFlags = EventFlags::new();
/// flags.create();
/// flags.set(0b0101);
///
/// // Any of 0b0011: bit 0 is set.
/// assert_eq!(flags.wait(0b0011, false, false, NO_WAIT), Ok(0b0001));
/// // All of 0b0011: bit 1 is missing.
/// assert_eq!(flags.wait(0b0011, true, false, NO_WAIT), Err(OsError::Timeout));
/// ```
pub struct EventFlags<B: Backend = DefaultBackend> {
    raw: B::EventFlags,
}

impl<B: Backend> EventFlags<B> {
    pub fn new() -> Self {
        Self {
            raw: B::EventFlags::default(),
        }
    }

    pub fn create(&mut self) -> OsStatus {
        let status = self.raw.create();
        trace::trace_event_flags_create(self.trace_id(), status);
        status
    }

    pub fn delete(&mut self) -> OsStatus {
        trace::trace_event_flags_delete(self.trace_id());
        self.raw.delete()
    }

    /// Sets `mask` and returns the resulting word.
    pub fn set(&self, mask: EventBits) -> EventBits {
        let word = self.raw.set(mask);
        trace::trace_event_flags_set(self.trace_id(), mask, word);
        word
    }

    /// Clears `mask` and returns the word before clearing. Returns 0 on
    /// backends without `FLAGS_CLEAR`.
    pub fn clear(&self, mask: EventBits) -> EventBits {
        let previous = query::<B::EventFlags, _>(Capabilities::FLAGS_CLEAR, 0, || self.raw.clear(mask));
        trace::trace_event_flags_clear(self.trace_id(), mask, previous);
        previous
    }

    /// Returns the current word without blocking, or 0 on backends without
    /// `FLAGS_GET`.
    pub fn get(&self) -> EventBits {
        query::<B::EventFlags, _>(Capabilities::FLAGS_GET, 0, || self.raw.get())
    }

    /// Waits for any (`wait_all == false`) or all of the bits in `mask`.
    ///
    /// Returns the word masked by `mask` at the moment the wait completed.
    /// An empty mask can never be satisfied and is rejected with
    /// [`OsError::Error`]; an elapsed deadline is [`OsError::Timeout`].
    pub fn wait(&self, mask: EventBits, wait_all: bool, auto_clear: bool, timeout: Timeout) -> OsResult<EventBits> {
        let result = if mask == 0 {
            Err(OsError::Error)
        } else {
            self.raw.wait(mask, wait_all, auto_clear, timeout)
        };
        trace::trace_event_flags_wait(self.trace_id(), mask, wait_all, auto_clear, timeout, &result);
        result
    }

    #[inline(always)]
    fn trace_id(&self) -> trace::TraceId {
        self as *const Self as *const ()
    }
}

impl<B: Backend> Default for EventFlags<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Drop for EventFlags<B> {
    fn drop(&mut self) {
        let _ = self.raw.delete();
    }
}

/// Returns `true` when `word` satisfies a wait on `mask`.
#[inline]
pub const fn satisfied(word: EventBits, mask: EventBits, wait_all: bool) -> bool {
    if wait_all {
        word & mask == mask
    } else {
        word & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::satisfied;

    #[test]
    fn any_needs_one_bit_all_needs_every_bit() {
        assert!(satisfied(0b0100, 0b0110, false));
        assert!(!satisfied(0b0100, 0b0110, true));
        assert!(satisfied(0b1110, 0b0110, true));
        assert!(!satisfied(0b1000, 0b0110, false));
    }
}
