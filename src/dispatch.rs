//! Capability dispatch
//!
//! Every raw primitive trait has a set of mandatory operations (required
//! methods) and a set of optional ones (provided methods). A backend opts
//! into an optional operation by overriding the method *and* listing the
//! matching bit in its [`Capable::CAPABILITIES`] constant. The public wrappers
//! never call an optional method directly; they go through [`dispatch`] or
//! [`query`], which return the documented fallback when the bit is absent.
//!
//! `CAPABILITIES` is an associated constant, so the check below is folded at
//! compile time and a backend that omits an operation pays nothing for it.
//!
//! ```
//! use osal::dispatch::{query, Capabilities, Capable};
//!
//! struct Counter;
//! impl Capable for Counter {
//!     const CAPABILITIES: Capabilities = Capabilities::SEMAPHORE_COUNT;
//! }
//!
//! assert_eq!(query::<Counter, _>(Capabilities::SEMAPHORE_COUNT, 0, || 7), 7);
//! assert_eq!(query::<Counter, _>(Capabilities::QUEUE_COUNT, 0, || 7), 0);
//! ```

use bitflags::bitflags;

bitflags! {
    /// Optional operations a backend primitive may provide.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        // Mutex
        const TRY_LOCK = 1 << 0;

        // Semaphore
        const SEMAPHORE_COUNT = 1 << 1;

        // Event flags
        const FLAGS_CLEAR = 1 << 2;
        const FLAGS_GET = 1 << 3;

        // Message queue
        const QUEUE_PUT_TO_FRONT = 1 << 4;
        const QUEUE_COUNT = 1 << 5;
        const QUEUE_CAPACITY = 1 << 6;
        const QUEUE_RESET = 1 << 7;

        // Memory pool
        const POOL_COUNT = 1 << 8;
        const POOL_FREE_COUNT = 1 << 9;

        // Timer
        const TIMER_SET_PERIOD = 1 << 10;
        const TIMER_IS_RUNNING = 1 << 11;

        // Thread
        const THREAD_JOIN = 1 << 12;
        const THREAD_DETACH = 1 << 13;
        const THREAD_IS_RUNNING = 1 << 14;
        const THREAD_NAME = 1 << 15;
        const THREAD_PRIORITY = 1 << 16;
        const THREAD_STACK_SIZE = 1 << 17;
        /// Covers both suspend and resume.
        const THREAD_SUSPEND = 1 << 18;
        const THREAD_SET_PRIORITY = 1 << 19;
        const THREAD_SET_AFFINITY = 1 << 20;
    }
}

/// A backend primitive that declares which optional operations it implements.
pub trait Capable {
    /// Optional operations this implementation overrides.
    const CAPABILITIES: Capabilities;

    /// Returns `true` if every bit of `cap` is declared.
    #[inline(always)]
    fn supports(cap: Capabilities) -> bool {
        Self::CAPABILITIES.contains(cap)
    }
}

/// Runs an optional operation that produces nothing.
///
/// Returns `true` if the operation ran, `false` if the backend does not
/// declare `cap` and the call was dropped.
#[inline(always)]
pub fn dispatch<B: Capable + ?Sized>(cap: Capabilities, op: impl FnOnce()) -> bool {
    if B::supports(cap) {
        op();
        true
    } else {
        false
    }
}

/// Runs an optional operation that produces a value, or yields `fallback`.
#[inline(always)]
pub fn query<B: Capable + ?Sized, R>(cap: Capabilities, fallback: R, op: impl FnOnce() -> R) -> R {
    if B::supports(cap) {
        op()
    } else {
        fallback
    }
}
