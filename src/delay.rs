//! Delay and tick services
//!
//! Free-function access to the time services of a [`Backend`], for code that
//! carries the port as a type parameter rather than an [`Osal`](crate::Osal)
//! value.

use crate::port::Backend;

/// Sleeps for at least `ms` milliseconds.
#[inline]
pub fn delay<B: Backend>(ms: u32) {
    B::delay(ms)
}

/// Sleeps until `*previous_wake + increment_ms` and advances `previous_wake`.
///
/// ```no_run
/// use osal::{delay, StdBackend};
///
/// let mut wake = delay::tick_count::<StdBackend>();
/// loop {
///     delay::delay_until::<StdBackend>(&mut wake, 10);
///     // runs every 10 ms
/// }
/// ```
#[inline]
pub fn delay_until<B: Backend>(previous_wake: &mut u32, increment_ms: u32) {
    B::delay_until(previous_wake, increment_ms)
}

#[inline]
pub fn tick_count<B: Backend>() -> u32 {
    B::tick_count()
}

#[inline]
pub fn tick_freq<B: Backend>() -> u32 {
    B::tick_freq()
}

/// Milliseconds left before `previous_wake + increment_ms`, as seen at `now`.
///
/// All three values live on the wrapping millisecond tick. Returns 0 when the
/// wake time has already passed.
pub const fn remaining_until(previous_wake: u32, increment_ms: u32, now: u32) -> u32 {
    let elapsed = now.wrapping_sub(previous_wake);
    if elapsed < increment_ms {
        increment_ms - elapsed
    } else {
        0
    }
}
