/*
 * SPDX-License-Identifier: MIT
 *
 * Portable port over `std::sync` and `std::thread`. Every primitive is one
 * `std::sync::Mutex` guarding its state plus the condition variables its
 * waiters sleep on.
 */

//! Std Port
//!
//! Realizes each primitive once over the standard library, so the layer runs
//! on any hosted target. All optional operations with a portable equivalent
//! are provided; thread suspension, priorities and affinity are not.
//!
//! Internal locks recover from poisoning: a callback or entry function that
//! panics never takes a primitive down for other threads.

use std::sync::{Condvar, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use crate::config::TICK_RATE_HZ;
use crate::port::Backend;
use crate::types::{Timeout, NO_WAIT, WAIT_FOREVER};

mod event_flags;
mod mutex;
mod pool;
mod queue;
mod semaphore;
#[cfg(feature = "threads")]
mod thread;
#[cfg(feature = "timers")]
mod timer;

pub use event_flags::StdEventFlags;
pub use mutex::StdMutex;
pub use pool::StdMemoryPool;
pub use queue::StdQueue;
pub use semaphore::StdSemaphore;
#[cfg(feature = "threads")]
pub use thread::StdThread;
#[cfg(feature = "timers")]
pub use timer::StdTimer;

/// The std port.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdBackend;

impl Backend for StdBackend {
    const NAME: &'static str = "std";

    // std threads have no priorities; keep the normalized scale.
    const PRIORITY_RANGE: (i32, i32) = (0, 100);

    type Mutex = StdMutex;
    type Semaphore = StdSemaphore;
    type EventFlags = StdEventFlags;
    type Queue<T: Copy + Send + 'static> = StdQueue<T>;
    type MemoryPool<T: Send + 'static> = StdMemoryPool<T>;
    #[cfg(feature = "timers")]
    type Timer = StdTimer;
    #[cfg(feature = "threads")]
    type Thread = StdThread;

    fn delay(ms: u32) {
        std::thread::sleep(Duration::from_millis(ms.into()));
    }

    fn tick_count() -> u32 {
        // Truncation is the wrap.
        epoch().elapsed().as_millis() as u32
    }

    fn tick_freq() -> u32 {
        TICK_RATE_HZ
    }
}

fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Locks `mutex`, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Waits on `cond` while `blocked` holds, for at most `timeout` ms.
///
/// `NO_WAIT` checks once, `WAIT_FOREVER` has no deadline. The condition is
/// always evaluated with the lock held. Returns the guard and whether the
/// condition still blocks, i.e. the wait timed out.
pub(crate) fn wait_while<'a, T, F>(
    cond: &Condvar,
    mut guard: MutexGuard<'a, T>,
    timeout: Timeout,
    mut blocked: F,
) -> (MutexGuard<'a, T>, bool)
where
    F: FnMut(&mut T) -> bool,
{
    match timeout {
        NO_WAIT => {
            let still = blocked(&mut guard);
            (guard, still)
        }
        WAIT_FOREVER => {
            let guard = cond
                .wait_while(guard, &mut blocked)
                .unwrap_or_else(PoisonError::into_inner);
            (guard, false)
        }
        ms => {
            let (mut guard, _) = cond
                .wait_timeout_while(guard, Duration::from_millis(ms.into()), &mut blocked)
                .unwrap_or_else(PoisonError::into_inner);
            let still = blocked(&mut guard);
            (guard, still)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn no_wait_checks_once() {
        let m = Mutex::new(0u32);
        let cond = Condvar::new();
        let (guard, blocked) = wait_while(&cond, lock(&m), NO_WAIT, |v| *v == 0);
        drop(guard);
        assert!(blocked);
        let (guard, blocked) = wait_while(&cond, lock(&m), NO_WAIT, |v| *v == 1);
        drop(guard);
        assert!(!blocked);
    }

    #[test]
    fn timed_wait_expires() {
        let m = Mutex::new(());
        let cond = Condvar::new();
        let start = Instant::now();
        let (guard, blocked) = wait_while(&cond, lock(&m), 20, |_| true);
        drop(guard);
        assert!(blocked);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn wait_forever_returns_once_notified() {
        let shared = Arc::new((Mutex::new(false), Condvar::new()));
        let setter = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                *lock(&shared.0) = true;
                shared.1.notify_all();
            })
        };
        let (guard, blocked) = wait_while(&shared.1, lock(&shared.0), WAIT_FOREVER, |ready| !*ready);
        assert!(!blocked);
        assert!(*guard);
        drop(guard);
        setter.join().unwrap();
    }

    #[test]
    fn lock_survives_poisoning() {
        let m = Arc::new(Mutex::new(1));
        let poisoner = Arc::clone(&m);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();
        assert!(m.is_poisoned());
        assert_eq!(*lock(&m), 1);
    }

    #[test]
    fn tick_count_advances() {
        let start = StdBackend::tick_count();
        StdBackend::delay(15);
        assert!(StdBackend::tick_count().wrapping_sub(start) >= 15);
        assert_eq!(StdBackend::tick_freq(), 1000);
    }
}
