//! Software timers
//!
//! A [`Timer`] runs a callback `period_ms` after it is started, then again
//! every period when it auto-reloads. The callback runs on the timer's own
//! execution context, never on the thread that started it, and never with
//! any of the timer's internal locks held, so it may call back into the
//! timer (stop it, change its period).
//!
//! [`Timer::stop`] does not return until the timer context has quiesced. A
//! callback that never returns therefore blocks `stop` forever.

use alloc::boxed::Box;

use crate::dispatch::{query, Capabilities, Capable};
use crate::port::{Backend, DefaultBackend};
use crate::trace;
use crate::types::*;

/// Callback type handed to the backend.
pub type TimerCallback = Box<dyn FnMut() + Send + 'static>;

/// Backend half of a software timer.
///
/// Optional: [`set_period`](RawTimer::set_period) (`TIMER_SET_PERIOD`) and
/// [`is_running`](RawTimer::is_running) (`TIMER_IS_RUNNING`).
pub trait RawTimer: Capable + Default + Send + Sync {
    /// Busy if already created, Error for a zero period.
    fn create(&mut self, name: &str, callback: TimerCallback, period_ms: u32, auto_reload: bool) -> OsStatus;
    /// Stops the timer if needed and drops the callback.
    fn delete(&mut self) -> OsStatus;
    /// Error if not created or already running.
    fn start(&self) -> OsStatus;
    /// Ok if already stopped.
    fn stop(&self) -> OsStatus;

    fn set_period(&self, period_ms: u32) -> OsStatus {
        let _ = period_ms;
        OsStatus::Error
    }

    fn is_running(&self) -> bool {
        false
    }
}

/// A one-shot or periodic software timer.
///
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use osal::{OsStatus, Timer};
///
/// let fired = Arc::new(AtomicU32::new(0));
/// let counter = fired.clone();
///
/// let mut timer: Timer = Timer::new();
/// timer.create("blink", move || { counter.fetch_add(1, Ordering::Relaxed); }, 5, false);
/// assert_eq!(timer.start(), OsStatus::Ok);
/// std::thread::sleep(std::time::Duration::from_millis(50));
/// assert_eq!(fired.load(Ordering::Relaxed), 1);
/// assert!(!timer.is_running());
/// ```
pub struct Timer<B: Backend = DefaultBackend> {
    raw: B::Timer,
}

impl<B: Backend> Timer<B> {
    pub fn new() -> Self {
        Self { raw: B::Timer::default() }
    }

    /// Configures the timer. It stays stopped until [`start`](Self::start).
    pub fn create<F>(&mut self, name: &str, callback: F, period_ms: u32, auto_reload: bool) -> OsStatus
    where
        F: FnMut() + Send + 'static,
    {
        let status = self.raw.create(name, Box::new(callback), period_ms, auto_reload);
        trace::trace_timer_create(self.trace_id(), name, period_ms, auto_reload, status);
        status
    }

    pub fn delete(&mut self) -> OsStatus {
        trace::trace_timer_delete(self.trace_id());
        self.raw.delete()
    }

    pub fn start(&self) -> OsStatus {
        let status = self.raw.start();
        trace::trace_timer_start(self.trace_id(), status);
        status
    }

    /// Stops the timer and waits for its context to go idle. After this
    /// returns the callback does not run again until the next `start`.
    pub fn stop(&self) -> OsStatus {
        let status = self.raw.stop();
        trace::trace_timer_stop(self.trace_id(), status);
        status
    }

    /// Changes the period from the next cycle on. Error on backends without
    /// `TIMER_SET_PERIOD`.
    pub fn set_period(&self, period_ms: u32) -> OsStatus {
        let status = query::<B::Timer, _>(Capabilities::TIMER_SET_PERIOD, OsStatus::Error, || {
            self.raw.set_period(period_ms)
        });
        trace::trace_timer_set_period(self.trace_id(), period_ms, status);
        status
    }

    /// Counting down or running the callback.
    pub fn is_running(&self) -> bool {
        query::<B::Timer, _>(Capabilities::TIMER_IS_RUNNING, false, || self.raw.is_running())
    }

    #[inline(always)]
    fn trace_id(&self) -> trace::TraceId {
        self as *const Self as *const ()
    }
}

impl<B: Backend> Default for Timer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Drop for Timer<B> {
    fn drop(&mut self) {
        let _ = self.raw.delete();
    }
}
