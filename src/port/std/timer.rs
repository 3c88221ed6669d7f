use std::string::String;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use scopeguard::defer;

use crate::config::{task_name, TIMER_THREAD_PREFIX};
use crate::dispatch::{Capabilities, Capable};
use crate::sync::timer::{RawTimer, TimerCallback};
use crate::types::*;

use super::lock;

struct TimerState {
    running: bool,
    period_ms: u32,
    auto_reload: bool,
    // Bumped by every start and stop; a worker exits once it sees a newer one.
    generation: u64,
    worker: Option<ThreadId>,
    // Callbacks currently executing, counted across runs.
    firing: u32,
}

struct Shared {
    name: String,
    state: Mutex<TimerState>,
    wake: Condvar,
    callback: Mutex<TimerCallback>,
}

/// Software timer with one service thread per armed timer.
///
/// The worker sleeps on a condition variable until the next deadline, so
/// `stop` cuts the wait short. Deadlines advance by exactly one period per
/// firing.
#[derive(Default)]
pub struct StdTimer {
    shared: Option<Arc<Shared>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Capable for StdTimer {
    const CAPABILITIES: Capabilities = Capabilities::TIMER_SET_PERIOD.union(Capabilities::TIMER_IS_RUNNING);
}

impl RawTimer for StdTimer {
    fn create(&mut self, name: &str, callback: TimerCallback, period_ms: u32, auto_reload: bool) -> OsStatus {
        if self.shared.is_some() {
            return OsStatus::Busy;
        }
        if period_ms == 0 {
            return OsStatus::Error;
        }
        self.shared = Some(Arc::new(Shared {
            name: task_name(name).into(),
            state: Mutex::new(TimerState {
                running: false,
                period_ms,
                auto_reload,
                generation: 0,
                worker: None,
                firing: 0,
            }),
            wake: Condvar::new(),
            callback: Mutex::new(callback),
        }));
        OsStatus::Ok
    }

    fn delete(&mut self) -> OsStatus {
        if self.shared.is_some() {
            let _ = self.stop();
        }
        self.shared = None;
        OsStatus::Ok
    }

    fn start(&self) -> OsStatus {
        let Some(shared) = &self.shared else {
            return OsStatus::Error;
        };
        // Reap the worker of the previous run. A worker restarting its own
        // timer from the callback just lets itself go. The join happens with
        // no lock held so that a callback still finishing can use the timer.
        let previous = {
            let mut worker = lock(&self.worker);
            if lock(&shared.state).running {
                return OsStatus::Error;
            }
            worker.take()
        };
        if let Some(previous) = previous {
            if previous.thread().id() != thread::current().id() {
                let _ = previous.join();
            }
        }

        let mut worker = lock(&self.worker);
        let mut state = lock(&shared.state);
        if state.running {
            return OsStatus::Error;
        }
        // The new worker blocks on `state` until this returns, so it cannot
        // observe the generation before the spawn has succeeded.
        let generation = state.generation.wrapping_add(1);
        let name = [TIMER_THREAD_PREFIX, shared.name.as_str()].concat();
        let context = Arc::clone(shared);
        match thread::Builder::new().name(name).spawn(move || run(context, generation)) {
            Ok(handle) => {
                state.running = true;
                state.generation = generation;
                *worker = Some(handle);
                OsStatus::Ok
            }
            Err(e) => {
                log::warn!("timer '{}' could not spawn its thread: {}", shared.name, e);
                OsStatus::NoMemory
            }
        }
    }

    fn stop(&self) -> OsStatus {
        let Some(shared) = &self.shared else {
            return OsStatus::Error;
        };
        // Same lock order as `start`, so the handle taken here belongs to
        // the run being stopped and not to one started concurrently.
        let handle = {
            let mut worker = lock(&self.worker);
            let mut state = lock(&shared.state);
            state.running = false;
            state.generation = state.generation.wrapping_add(1);
            // Stopping from the callback: the worker sees the new generation
            // as soon as the callback returns, and the next `start` reaps it.
            if state.worker == Some(thread::current().id()) {
                None
            } else {
                worker.take()
            }
        };
        shared.wake.notify_all();

        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::warn!("timer '{}' callback panicked", shared.name);
            }
        }
        OsStatus::Ok
    }

    fn set_period(&self, period_ms: u32) -> OsStatus {
        let Some(shared) = &self.shared else {
            return OsStatus::Error;
        };
        if period_ms == 0 {
            return OsStatus::Error;
        }
        lock(&shared.state).period_ms = period_ms;
        OsStatus::Ok
    }

    fn is_running(&self) -> bool {
        self.shared.as_ref().is_some_and(|shared| {
            let state = lock(&shared.state);
            state.running || state.firing > 0
        })
    }
}

/// Worker body for one run of a timer, from `start` until stopped or, for a
/// one-shot timer, until the callback has fired.
fn run(shared: Arc<Shared>, generation: u64) {
    defer! {
        let mut state = lock(&shared.state);
        if state.generation == generation {
            state.running = false;
            state.worker = None;
        }
    }

    let mut deadline = Instant::now();
    loop {
        let mut state = lock(&shared.state);
        if state.generation != generation {
            return;
        }
        state.worker = Some(thread::current().id());
        let period = Duration::from_millis(state.period_ms.into());
        deadline += period;
        // Periods missed while the callback ran are skipped, not replayed.
        let now = Instant::now();
        if deadline <= now {
            deadline = now + period;
        }

        loop {
            if state.generation != generation {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            state = shared
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .0;
        }
        let auto_reload = state.auto_reload;
        state.firing += 1;
        drop(state);

        {
            defer! {
                lock(&shared.state).firing -= 1;
            }
            let mut callback = lock(&shared.callback);
            (*callback)();
        }

        if !auto_reload {
            return;
        }
    }
}
