use std::string::String;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use scopeguard::defer;

use crate::config::{task_name, DEFAULT_STACK_SIZE};
use crate::dispatch::{Capabilities, Capable};
use crate::port::Backend;
use crate::sync::thread::{RawThread, StopToken, ThreadEntry};
use crate::types::*;

use super::{lock, StdBackend};

/// A `std::thread` with a cooperative stop flag.
///
/// Priorities are recorded but not applied; std has no portable way to.
#[derive(Default)]
pub struct StdThread {
    name: String,
    priority: ThreadPriority,
    stack_size: usize,
    handle: Mutex<Option<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
    stop: StopToken,
}

impl Capable for StdThread {
    const CAPABILITIES: Capabilities = Capabilities::THREAD_JOIN
        .union(Capabilities::THREAD_DETACH)
        .union(Capabilities::THREAD_IS_RUNNING)
        .union(Capabilities::THREAD_NAME)
        .union(Capabilities::THREAD_PRIORITY)
        .union(Capabilities::THREAD_STACK_SIZE);
}

impl StdThread {
    /// Takes the handle unless it belongs to the calling thread.
    fn take_foreign_handle(&self) -> Result<Option<JoinHandle<()>>, OsError> {
        let mut handle = lock(&self.handle);
        match handle.as_ref() {
            Some(h) if h.thread().id() == thread::current().id() => Err(OsError::Error),
            _ => Ok(handle.take()),
        }
    }
}

impl RawThread for StdThread {
    fn create(&mut self, name: &str, entry: ThreadEntry, stack_size: usize, priority: ThreadPriority) -> OsStatus {
        let attached = self.handle.get_mut().unwrap_or_else(PoisonError::into_inner);
        if attached.is_some() {
            return OsStatus::Busy;
        }

        let stack_size = if stack_size == 0 { DEFAULT_STACK_SIZE } else { stack_size };
        let name = task_name(name);
        let stop = StopToken::new();
        let running = Arc::new(AtomicBool::new(true));

        let spawned = {
            let (stop, running) = (stop.clone(), Arc::clone(&running));
            thread::Builder::new()
                .name(name.into())
                .stack_size(stack_size)
                .spawn(move || {
                    defer! {
                        running.store(false, Ordering::Release);
                    }
                    entry(&stop);
                })
        };

        match spawned {
            Ok(handle) => {
                log::debug!(
                    "thread '{}' started: stack {} bytes, priority {:?} (native {})",
                    name,
                    stack_size,
                    priority,
                    StdBackend::map_priority(priority)
                );
                *attached = Some(handle);
                self.name = name.into();
                self.priority = priority;
                self.stack_size = stack_size;
                self.running = running;
                self.stop = stop;
                OsStatus::Ok
            }
            Err(e) => {
                log::warn!("thread '{}' could not be spawned: {}", name, e);
                OsStatus::NoMemory
            }
        }
    }

    fn terminate(&self) -> OsStatus {
        let handle = match self.take_foreign_handle() {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("thread '{}' cannot terminate itself", self.name);
                return e.into();
            }
        };
        if let Some(handle) = handle {
            self.stop.request_stop();
            if handle.join().is_err() {
                log::debug!("thread '{}' panicked before terminating", self.name);
            }
        }
        OsStatus::Ok
    }

    fn join(&self) -> OsStatus {
        match self.take_foreign_handle() {
            Ok(Some(handle)) => match handle.join() {
                Ok(()) => OsStatus::Ok,
                Err(_) => OsStatus::Error,
            },
            Ok(None) => OsStatus::Error,
            Err(e) => e.into(),
        }
    }

    fn detach(&self) -> OsStatus {
        match lock(&self.handle).take() {
            Some(_) => OsStatus::Ok,
            None => OsStatus::Error,
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> ThreadPriority {
        self.priority
    }

    fn stack_size(&self) -> usize {
        self.stack_size
    }
}
