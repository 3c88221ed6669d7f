//! Synchronization and scheduling primitives
//!
//! Each primitive is a thin generic wrapper over the raw implementation its
//! [`Backend`](crate::port::Backend) supplies. The wrapper owns the raw
//! object, resolves optional operations through
//! [`dispatch`](crate::dispatch), calls the [`trace`](crate::trace) hooks and
//! deletes the raw object when dropped.
//!
//! Primitives start out not created. `create` and `delete` need `&mut self`;
//! everything else takes `&self`, so a created primitive is shared between
//! threads with `Arc`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use osal::{Mutex, WAIT_FOREVER};
//!
//! let mut m: Mutex = Mutex::new();
//! m.create(false);
//! let m = Arc::new(m);
//!
//! let worker = {
//!     let m = Arc::clone(&m);
//!     std::thread::spawn(move || {
//!         let _held = m.guard();
//!     })
//! };
//! worker.join().unwrap();
//! ```

pub mod event_flags;
pub mod guard;
pub mod mutex;
pub mod queue;
pub mod semaphore;
#[cfg(feature = "threads")]
pub mod thread;
#[cfg(feature = "timers")]
pub mod timer;

pub use event_flags::{EventFlags, RawEventFlags};
pub use guard::{LockGuard, Lockable};
pub use mutex::{Mutex, RawMutex};
pub use queue::{MessageQueue, RawQueue};
pub use semaphore::{RawSemaphore, Semaphore};
#[cfg(feature = "threads")]
pub use thread::{RawThread, StopToken, Thread, ThreadEntry};
#[cfg(feature = "timers")]
pub use timer::{RawTimer, Timer, TimerCallback};
