/*
 * SPDX-License-Identifier: MIT
 *
 * osal: one contract for mutexes, semaphores, event flags, message queues,
 * memory pools, timers and threads, over interchangeable scheduler ports.
 */

//! # osal - Operating System Abstraction Layer
//!
//! Synchronization and scheduling primitives with one uniform contract and
//! interchangeable backends ("ports"). Application code is written against
//! the generic wrappers and picks a port once, either as a type parameter or
//! through an [`Osal`] handle.
//!
//! | Primitive | Mandatory | Optional |
//! |---|---|---|
//! | [`Mutex`] | create, delete, lock, unlock | try_lock |
//! | [`Semaphore`] | create, delete, acquire, release | get_count |
//! | [`EventFlags`] | create, delete, set, wait | clear, get |
//! | [`MessageQueue`] | create, delete, put, get | put_to_front, get_count, get_capacity, reset |
//! | [`MemoryPool`] | create, delete, alloc, free | get_count, get_free_count |
//! | `Timer` | create, delete, start, stop | set_period, is_running |
//! | `Thread` | create, terminate | join, detach, is_running, name, priority, stack_size, suspend, resume, set_priority, set_affinity |
//!
//! A port implements every mandatory operation and any subset of the
//! optional ones. Optional operations a port leaves out return a fixed
//! fallback (see [`dispatch`]) instead of failing to compile.
//!
//! Every operation reports an [`OsStatus`] (or an [`OsResult`] when it
//! produces a value); nothing panics across the primitive boundary. Timeouts
//! are milliseconds, with [`WAIT_FOREVER`] and [`NO_WAIT`] as the two
//! special values.
//!
//! ## Features
//!
//! - `std` - the std port, and the default port of every wrapper (default)
//! - `timers` - software timers (default)
//! - `threads` - worker threads (default)
//! - `trace-facility` - trace hooks emit `log` records
//!
//! ## Example
//!
//! ```
//! use osal::{Osal, OsError, NO_WAIT};
//!
//! let os: Osal = Osal::default();
//! let flags = os.event_flags().unwrap();
//! flags.set(0b01);
//! assert_eq!(flags.wait(0b11, false, true, NO_WAIT), Ok(0b01));
//! assert_eq!(flags.wait(0b11, false, true, NO_WAIT), Err(OsError::Timeout));
//! ```

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// Core modules
pub mod config;
pub mod dispatch;
pub mod trace;
pub mod types;

// Port layer
pub mod port;

// Primitives
pub mod delay;
pub mod memory;
pub mod sync;

pub use config::*;
pub use types::*;

pub use memory::MemoryPool;
pub use port::{Backend, DefaultBackend, DummyBackend, Osal};
#[cfg(feature = "std")]
pub use port::StdBackend;
pub use sync::{EventFlags, LockGuard, Lockable, MessageQueue, Mutex, Semaphore};
#[cfg(feature = "threads")]
pub use sync::{StopToken, Thread};
#[cfg(feature = "timers")]
pub use sync::Timer;
