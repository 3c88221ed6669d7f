/*
 * SPDX-License-Identifier: MIT
 */

//! Compile-time configuration.
//!
//! Everything here is a plain constant so that backends can fold it away.
//! Feature selection (which primitives are built, whether trace hooks log)
//! lives in Cargo features; see the crate documentation.

use crate::types::ThreadPriority;

// =============================================================================
// Time base
// =============================================================================

/// Tick rate in Hz. Timeouts are expressed in milliseconds, so the portable
/// backend runs a 1 kHz tick.
pub const TICK_RATE_HZ: u32 = 1000;

// =============================================================================
// Threads
// =============================================================================

/// Stack size used when a thread is created with a stack size of 0 (bytes).
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024;

/// Names longer than this are truncated before being handed to the backend.
/// Matches the 15-character limit of `pthread_setname_np` plus terminator.
pub const MAX_TASK_NAME_LEN: usize = 16;

/// Priority given to threads that don't ask for one.
pub const DEFAULT_PRIORITY: ThreadPriority = ThreadPriority::Normal;

// =============================================================================
// Timers
// =============================================================================

/// Prefix for the execution context that drives each software timer.
pub const TIMER_THREAD_PREFIX: &str = "tmr:";

// =============================================================================
// Optional behavior
// =============================================================================

/// Honor `recursive = true` in mutex creation. When disabled, backends treat
/// every mutex as non-recursive.
pub const USE_RECURSIVE_MUTEXES: bool = true;

// =============================================================================
// Debug / Assert
// =============================================================================

/// Controls whether [`config_assert`] checks anything.
pub const ASSERT_DEFINED: bool = true;

/// Debug assertion used for internal invariants.
#[inline(always)]
pub fn config_assert(condition: bool) {
    if ASSERT_DEFINED {
        debug_assert!(condition, "osal assertion failed");
    }
}

/// Truncate a name to [`MAX_TASK_NAME_LEN`] - 1 characters, ending it at
/// the first NUL if there is one.
pub(crate) fn task_name(name: &str) -> &str {
    let name = name.split('\0').next().unwrap_or_default();
    match name.char_indices().nth(MAX_TASK_NAME_LEN - 1) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}
