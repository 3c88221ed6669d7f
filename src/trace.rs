/*
 * SPDX-License-Identifier: MIT
 *
 * Trace hooks are called by the generic primitive layer at each operation.
 * They compile to nothing unless the `trace-facility` feature is enabled, in
 * which case each hook emits a `log` record with target `osal::trace`.
 */

//! Trace Hooks
//!
//! Every primitive wrapper calls one of these hooks after it has resolved an
//! operation, whatever backend carried it out. By default the hooks are
//! empty and inline away, so the primitives have no diagnostic side effect.
//!
//! ## Categories
//!
//! - `trace_mutex_*` - Mutex operations
//! - `trace_semaphore_*` - Semaphore operations
//! - `trace_event_flags_*` - Event flag operations
//! - `trace_queue_*` - Message queue operations
//! - `trace_pool_*` - Memory pool operations
//! - `trace_timer_*` - Timer events
//! - `trace_thread_*` - Thread lifecycle
//!
//! ## Usage
//!
//! Enable the `trace-facility` feature and install any `log` implementation.
//! Records are emitted at `Trace` level, so filter on the target:
//!
//! ```text
//! RUST_LOG=osal::trace=trace cargo test --features trace-facility
//! ```

#![allow(unused_variables)]

use crate::types::{EventBits, OsError, OsStatus, Timeout};

macro_rules! emit {
    ($($arg:tt)+) => {
        #[cfg(feature = "trace-facility")]
        log::trace!(target: "osal::trace", $($arg)+);
    };
}

/// Identity of a primitive instance in trace output.
pub type TraceId = *const ();

// =============================================================================
// Mutex tracing
// =============================================================================

#[inline(always)]
pub fn trace_mutex_create(mutex: TraceId, recursive: bool, status: OsStatus) {
    emit!("mutex {:p} create recursive={} -> {}", mutex, recursive, status);
}

#[inline(always)]
pub fn trace_mutex_delete(mutex: TraceId) {
    emit!("mutex {:p} delete", mutex);
}

#[inline(always)]
pub fn trace_mutex_lock(mutex: TraceId, timeout: Timeout, status: OsStatus) {
    emit!("mutex {:p} lock timeout={} -> {}", mutex, timeout, status);
}

#[inline(always)]
pub fn trace_mutex_unlock(mutex: TraceId, status: OsStatus) {
    emit!("mutex {:p} unlock -> {}", mutex, status);
}

// =============================================================================
// Semaphore tracing
// =============================================================================

#[inline(always)]
pub fn trace_semaphore_create(sem: TraceId, max_count: u32, initial_count: u32, status: OsStatus) {
    emit!(
        "semaphore {:p} create max={} initial={} -> {}",
        sem,
        max_count,
        initial_count,
        status
    );
}

#[inline(always)]
pub fn trace_semaphore_delete(sem: TraceId) {
    emit!("semaphore {:p} delete", sem);
}

#[inline(always)]
pub fn trace_semaphore_acquire(sem: TraceId, timeout: Timeout, status: OsStatus) {
    emit!("semaphore {:p} acquire timeout={} -> {}", sem, timeout, status);
}

#[inline(always)]
pub fn trace_semaphore_release(sem: TraceId, status: OsStatus) {
    emit!("semaphore {:p} release -> {}", sem, status);
}

// =============================================================================
// Event flag tracing
// =============================================================================

#[inline(always)]
pub fn trace_event_flags_create(flags: TraceId, status: OsStatus) {
    emit!("event flags {:p} create -> {}", flags, status);
}

#[inline(always)]
pub fn trace_event_flags_delete(flags: TraceId) {
    emit!("event flags {:p} delete", flags);
}

#[inline(always)]
pub fn trace_event_flags_set(flags: TraceId, mask: EventBits, word: EventBits) {
    emit!("event flags {:p} set {:#010x} -> {:#010x}", flags, mask, word);
}

#[inline(always)]
pub fn trace_event_flags_clear(flags: TraceId, mask: EventBits, previous: EventBits) {
    emit!("event flags {:p} clear {:#010x} (was {:#010x})", flags, mask, previous);
}

#[inline(always)]
pub fn trace_event_flags_wait(
    flags: TraceId,
    mask: EventBits,
    wait_all: bool,
    auto_clear: bool,
    timeout: Timeout,
    result: &Result<EventBits, OsError>,
) {
    emit!(
        "event flags {:p} wait {:#010x} all={} clear={} timeout={} -> {:?}",
        flags,
        mask,
        wait_all,
        auto_clear,
        timeout,
        result
    );
}

// =============================================================================
// Queue tracing
// =============================================================================

#[inline(always)]
pub fn trace_queue_create(queue: TraceId, capacity: u32, item_size: usize, status: OsStatus) {
    emit!(
        "queue {:p} create capacity={} item_size={} -> {}",
        queue,
        capacity,
        item_size,
        status
    );
}

#[inline(always)]
pub fn trace_queue_delete(queue: TraceId) {
    emit!("queue {:p} delete", queue);
}

#[inline(always)]
pub fn trace_queue_send(queue: TraceId, to_front: bool, timeout: Timeout, status: OsStatus) {
    emit!(
        "queue {:p} send front={} timeout={} -> {}",
        queue,
        to_front,
        timeout,
        status
    );
}

#[inline(always)]
pub fn trace_queue_receive(queue: TraceId, timeout: Timeout, status: OsStatus) {
    emit!("queue {:p} receive timeout={} -> {}", queue, timeout, status);
}

#[inline(always)]
pub fn trace_queue_reset(queue: TraceId, status: OsStatus) {
    emit!("queue {:p} reset -> {}", queue, status);
}

// =============================================================================
// Memory pool tracing
// =============================================================================

#[inline(always)]
pub fn trace_pool_create(pool: TraceId, block_count: u32, block_size: usize, status: OsStatus) {
    emit!(
        "pool {:p} create blocks={} block_size={} -> {}",
        pool,
        block_count,
        block_size,
        status
    );
}

#[inline(always)]
pub fn trace_pool_delete(pool: TraceId) {
    emit!("pool {:p} delete", pool);
}

#[inline(always)]
pub fn trace_pool_alloc(pool: TraceId, block: Option<*const ()>) {
    emit!("pool {:p} alloc -> {:?}", pool, block);
}

#[inline(always)]
pub fn trace_pool_free(pool: TraceId, block: *const (), status: OsStatus) {
    emit!("pool {:p} free {:p} -> {}", pool, block, status);
}

// =============================================================================
// Timer tracing
// =============================================================================

#[inline(always)]
pub fn trace_timer_create(timer: TraceId, name: &str, period_ms: u32, auto_reload: bool, status: OsStatus) {
    emit!(
        "timer {:p} '{}' create period={}ms auto_reload={} -> {}",
        timer,
        name,
        period_ms,
        auto_reload,
        status
    );
}

#[inline(always)]
pub fn trace_timer_delete(timer: TraceId) {
    emit!("timer {:p} delete", timer);
}

#[inline(always)]
pub fn trace_timer_start(timer: TraceId, status: OsStatus) {
    emit!("timer {:p} start -> {}", timer, status);
}

#[inline(always)]
pub fn trace_timer_stop(timer: TraceId, status: OsStatus) {
    emit!("timer {:p} stop -> {}", timer, status);
}

#[inline(always)]
pub fn trace_timer_set_period(timer: TraceId, period_ms: u32, status: OsStatus) {
    emit!("timer {:p} period={}ms -> {}", timer, period_ms, status);
}

// =============================================================================
// Thread tracing
// =============================================================================

#[inline(always)]
pub fn trace_thread_create(thread: TraceId, name: &str, stack_size: usize, status: OsStatus) {
    emit!(
        "thread {:p} '{}' create stack={} -> {}",
        thread,
        name,
        stack_size,
        status
    );
}

#[inline(always)]
pub fn trace_thread_terminate(thread: TraceId, status: OsStatus) {
    emit!("thread {:p} terminate -> {}", thread, status);
}

#[inline(always)]
pub fn trace_thread_join(thread: TraceId, status: OsStatus) {
    emit!("thread {:p} join -> {}", thread, status);
}
