//! Fixed-block memory pool
//!
//! A [`MemoryPool<T>`] hands out uninitialized blocks sized and aligned for
//! `T` from one buffer reserved at creation. Allocation and release are O(1)
//! and never touch the global allocator; allocation never blocks.
//!
//! Blocks are raw pointers. The pool does not run `T`'s destructor on
//! [`free`](MemoryPool::free), and every block becomes dangling when the pool
//! is deleted.

use core::mem::size_of;
use core::ptr::NonNull;

use crate::dispatch::{query, Capabilities, Capable};
use crate::memory::free_list::FreeList;
use crate::port::{Backend, DefaultBackend};
use crate::trace;
use crate::types::*;

/// Backend half of a memory pool.
///
/// Optional: [`get_count`](RawMemoryPool::get_count) (`POOL_COUNT`) and
/// [`get_free_count`](RawMemoryPool::get_free_count) (`POOL_FREE_COUNT`).
pub trait RawMemoryPool<T>: Capable + Default + Send + Sync {
    /// Busy if already created, Error for zero blocks, NoMemory if the
    /// buffer cannot be reserved.
    fn create(&mut self, block_count: u32) -> OsStatus;
    fn delete(&mut self) -> OsStatus;
    /// `None` when exhausted or not created.
    fn alloc(&self, timeout: Timeout) -> Option<NonNull<T>>;
    /// Error unless `block` is a block of this pool that is currently
    /// allocated.
    fn free(&self, block: NonNull<T>) -> OsStatus;

    fn get_count(&self) -> u32 {
        0
    }

    fn get_free_count(&self) -> u32 {
        0
    }
}

/// A pool of fixed-size blocks of `T`.
///
/// ```
/// use osal::{MemoryPool, OsStatus, NO_WAIT};
///
/// let mut pool: MemoryPool<[u8; 64]> = MemoryPool::new();
/// pool.create(2);
///
/// let a = pool.alloc_init([0; 64], NO_WAIT).unwrap();
/// let b = pool.alloc(NO_WAIT).unwrap();
/// assert!(pool.alloc(NO_WAIT).is_none());
///
/// assert_eq!(pool.free(b), OsStatus::Ok);
/// assert_eq!(pool.free(b), OsStatus::Error);
/// assert_eq!(pool.alloc(NO_WAIT), Some(b));
/// # let _ = a;
/// ```
pub struct MemoryPool<T: Send + 'static, B: Backend = DefaultBackend> {
    raw: B::MemoryPool<T>,
}

impl<T: Send + 'static, B: Backend> MemoryPool<T, B> {
    pub fn new() -> Self {
        Self {
            raw: Default::default(),
        }
    }

    pub fn create(&mut self, block_count: u32) -> OsStatus {
        let status = self.raw.create(block_count);
        trace::trace_pool_create(self.trace_id(), block_count, FreeList::<T>::BLOCK_SIZE, status);
        status
    }

    /// Releases the buffer. Outstanding blocks dangle afterwards.
    pub fn delete(&mut self) -> OsStatus {
        trace::trace_pool_delete(self.trace_id());
        self.raw.delete()
    }

    /// Takes an uninitialized block. The portable port never waits, so
    /// `timeout` only matters to ports that can block on exhaustion.
    pub fn alloc(&self, timeout: Timeout) -> Option<NonNull<T>> {
        let block = self.raw.alloc(timeout);
        trace::trace_pool_alloc(self.trace_id(), block.map(|b| b.as_ptr() as *const ()));
        block
    }

    /// Takes a block and moves `value` into it.
    pub fn alloc_init(&self, value: T, timeout: Timeout) -> Option<NonNull<T>> {
        let block = self.alloc(timeout)?;
        // SAFETY: a fresh block is valid for writes of one T and aligned.
        unsafe { block.as_ptr().write(value) };
        Some(block)
    }

    /// Returns `block` to the pool. The value in it is not dropped.
    pub fn free(&self, block: NonNull<T>) -> OsStatus {
        let status = self.raw.free(block);
        trace::trace_pool_free(self.trace_id(), block.as_ptr() as *const (), status);
        status
    }

    /// Total number of blocks.
    pub fn get_count(&self) -> u32 {
        query::<B::MemoryPool<T>, _>(Capabilities::POOL_COUNT, 0, || self.raw.get_count())
    }

    /// Blocks currently available.
    pub fn get_free_count(&self) -> u32 {
        query::<B::MemoryPool<T>, _>(Capabilities::POOL_FREE_COUNT, 0, || self.raw.get_free_count())
    }

    /// Size in bytes of each block, padding included.
    pub const fn block_size() -> usize {
        FreeList::<T>::BLOCK_SIZE
    }

    /// Payload size requested per block.
    pub const fn item_size() -> usize {
        size_of::<T>()
    }

    #[inline(always)]
    fn trace_id(&self) -> trace::TraceId {
        self as *const Self as *const ()
    }
}

impl<T: Send + 'static, B: Backend> Default for MemoryPool<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static, B: Backend> Drop for MemoryPool<T, B> {
    fn drop(&mut self) {
        let _ = self.raw.delete();
    }
}
