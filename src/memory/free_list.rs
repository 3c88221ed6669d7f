/*
 * SPDX-License-Identifier: MIT
 */

//! Intrusive free list over one contiguous block buffer.
//!
//! The buffer is carved into `block_count` blocks, each large enough for a
//! `T` or a free-list link and aligned for both. While a block is free its
//! first bytes hold the link to the next free block, so the list costs no
//! memory beyond the blocks themselves. Blocks are threaded in address order
//! at creation; after that, freeing pushes to the head and allocation pops
//! from it, so the most recently freed block is reused first.
//!
//! A side bitmap (one bit per block, stored outside the blocks) records which
//! blocks are handed out. Freeing a block that is not currently allocated is
//! rejected, so the free list can never hold more than `block_count` entries.

use alloc::alloc::{alloc, dealloc, Layout};
use alloc::vec::Vec;
use core::marker::PhantomData;
use core::mem::{align_of, size_of};
use core::ptr::NonNull;

use crate::config::config_assert;
use crate::types::OsError;

/// Link stored in a free block
struct FreeNode {
    next: Option<NonNull<FreeNode>>,
}

pub struct FreeList<T> {
    buffer: NonNull<u8>,
    layout: Layout,
    block_count: usize,
    head: Option<NonNull<FreeNode>>,
    free_count: usize,
    allocated: Vec<u64>,
    _marker: PhantomData<T>,
}

// The list owns its buffer; blocks move between threads as raw pointers.
unsafe impl<T: Send> Send for FreeList<T> {}

impl<T> FreeList<T> {
    /// Alignment of every block.
    pub const BLOCK_ALIGN: usize = if align_of::<T>() > align_of::<FreeNode>() {
        align_of::<T>()
    } else {
        align_of::<FreeNode>()
    };

    /// Distance between consecutive blocks.
    pub const BLOCK_SIZE: usize = {
        let raw = if size_of::<T>() > size_of::<FreeNode>() {
            size_of::<T>()
        } else {
            size_of::<FreeNode>()
        };
        (raw + Self::BLOCK_ALIGN - 1) & !(Self::BLOCK_ALIGN - 1)
    };

    /// Allocates the buffer and threads every block onto the list.
    pub fn new(block_count: usize) -> Result<Self, OsError> {
        if block_count == 0 {
            return Err(OsError::Error);
        }

        let total = Self::BLOCK_SIZE.checked_mul(block_count).ok_or(OsError::NoMemory)?;
        let layout = Layout::from_size_align(total, Self::BLOCK_ALIGN).map_err(|_| OsError::NoMemory)?;

        let words = block_count.div_ceil(64);
        let mut allocated = Vec::new();
        allocated.try_reserve_exact(words).map_err(|_| OsError::NoMemory)?;
        allocated.resize(words, 0);

        // SAFETY: `layout` has a non-zero size since block_count > 0 and
        // BLOCK_SIZE >= size_of::<FreeNode>().
        let buffer = NonNull::new(unsafe { alloc(layout) }).ok_or(OsError::NoMemory)?;

        let mut list = Self {
            buffer,
            layout,
            block_count,
            head: None,
            free_count: block_count,
            allocated,
            _marker: PhantomData,
        };
        for index in (0..block_count).rev() {
            let node = list.node(index);
            // SAFETY: `node` is in bounds and aligned for FreeNode.
            unsafe { node.as_ptr().write(FreeNode { next: list.head }) };
            list.head = Some(node);
        }
        Ok(list)
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    pub fn free_count(&self) -> usize {
        self.free_count
    }

    /// Takes the head block, or `None` when every block is handed out.
    pub fn pop(&mut self) -> Option<NonNull<T>> {
        let node = self.head?;
        let index = self.index_of(node.as_ptr() as usize)?;
        // SAFETY: nodes on the list are free blocks holding a valid link.
        self.head = unsafe { node.as_ref().next };
        self.free_count -= 1;
        self.mark(index, true);
        Some(node.cast())
    }

    /// Returns `block` to the head of the list.
    ///
    /// Fails with [`OsError::Error`] if `block` does not point at the start
    /// of one of this list's blocks, or if that block is not allocated.
    pub fn push(&mut self, block: NonNull<T>) -> Result<(), OsError> {
        let index = self.index_of(block.as_ptr() as usize).ok_or(OsError::Error)?;
        if !self.is_allocated(index) {
            return Err(OsError::Error);
        }
        self.mark(index, false);

        let node = self.node(index);
        // SAFETY: the block belongs to this buffer and the caller gave it up.
        unsafe { node.as_ptr().write(FreeNode { next: self.head }) };
        self.head = Some(node);
        self.free_count += 1;
        config_assert(self.free_count <= self.block_count);
        Ok(())
    }

    /// Whether `block` is one of this list's blocks and currently handed out.
    pub fn owns(&self, block: NonNull<T>) -> bool {
        self.index_of(block.as_ptr() as usize)
            .is_some_and(|index| self.is_allocated(index))
    }

    fn node(&self, index: usize) -> NonNull<FreeNode> {
        // SAFETY: callers pass index < block_count, so the offset stays
        // inside the buffer.
        unsafe { self.buffer.add(index * Self::BLOCK_SIZE).cast() }
    }

    fn index_of(&self, addr: usize) -> Option<usize> {
        let offset = addr.checked_sub(self.buffer.as_ptr() as usize)?;
        if offset % Self::BLOCK_SIZE != 0 {
            return None;
        }
        let index = offset / Self::BLOCK_SIZE;
        (index < self.block_count).then_some(index)
    }

    fn is_allocated(&self, index: usize) -> bool {
        self.allocated[index / 64] & (1 << (index % 64)) != 0
    }

    fn mark(&mut self, index: usize, allocated: bool) {
        let bit = 1u64 << (index % 64);
        if allocated {
            self.allocated[index / 64] |= bit;
        } else {
            self.allocated[index / 64] &= !bit;
        }
    }
}

impl<T> Drop for FreeList<T> {
    fn drop(&mut self) {
        // SAFETY: allocated in `new` with this exact layout.
        unsafe { dealloc(self.buffer.as_ptr(), self.layout) };
    }
}
