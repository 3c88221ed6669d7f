/*
 * SPDX-License-Identifier: MIT
 */

//! Memory management
//!
//! Deterministic block allocation for message payloads and other objects
//! that are too large, or too frequently recycled, to go through the
//! global allocator on every use.
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`MemoryPool`] | Public pool primitive, generic over the port |
//! | [`FreeList`] | Port-independent block store the ports build on |

pub mod free_list;
pub mod pool;

pub use free_list::FreeList;
pub use pool::{MemoryPool, RawMemoryPool};
