use std::ptr::NonNull;
use std::sync::Mutex;

use crate::dispatch::{Capabilities, Capable};
use crate::memory::free_list::FreeList;
use crate::memory::pool::RawMemoryPool;
use crate::types::*;

use super::lock;

/// Memory pool over one [`FreeList`]. Allocation never waits.
pub struct StdMemoryPool<T> {
    blocks: Option<Mutex<FreeList<T>>>,
}

impl<T> Default for StdMemoryPool<T> {
    fn default() -> Self {
        Self { blocks: None }
    }
}

impl<T> Capable for StdMemoryPool<T> {
    const CAPABILITIES: Capabilities = Capabilities::POOL_COUNT.union(Capabilities::POOL_FREE_COUNT);
}

impl<T: Send> RawMemoryPool<T> for StdMemoryPool<T> {
    fn create(&mut self, block_count: u32) -> OsStatus {
        if self.blocks.is_some() {
            return OsStatus::Busy;
        }
        match FreeList::new(block_count as usize) {
            Ok(list) => {
                self.blocks = Some(Mutex::new(list));
                OsStatus::Ok
            }
            Err(e) => {
                log::debug!("pool of {} blocks not created: {}", block_count, e);
                e.into()
            }
        }
    }

    fn delete(&mut self) -> OsStatus {
        self.blocks = None;
        OsStatus::Ok
    }

    fn alloc(&self, _timeout: Timeout) -> Option<NonNull<T>> {
        lock(self.blocks.as_ref()?).pop()
    }

    fn free(&self, block: NonNull<T>) -> OsStatus {
        let Some(blocks) = &self.blocks else {
            return OsStatus::Error;
        };
        match lock(blocks).push(block) {
            Ok(()) => OsStatus::Ok,
            Err(e) => {
                log::warn!("rejected free of {:p}: not an allocated block of this pool", block);
                e.into()
            }
        }
    }

    fn get_count(&self) -> u32 {
        self.blocks.as_ref().map_or(0, |b| lock(b).block_count() as u32)
    }

    fn get_free_count(&self) -> u32 {
        self.blocks.as_ref().map_or(0, |b| lock(b).free_count() as u32)
    }
}
