//! This module contains [`MemoryPool`], the allocator handle from which every
//! owned bitmap of this crate is obtained.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::bitmap::utils::bytes_for;
use crate::buffer::Bytes;
use crate::error::{Error, Result};

/// A cheaply clonable handle to an accounting memory pool.
///
/// All clones share the same accounting: [`MemoryPool::allocated_bytes`]
/// reports the bytes of every live region allocated through any clone.
/// A pool created with [`MemoryPool::with_limit`] fails allocations that
/// would exceed the limit with [`Error::OutOfMemory`].
#[derive(Debug, Clone, Default)]
pub struct MemoryPool {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    limit: Option<usize>,
    allocated: AtomicUsize,
}

impl MemoryPool {
    /// Creates an unbounded pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool that refuses to hold more than `limit` live bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                limit: Some(limit),
                allocated: AtomicUsize::new(0),
            }),
        }
    }

    /// The number of live bytes currently allocated through this pool.
    pub fn allocated_bytes(&self) -> usize {
        self.inner.allocated.load(Ordering::SeqCst)
    }

    fn reserve(&self, size: usize) -> Result<()> {
        let previous = self.inner.allocated.fetch_add(size, Ordering::SeqCst);
        if let Some(limit) = self.inner.limit {
            if previous + size > limit {
                self.inner.allocated.fetch_sub(size, Ordering::SeqCst);
                return Err(Error::OutOfMemory(format!(
                    "an allocation of {} bytes would exceed the pool limit of {} bytes",
                    size, limit
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn release(&self, size: usize) {
        self.inner.allocated.fetch_sub(size, Ordering::SeqCst);
    }
}

/// Returns a zero-filled, cache-line-aligned region with capacity for
/// `num_bits` bits, accounted on `pool`. Every bit of the region reads as
/// unset.
///
/// Errors iff the allocation cannot be fulfilled.
pub fn allocate_empty_bitmap(num_bits: usize, pool: &MemoryPool) -> Result<Bytes> {
    let size = bytes_for(num_bits);
    pool.reserve(size)?;
    match crate::alloc::allocate_aligned_zeroed(size) {
        // Safety: `ptr` denotes exactly `size` bytes reserved on `pool`
        Ok(ptr) => Ok(unsafe { Bytes::from_pool_allocation(ptr, size, pool.clone()) }),
        Err(e) => {
            pool.release(size);
            Err(e)
        }
    }
}
