//! This module contains an implementation of a contiguous memory region that
//! knows how to de-allocate itself, [`Bytes`].
use std::fmt::{Debug, Formatter};
use std::ptr::NonNull;

use crate::alloc;
use crate::pool::MemoryPool;

#[derive(Debug)]
enum Inner {
    /// Region allocated through [`crate::pool::allocate_empty_bitmap`]; freed
    /// through [`alloc::free_aligned`] and released from its pool's
    /// accounting.
    Pool {
        ptr: NonNull<u8>,
        len: usize,
        pool: MemoryPool,
    },
    /// Region backed by an ordinary `Vec`.
    Native(Vec<u8>),
}

/// A contiguous, fixed-size memory region of bytes.
///
/// Regions obtained from a [`MemoryPool`] are aligned along cache lines and
/// release their accounting when dropped; regions built from a `Vec` carry no
/// accounting.
pub struct Bytes {
    inner: Inner,
}

impl Bytes {
    /// Takes ownership of a region allocated by [`alloc::allocate_aligned_zeroed`].
    /// # Safety
    /// `ptr` must denote a region of exactly `len` readable and writable
    /// bytes whose `len` was reserved on `pool`.
    pub(crate) unsafe fn from_pool_allocation(
        ptr: NonNull<u8>,
        len: usize,
        pool: MemoryPool,
    ) -> Self {
        Self {
            inner: Inner::Pool { ptr, len, pool },
        }
    }

    /// The number of bytes in this region.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.inner {
            Inner::Pool { len, .. } => *len,
            Inner::Native(data) => data.len(),
        }
    }

    /// Whether this region is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a mutable slice over the whole region.
    #[inline]
    pub fn as_mut(&mut self) -> &mut [u8] {
        match &mut self.inner {
            // Safety: the region is valid for `len` bytes and exclusively
            // borrowed through `self`
            Inner::Pool { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts_mut(ptr.as_ptr(), *len)
            },
            Inner::Native(data) => data,
        }
    }
}

impl std::ops::Deref for Bytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match &self.inner {
            // Safety: the region is valid for `len` bytes
            Inner::Pool { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
            Inner::Native(data) => data,
        }
    }
}

impl From<Vec<u8>> for Bytes {
    #[inline]
    fn from(data: Vec<u8>) -> Self {
        Self {
            inner: Inner::Native(data),
        }
    }
}

impl Drop for Bytes {
    fn drop(&mut self) {
        if let Inner::Pool { ptr, len, pool } = &self.inner {
            // Safety: the region was allocated by `allocate_aligned_zeroed`
            // with exactly `len` bytes
            unsafe { alloc::free_aligned(*ptr, *len) };
            pool.release(*len);
        }
    }
}

impl Debug for Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bytes {{ len: {}, data: ", self.len())?;
        f.debug_list().entries(self.iter()).finish()?;
        write!(f, " }}")
    }
}

// Safety: `Bytes` exclusively owns its region; the pointer is never aliased
// by another `Bytes`.
unsafe impl Send for Bytes {}
unsafe impl Sync for Bytes {}
