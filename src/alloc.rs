//! Cache-line-aligned allocation of byte regions, with process-wide
//! accounting of every byte obtained through this module.
use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicIsize, Ordering};

use crate::error::{Error, Result};

/// The alignment, in bytes, of every non-empty region returned by
/// [`allocate_aligned_zeroed`].
pub const ALIGNMENT: usize = 64;

// every byte obtained through this module, across all pools
static ALLOCATIONS: AtomicIsize = AtomicIsize::new(0);

/// Returns the total number of bytes currently allocated by this crate's
/// aligned allocator, across all pools.
pub fn total_allocated_bytes() -> isize {
    ALLOCATIONS.load(Ordering::SeqCst)
}

#[inline]
fn dangling() -> NonNull<u8> {
    // Safety: `ALIGNMENT` is non-zero
    unsafe { NonNull::new_unchecked(ALIGNMENT as *mut u8) }
}

/// Allocates a zero-initialized region of `size` bytes aligned along cache
/// lines. A `size` of zero returns a dangling, well-aligned pointer and does
/// not allocate.
pub fn allocate_aligned_zeroed(size: usize) -> Result<NonNull<u8>> {
    if size == 0 {
        return Ok(dangling());
    }
    let layout = Layout::from_size_align(size, ALIGNMENT)
        .map_err(|e| Error::OutOfMemory(format!("invalid layout of {} bytes: {}", size, e)))?;
    // Safety: the layout has non-zero size
    let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
    match NonNull::new(ptr) {
        Some(ptr) => {
            ALLOCATIONS.fetch_add(size as isize, Ordering::SeqCst);
            Ok(ptr)
        }
        None => Err(Error::OutOfMemory(format!(
            "an allocation of {} bytes failed",
            size
        ))),
    }
}

/// Frees a region previously returned by [`allocate_aligned_zeroed`].
/// # Safety
/// `ptr` must denote a region of exactly `size` bytes allocated by this
/// module and not freed before.
pub unsafe fn free_aligned(ptr: NonNull<u8>, size: usize) {
    if size != 0 {
        ALLOCATIONS.fetch_sub(size as isize, Ordering::SeqCst);
        std::alloc::dealloc(
            ptr.as_ptr(),
            Layout::from_size_align_unchecked(size, ALIGNMENT),
        );
    }
}
