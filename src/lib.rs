//! `bitpacked` contains bit-packed bitmap primitives for columnar in-memory
//! analytics: offset-aware kernels to count, copy, invert, compare and combine
//! ranges of bits backed by byte buffers, together with the containers and the
//! allocator they operate on.
//!
//! The entry points are the kernels in [`bitmap::ops`] and the shared
//! container [`bitmap::Bitmap`].
mod alloc;
pub mod bitmap;
pub mod buffer;
pub mod error;
pub mod pool;

pub use alloc::total_allocated_bytes;
