//! Bitmaps and the kernels that operate on them.
mod immutable;
pub mod ops;
pub mod utils;

pub use immutable::Bitmap;
pub use ops::{
    bitmap_and, bitmap_and_alloc, bitmap_equals, bitmap_or, bitmap_or_alloc, bitmap_xor,
    bitmap_xor_alloc, copy_bitmap, copy_bitmap_alloc, count_set_bits, invert_bitmap,
    invert_bitmap_alloc,
};
