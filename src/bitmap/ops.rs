//! Offset-aware kernels over bit ranges: population count, transfer
//! (copy/invert), equality and the pairwise logical operations.
//!
//! A bit range is a `(data, offset, length)` triple measured in bits, where
//! `data` must hold at least `bytes_for(offset + length)` bytes. All kernels
//! are exact under arbitrary, independent bit offsets; ranges whose interior
//! allows it are processed as 64-bit words.
use multiversion::multiversion;

use crate::error::Result;
use crate::pool::{allocate_empty_bitmap, MemoryPool};

use super::utils::{
    bytes_for, get_bit, is_set, load_word, merge_words, set_bit, store_word, word_align,
    BitmapReader, BitmapWriter,
};
use super::Bitmap;

/// Counts the set bits in the `length` bits of `data` starting at
/// `bit_offset`.
///
/// Equivalent to checking every bit with [`get_bit`], but the 8-byte-aligned
/// interior of the range is processed as 64-bit words.
pub fn count_set_bits(data: &[u8], bit_offset: usize, length: usize) -> usize {
    debug_assert!(bit_offset + length <= data.len() * 8);

    let p = word_align(data, bit_offset, length);

    let mut count = (bit_offset..bit_offset + p.leading_bits)
        .filter(|i| get_bit(data, *i))
        .count();
    count += popcount_words(p.aligned);
    count += (p.trailing_bit_offset..bit_offset + length)
        .filter(|i| get_bit(data, *i))
        .count();
    count
}

#[multiversion]
#[clone(target = "x86_64+avx")]
fn popcount_words(aligned: &[u8]) -> usize {
    aligned
        .chunks_exact(8)
        .map(|chunk| load_word(chunk).count_ones() as usize)
        .sum()
}

/// Moves `length` bits of `data` starting at `offset` to `dest` starting at
/// `dest_offset`, optionally complementing every bit.
///
/// With `preserve_trailing`, bits of `dest` that share a byte with the target
/// range but lie outside it are left bit-exact; without it, the bits of the
/// last written byte beyond the range are unspecified (allocating callers
/// re-zero them).
fn transfer(
    data: &[u8],
    offset: usize,
    length: usize,
    dest: &mut [u8],
    dest_offset: usize,
    invert: bool,
    preserve_trailing: bool,
) {
    debug_assert!(offset + length <= data.len() * 8);
    debug_assert!(dest_offset + length <= dest.len() * 8);
    if length == 0 {
        return;
    }

    let byte_offset = offset / 8;
    let bit_offset = offset % 8;
    let dest_bit_offset = dest_offset % 8;
    let num_bytes = bytes_for(length);

    let dest = &mut dest[dest_offset / 8..];

    if bit_offset != 0 || dest_bit_offset != 0 {
        // process as many full words as possible, then a bit-level tail of
        // 64 to 127 bits. Keeping one word of slack ensures that the loads
        // below never read past the end of either buffer.
        let data = &data[byte_offset..];
        let mut length = length;
        let mut di = 0;
        let mut oi = 0;

        let n_words = length / 64;
        if n_words > 1 {
            let dest_mask = (1u64 << dest_bit_offset) - 1;
            let mut data_current = load_word(data);
            let mut dest_current = load_word(dest);

            for _ in 0..n_words - 1 {
                di += 8;
                let data_next = load_word(&data[di..]);
                let mut word = merge_words(data_current, data_next, bit_offset);
                data_current = data_next;
                if invert {
                    word = !word;
                }

                if dest_bit_offset != 0 {
                    // split the word across two destination words; the low
                    // `dest_bit_offset` bits of the first and the high bits of
                    // the second keep the destination's values
                    let word = word.rotate_left(dest_bit_offset as u32);
                    let mut dest_next = load_word(&dest[oi + 8..]);
                    dest_current = (dest_current & dest_mask) | (word & !dest_mask);
                    dest_next = (dest_next & !dest_mask) | (word & dest_mask);
                    store_word(&mut dest[oi..], dest_current);
                    store_word(&mut dest[oi + 8..], dest_next);
                    dest_current = dest_next;
                } else {
                    store_word(&mut dest[oi..], word);
                }
                oi += 8;
            }
            length -= (n_words - 1) * 64;
        }

        let mut reader = BitmapReader::new(&data[di..], bit_offset, length);
        let mut writer = BitmapWriter::new(&mut dest[oi..], dest_bit_offset, length);
        for _ in 0..length {
            if invert ^ reader.is_set() {
                writer.set();
            } else {
                writer.clear();
            }
            reader.next();
            writer.next();
        }
        writer.finish();
    } else {
        // both offsets are byte-aligned: whole bytes, then up to 7 bits in
        // the last byte according to the trailing policy
        let data = &data[byte_offset..byte_offset + num_bytes];
        let trailing_bits = num_bytes * 8 - length;
        let trail = if trailing_bits != 0 && preserve_trailing {
            dest[num_bytes - 1]
        } else {
            0
        };

        if invert {
            dest[..num_bytes]
                .iter_mut()
                .zip(data)
                .for_each(|(out, byte)| *out = !*byte);
        } else {
            dest[..num_bytes].copy_from_slice(data);
        }

        if preserve_trailing {
            for i in 0..trailing_bits {
                set_bit(dest, length + i, is_set(trail, i + 8 - trailing_bits));
            }
        }
    }
}

fn transfer_alloc(
    pool: &MemoryPool,
    data: &[u8],
    offset: usize,
    length: usize,
    invert: bool,
) -> Result<Bitmap> {
    let mut buffer = allocate_empty_bitmap(length, pool)?;
    transfer(data, offset, length, buffer.as_mut(), 0, invert, false);

    // the kernel may have copied source bits past `length` into the last
    // byte; unset them so that the whole allocation reads as the range
    // followed by zeros
    let bytes = buffer.as_mut();
    for i in length..bytes_for(length) * 8 {
        set_bit(bytes, i, false);
    }
    Ok(Bitmap::from_bytes(buffer, length))
}

/// Copies `length` bits of `data` starting at `offset` into `dest` starting
/// at `dest_offset`.
///
/// With `preserve_trailing`, bits of `dest` outside
/// `[dest_offset, dest_offset + length)` are left bit-exact; without it, the
/// bits of the last written byte beyond the range are unspecified.
pub fn copy_bitmap(
    data: &[u8],
    offset: usize,
    length: usize,
    dest: &mut [u8],
    dest_offset: usize,
    preserve_trailing: bool,
) {
    transfer(data, offset, length, dest, dest_offset, false, preserve_trailing)
}

/// Copies the complement of `length` bits of `data` starting at `offset`
/// into `dest` starting at `dest_offset`. Bits of `dest` outside the target
/// range are preserved.
pub fn invert_bitmap(data: &[u8], offset: usize, length: usize, dest: &mut [u8], dest_offset: usize) {
    transfer(data, offset, length, dest, dest_offset, true, true)
}

/// Returns a new [`Bitmap`] holding the `length` bits of `data` starting at
/// `offset`. Bits of the returned allocation beyond `length` read as unset.
pub fn copy_bitmap_alloc(
    pool: &MemoryPool,
    data: &[u8],
    offset: usize,
    length: usize,
) -> Result<Bitmap> {
    transfer_alloc(pool, data, offset, length, false)
}

/// Returns a new [`Bitmap`] holding the complement of the `length` bits of
/// `data` starting at `offset`. Bits of the returned allocation beyond
/// `length` read as unset.
pub fn invert_bitmap_alloc(
    pool: &MemoryPool,
    data: &[u8],
    offset: usize,
    length: usize,
) -> Result<Bitmap> {
    transfer_alloc(pool, data, offset, length, true)
}

/// Returns whether the `length` bits of `left` starting at `left_offset`
/// equal the `length` bits of `right` starting at `right_offset`.
///
/// Reads nothing beyond either range and allocates nothing; ranges of length
/// zero compare equal.
pub fn bitmap_equals(
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    length: usize,
) -> bool {
    debug_assert!(left_offset + length <= left.len() * 8);
    debug_assert!(right_offset + length <= right.len() * 8);

    if left_offset % 8 == 0 && right_offset % 8 == 0 {
        // byte aligned: compare whole bytes, then up to 7 bits
        let num_bytes = length / 8;
        if left[left_offset / 8..][..num_bytes] != right[right_offset / 8..][..num_bytes] {
            return false;
        }
        for i in num_bytes * 8..length {
            if get_bit(left, left_offset + i) != get_bit(right, right_offset + i) {
                return false;
            }
        }
        return true;
    }

    let left = &left[left_offset / 8..];
    let right = &right[right_offset / 8..];
    let left_offset = left_offset % 8;
    let right_offset = right_offset % 8;

    let mut length = length;
    let mut li = 0;
    let mut ri = 0;

    // normalize both sides to streams of 64-bit words and short-circuit on
    // the first mismatch
    let n_words = length / 64;
    if n_words > 1 {
        let mut left_current = load_word(left);
        let mut right_current = load_word(right);

        for _ in 0..n_words - 1 {
            li += 8;
            let left_next = load_word(&left[li..]);
            let left_word = merge_words(left_current, left_next, left_offset);
            left_current = left_next;

            ri += 8;
            let right_next = load_word(&right[ri..]);
            let right_word = merge_words(right_current, right_next, right_offset);
            right_current = right_next;

            if left_word != right_word {
                return false;
            }
        }
        length -= (n_words - 1) * 64;
    }

    (0..length).all(|i| {
        get_bit(&left[li..], left_offset + i) == get_bit(&right[ri..], right_offset + i)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BitOp {
    And,
    Or,
    Xor,
}

impl BitOp {
    #[inline]
    fn word(self, left: u64, right: u64) -> u64 {
        match self {
            BitOp::And => left & right,
            BitOp::Or => left | right,
            BitOp::Xor => left ^ right,
        }
    }

    #[inline]
    fn byte(self, left: u8, right: u8) -> u8 {
        match self {
            BitOp::And => left & right,
            BitOp::Or => left | right,
            BitOp::Xor => left ^ right,
        }
    }

    #[inline]
    fn boolean(self, left: bool, right: bool) -> bool {
        match self {
            BitOp::And => left && right,
            BitOp::Or => left || right,
            BitOp::Xor => left ^ right,
        }
    }
}

// All three intra-byte offsets coincide, so every byte of the output range
// maps to one byte of each input: operate byte-wise over all bytes touching
// the range. Out-of-range bits of shared fringe bytes are recomputed from the
// inputs' fringe bits rather than preserved.
#[multiversion]
#[clone(target = "x86_64+avx")]
fn aligned_bitmap_op(
    op: BitOp,
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    out: &mut [u8],
    out_offset: usize,
    length: usize,
) {
    debug_assert_eq!(left_offset % 8, right_offset % 8);
    debug_assert_eq!(left_offset % 8, out_offset % 8);

    let num_bytes = bytes_for(length + left_offset % 8);
    let left = &left[left_offset / 8..][..num_bytes];
    let right = &right[right_offset / 8..][..num_bytes];
    let out = &mut out[out_offset / 8..][..num_bytes];

    out.iter_mut()
        .zip(left.iter().zip(right))
        .for_each(|(out, (left, right))| *out = op.byte(*left, *right));
}

fn unaligned_bitmap_op(
    op: BitOp,
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    out: &mut [u8],
    out_offset: usize,
    length: usize,
) {
    let left = &left[left_offset / 8..];
    let right = &right[right_offset / 8..];
    let out = &mut out[out_offset / 8..];
    let left_offset = left_offset % 8;
    let right_offset = right_offset % 8;
    let out_offset = out_offset % 8;

    let mut length = length;
    let mut li = 0;
    let mut ri = 0;
    let mut oi = 0;

    // the word loop is sized by the least advanced of the three cursors so
    // that no side ever loads past its buffer
    let min_offset = left_offset.min(right_offset).min(out_offset);
    let n_words = (length + min_offset) / 64;

    if n_words > 1 {
        let out_mask = (1u64 << out_offset) - 1;
        length -= (n_words - 1) * 64;

        let mut left_current = load_word(left);
        let mut right_current = load_word(right);
        let mut out_current = load_word(out);

        for _ in 0..n_words - 1 {
            li += 8;
            let left_next = load_word(&left[li..]);
            let left_word = merge_words(left_current, left_next, left_offset);
            left_current = left_next;

            ri += 8;
            let right_next = load_word(&right[ri..]);
            let right_word = merge_words(right_current, right_next, right_offset);
            right_current = right_next;

            let out_word = op.word(left_word, right_word);
            if out_offset != 0 {
                // split the word across two output words, keeping the low
                // `out_offset` bits of the first and the high bits of the
                // second from the output's existing values
                let out_word = out_word.rotate_left(out_offset as u32);
                let mut out_next = load_word(&out[oi + 8..]);
                out_current = (out_current & out_mask) | (out_word & !out_mask);
                out_next = (out_next & !out_mask) | (out_word & out_mask);
                store_word(&mut out[oi..], out_current);
                store_word(&mut out[oi + 8..], out_next);
                out_current = out_next;
            } else {
                store_word(&mut out[oi..], out_word);
            }
            oi += 8;
        }
    }

    if length > 0 {
        let mut left_reader = BitmapReader::new(&left[li..], left_offset, length);
        let mut right_reader = BitmapReader::new(&right[ri..], right_offset, length);
        let mut writer = BitmapWriter::new(&mut out[oi..], out_offset, length);
        for _ in 0..length {
            if op.boolean(left_reader.is_set(), right_reader.is_set()) {
                writer.set();
            } else {
                writer.clear();
            }
            left_reader.next();
            right_reader.next();
            writer.next();
        }
        writer.finish();
    }
}

fn bitmap_op(
    op: BitOp,
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    length: usize,
    out_offset: usize,
    out: &mut [u8],
) {
    debug_assert!(left_offset + length <= left.len() * 8);
    debug_assert!(right_offset + length <= right.len() * 8);
    debug_assert!(out_offset + length <= out.len() * 8);
    if length == 0 {
        return;
    }

    if out_offset % 8 == left_offset % 8 && out_offset % 8 == right_offset % 8 {
        aligned_bitmap_op(op, left, left_offset, right, right_offset, out, out_offset, length)
    } else {
        unaligned_bitmap_op(op, left, left_offset, right, right_offset, out, out_offset, length)
    }
}

fn bitmap_op_alloc(
    op: BitOp,
    pool: &MemoryPool,
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    length: usize,
    out_offset: usize,
) -> Result<Bitmap> {
    let num_bits = length + out_offset;
    let mut buffer = allocate_empty_bitmap(num_bits, pool)?;
    bitmap_op(
        op,
        left,
        left_offset,
        right,
        right_offset,
        length,
        out_offset,
        buffer.as_mut(),
    );

    // the aligned fast path recomputes whole fringe bytes from the inputs'
    // out-of-range bits; unset everything outside the target range so the
    // allocation reads as the result surrounded by zeros
    let bytes = buffer.as_mut();
    for i in (0..out_offset).chain(num_bits..bytes_for(num_bits) * 8) {
        set_bit(bytes, i, false);
    }
    Ok(Bitmap::from_bytes(buffer, num_bits))
}

/// Writes the bitwise AND of two bit ranges of `length` bits into `out`
/// starting at `out_offset`.
///
/// Bits of `out` outside the target range are preserved, except that when all
/// three offsets share the same intra-byte position the out-of-range bits of
/// shared fringe bytes are recomputed from the inputs instead.
pub fn bitmap_and(
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    length: usize,
    out_offset: usize,
    out: &mut [u8],
) {
    bitmap_op(BitOp::And, left, left_offset, right, right_offset, length, out_offset, out)
}

/// Writes the bitwise OR of two bit ranges of `length` bits into `out`
/// starting at `out_offset`. Same fringe-byte contract as [`bitmap_and`].
pub fn bitmap_or(
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    length: usize,
    out_offset: usize,
    out: &mut [u8],
) {
    bitmap_op(BitOp::Or, left, left_offset, right, right_offset, length, out_offset, out)
}

/// Writes the bitwise XOR of two bit ranges of `length` bits into `out`
/// starting at `out_offset`. Same fringe-byte contract as [`bitmap_and`].
pub fn bitmap_xor(
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    length: usize,
    out_offset: usize,
    out: &mut [u8],
) {
    bitmap_op(BitOp::Xor, left, left_offset, right, right_offset, length, out_offset, out)
}

/// Returns a new [`Bitmap`] of `length + out_offset` bits whose bits starting
/// at `out_offset` hold the bitwise AND of the two input ranges; all other
/// bits of the allocation read as unset.
pub fn bitmap_and_alloc(
    pool: &MemoryPool,
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    length: usize,
    out_offset: usize,
) -> Result<Bitmap> {
    bitmap_op_alloc(BitOp::And, pool, left, left_offset, right, right_offset, length, out_offset)
}

/// Returns a new [`Bitmap`] of `length + out_offset` bits whose bits starting
/// at `out_offset` hold the bitwise OR of the two input ranges; all other
/// bits of the allocation read as unset.
pub fn bitmap_or_alloc(
    pool: &MemoryPool,
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    length: usize,
    out_offset: usize,
) -> Result<Bitmap> {
    bitmap_op_alloc(BitOp::Or, pool, left, left_offset, right, right_offset, length, out_offset)
}

/// Returns a new [`Bitmap`] of `length + out_offset` bits whose bits starting
/// at `out_offset` hold the bitwise XOR of the two input ranges; all other
/// bits of the allocation read as unset.
pub fn bitmap_xor_alloc(
    pool: &MemoryPool,
    left: &[u8],
    left_offset: usize,
    right: &[u8],
    right_offset: usize,
    length: usize,
    out_offset: usize,
) -> Result<Bitmap> {
    bitmap_op_alloc(BitOp::Xor, pool, left, left_offset, right, right_offset, length, out_offset)
}
