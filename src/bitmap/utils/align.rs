/// The partition of a bit range around its 8-byte-aligned interior, computed
/// by [`word_align`].
#[derive(Debug, PartialEq, Eq)]
pub struct AlignedBitmap<'a> {
    /// Number of bits between the range's start and `aligned`; at most the
    /// range's length.
    pub leading_bits: usize,
    /// The interior of the range: `aligned_words * 8` bytes whose address is
    /// a multiple of 8 and whose bits are all inside the range.
    pub aligned: &'a [u8],
    /// Number of 64-bit words in `aligned`.
    pub aligned_words: usize,
    /// Absolute bit index (relative to bit 0 of `data`) at which word
    /// processing ends and scalar processing of the trailing bits begins.
    pub trailing_bit_offset: usize,
    /// Number of bits after the interior.
    pub trailing_bits: usize,
}

/// Splits the bit range `(data, bit_offset, length)` into leading scalar
/// bits, an interior of 8-byte-aligned 64-bit words and trailing scalar bits.
///
/// The three regions partition the range exactly. This is address arithmetic
/// only: no byte of `data` is read.
pub fn word_align(data: &[u8], bit_offset: usize, length: usize) -> AlignedBitmap<'_> {
    debug_assert!(bit_offset + length <= data.len() * 8);

    let bit_address = data.as_ptr() as usize * 8 + bit_offset;
    // bits until the next address that is a multiple of 8 bytes
    let aligned_bit_address = (bit_address + 63) & !63;

    let leading_bits = length.min(aligned_bit_address - bit_address);
    let aligned_words = (length - leading_bits) / 64;
    let aligned_bits = aligned_words * 64;
    let trailing_bits = length - leading_bits - aligned_bits;
    let trailing_bit_offset = bit_offset + leading_bits + aligned_bits;

    let aligned_start = (bit_offset + leading_bits) / 8;
    AlignedBitmap {
        leading_bits,
        aligned: &data[aligned_start..aligned_start + aligned_words * 8],
        aligned_words,
        trailing_bit_offset,
        trailing_bits,
    }
}
