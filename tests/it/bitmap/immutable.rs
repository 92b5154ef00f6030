use bitpacked::bitmap::Bitmap;
use bitpacked::pool::MemoryPool;

fn create_bitmap<P: AsRef<[u8]>>(bytes: P, len: usize) -> Bitmap {
    Bitmap::from_u8_slice(bytes, len)
}

#[test]
fn eq() {
    let lhs = create_bitmap([0b01101010], 8);
    let rhs = create_bitmap([0b01001110], 8);
    assert!(lhs != rhs);
}

#[test]
fn eq_len() {
    let lhs = create_bitmap([0b01101010], 6);
    let rhs = create_bitmap([0b00101010], 6);
    assert!(lhs == rhs);
    let rhs = create_bitmap([0b00001010], 6);
    assert!(lhs != rhs);
}

#[test]
fn eq_slice() {
    let lhs = create_bitmap([0b10101010], 8).slice(1, 7);
    let rhs = create_bitmap([0b10101011], 8).slice(1, 7);
    assert!(lhs == rhs);

    let lhs = create_bitmap([0b10101010], 8).slice(2, 6);
    let rhs = create_bitmap([0b10101110], 8).slice(2, 6);
    assert!(lhs != rhs);
}

#[test]
fn and() {
    let pool = MemoryPool::new();
    let lhs = create_bitmap([0b01101010], 8);
    let rhs = create_bitmap([0b01001110], 8);
    let expected = create_bitmap([0b01001010], 8);
    assert_eq!(lhs.and(&rhs, &pool).unwrap(), expected);
}

#[test]
fn or_large() {
    let pool = MemoryPool::new();
    let input: &[u8] = &[
        0b00000000, 0b00000001, 0b00000010, 0b00000100, 0b00001000, 0b00010000, 0b00100000,
        0b01000010, 0b11111111,
    ];
    let input1: &[u8] = &[
        0b00000000, 0b00000001, 0b10000000, 0b10000000, 0b10000000, 0b10000000, 0b10000000,
        0b10000000, 0b11111111,
    ];
    let expected: &[u8] = &[
        0b00000000, 0b00000001, 0b10000010, 0b10000100, 0b10001000, 0b10010000, 0b10100000,
        0b11000010, 0b11111111,
    ];

    let lhs = create_bitmap(input, 62);
    let rhs = create_bitmap(input1, 62);
    let expected = create_bitmap(expected, 62);
    assert_eq!(lhs.or(&rhs, &pool).unwrap(), expected);
}

#[test]
fn and_offset() {
    let pool = MemoryPool::new();
    let lhs = create_bitmap([0b01101011], 8).slice(1, 7);
    let rhs = create_bitmap([0b01001111], 8).slice(1, 7);
    let expected = create_bitmap([0b01001010], 8).slice(1, 7);
    assert_eq!(lhs.and(&rhs, &pool).unwrap(), expected);
}

#[test]
fn or() {
    let pool = MemoryPool::new();
    let lhs = create_bitmap([0b01101010], 8);
    let rhs = create_bitmap([0b01001110], 8);
    let expected = create_bitmap([0b01101110], 8);
    assert_eq!(lhs.or(&rhs, &pool).unwrap(), expected);
}

#[test]
fn xor() {
    let pool = MemoryPool::new();
    let lhs = create_bitmap([0b01101010], 8);
    let rhs = create_bitmap([0b01001110], 8);
    let expected = create_bitmap([0b00100100], 8);
    assert_eq!(lhs.xor(&rhs, &pool).unwrap(), expected);
}

#[test]
fn not() {
    let pool = MemoryPool::new();
    let lhs = create_bitmap([0b01101010], 6);
    let expected = create_bitmap([0b00010101], 6);
    assert_eq!(lhs.not(&pool).unwrap(), expected);
}

#[test]
fn not_random() {
    let pool = MemoryPool::new();
    let iter = (0..100).map(|x| x % 7 == 0);
    let iter_not = iter.clone().map(|x| !x);

    let bitmap: Bitmap = iter.collect();
    let expected: Bitmap = iter_not.collect();

    assert_eq!(bitmap.not(&pool).unwrap(), expected);
}

#[test]
fn iter_round_trip() {
    let values = (0..67).map(|x| x % 3 == 0).collect::<Vec<_>>();
    let bitmap = Bitmap::from(values.as_slice());
    assert_eq!(bitmap.len(), 67);
    assert_eq!(bitmap.iter().collect::<Vec<_>>(), values);
    assert_eq!((&bitmap).into_iter().rev().count(), 67);
}

#[test]
fn get() {
    let bitmap = create_bitmap([0b0000_1101], 6);
    assert_eq!(bitmap.get(0), Some(true));
    assert_eq!(bitmap.get(1), Some(false));
    assert_eq!(bitmap.get(5), Some(false));
    assert_eq!(bitmap.get(6), None);
}

#[test]
fn null_count_range() {
    let bitmap = create_bitmap([0b0101_1011, 0b0000_0001], 16);
    assert_eq!(bitmap.null_count(), 10);
    assert_eq!(bitmap.null_count_range(1, 4), 1);
    assert_eq!(bitmap.null_count_range(8, 8), 7);
}

#[test]
fn try_new_validates_capacity() {
    assert!(Bitmap::try_new(vec![0u8; 2], 16).is_ok());
    assert!(Bitmap::try_new(vec![0u8; 2], 17).is_err());
}

#[test]
fn empty() {
    let bitmap = Bitmap::new();
    assert!(bitmap.is_empty());
    assert_eq!(bitmap.null_count(), 0);
    assert_eq!(bitmap.iter().count(), 0);
}
