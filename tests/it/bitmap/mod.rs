mod immutable;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Returns fixed seedable RNG
pub fn seedable_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

pub fn random_bytes(len: usize, rng: &mut StdRng) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

/// lengths exercising every path: empty, sub-byte, byte boundaries, word
/// boundaries, the word-loop threshold (> 127 bits) and a long range
pub const LENGTHS: [usize; 12] = [0, 1, 7, 8, 9, 63, 64, 65, 127, 128, 129, 1000];
