//! Xoroshiro128++ generator.

use crate::random::{Random, entropy_seed};

/// Xoroshiro128++ state.
pub struct Xoroshiro {
    seed_lo: u64,
    seed_hi: u64,
}

// Ratios used in the mix functions
const GOLDEN_RATIO_64: u64 = 0x9E3779B97F4A7C15;
const SILVER_RATIO_64: u64 = 0x6A09E667F3BCC909;

impl Xoroshiro {
    /// Seeds the generator from a 64 bit seed, mixing it up to 128 bits.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let (lo, hi) = Self::upgrade_seed_to_128_bit(seed);
        let lo = mix_stafford_13(lo);
        let hi = mix_stafford_13(hi);
        Self::new(lo, hi)
    }

    /// Seeds from the process entropy source. Runs seeded this way are not reproducible.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_seed(entropy_seed())
    }

    fn new(lo: u64, hi: u64) -> Self {
        let (lo, hi) = if (lo | hi) == 0 {
            (GOLDEN_RATIO_64, SILVER_RATIO_64)
        } else {
            (lo, hi)
        };
        Self {
            seed_lo: lo,
            seed_hi: hi,
        }
    }

    fn upgrade_seed_to_128_bit(seed: u64) -> (u64, u64) {
        let lo = seed ^ SILVER_RATIO_64;
        let hi = lo.wrapping_add(GOLDEN_RATIO_64);
        (lo, hi)
    }

    fn next(&mut self, bits: u64) -> u64 {
        self.next_random() >> (64 - bits)
    }

    fn next_random(&mut self) -> u64 {
        let l = self.seed_lo;
        let m = self.seed_hi;
        let n = l.wrapping_add(m).rotate_left(17).wrapping_add(l);
        let m = m ^ l;
        self.seed_lo = l.rotate_left(49) ^ m ^ (m << 21);
        self.seed_hi = m.rotate_left(28);
        n
    }
}

fn mix_stafford_13(z: u64) -> u64 {
    let z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    let z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

impl Random for Xoroshiro {
    fn next_i32(&mut self) -> i32 {
        self.next_random() as i32
    }

    // Lemire's multiply-shift with rejection, so every value in range is equally likely.
    fn next_i32_bounded(&mut self, bound: i32) -> i32 {
        let bound = bound as u64;
        let mut m = (self.next_i32() as u64 & 0xFFFFFFFF).wrapping_mul(bound);
        let mut n = m & 0xFFFFFFFF;
        if n < bound {
            let threshold = (0x1_0000_0000 - bound) % bound;
            while n < threshold {
                m = (self.next_i32() as u64 & 0xFFFFFFFF).wrapping_mul(bound);
                n = m & 0xFFFFFFFF;
            }
        }
        (m >> 32) as i32
    }

    fn next_f32(&mut self) -> f32 {
        self.next(24) as f32 * 5.9604645e-8
    }

    fn next_bool(&mut self) -> bool {
        (self.next_random() & 1) != 0
    }
}
