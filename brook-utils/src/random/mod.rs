//! Seedable random sources.
//!
//! The simulation only ever needs a handful of draws per update (shuffling
//! spread candidates), so the trait stays small and object safe.

pub mod xoroshiro;

pub use xoroshiro::Xoroshiro;

/// A source of pseudo random numbers.
pub trait Random {
    /// Returns a random i32.
    fn next_i32(&mut self) -> i32;

    /// Returns a random i32 in `[0, bound)`. `bound` must be positive.
    fn next_i32_bounded(&mut self, bound: i32) -> i32;

    /// Returns a random f32 in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Returns a random bool.
    fn next_bool(&mut self) -> bool;
}

/// Shuffles `items` in place (Fisher-Yates, back to front).
pub fn shuffle<T>(items: &mut [T], random: &mut dyn Random) {
    for i in (1..items.len()).rev() {
        let j = random.next_i32_bounded(i as i32 + 1) as usize;
        items.swap(i, j);
    }
}

/// A fresh seed from the thread local entropy source.
#[must_use]
pub fn entropy_seed() -> u64 {
    rand::random::<u64>()
}
