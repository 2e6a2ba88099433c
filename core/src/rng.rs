//! Uniform integer sources for maze generation
//!
//! The generator only ever asks for "an integer in `[0, bound)`", so any
//! source implementing [`RandomSource`] can drive it. [`SimpleLCG`] is the
//! default: a Park-Miller MINSTD generator, so the same seed always yields
//! the same maze and therefore the same bitmap.
//!
//! Constants:
//! - Multiplier (a): 48271
//! - Modulus (m): 2^31 - 1 = 2147483647
//!
//! Reference: https://en.wikipedia.org/wiki/Lehmer_random_number_generator

/// Source of uniformly distributed integers
pub trait RandomSource {
    /// Return an integer in `[0, bound)`. `bound` is always at least 1.
    fn below(&mut self, bound: usize) -> usize;
}

/// Fisher-Yates shuffle, walking from the last slot down to slot 1.
///
/// For a 4-element slice this draws `below(4)`, `below(3)`, `below(2)`.
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

const MODULUS: u64 = 2147483647; // 2^31 - 1
const MULTIPLIER: u64 = 48271;

/// Park-Miller Linear Congruential Generator
///
/// Generates a deterministic sequence of pseudo-random numbers from a seed.
/// Same seed always produces the same sequence.
#[derive(Clone, Debug)]
pub struct SimpleLCG {
    state: u32,
}

impl SimpleLCG {
    /// Create a new LCG with the given seed
    ///
    /// Seeds are reduced modulo 2^31 - 1; a seed that reduces to 0 is
    /// replaced with 1 to avoid the degenerate all-zero sequence.
    pub fn new(seed: u32) -> Self {
        let state = (seed as u64 % MODULUS) as u32;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Advance RNG state and return it
    fn advance(&mut self) -> u32 {
        // u64 keeps the multiplication from overflowing
        self.state = ((self.state as u64 * MULTIPLIER) % MODULUS) as u32;
        self.state
    }
}

impl RandomSource for SimpleLCG {
    /// Scales the state into `[0, bound)` with integer arithmetic only.
    fn below(&mut self, bound: usize) -> usize {
        let state = self.advance() as u64;
        ((state * bound as u64) / MODULUS) as usize
    }
}
