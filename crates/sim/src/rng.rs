//! Injected randomness.
//!
//! The random policy is the only nondeterministic part of a rollout. It draws
//! from a [`RandomSource`] owned by the caller; [`fastrand::Rng`] implements
//! it, so `fastrand::Rng::with_seed(n)` gives a reproducible run.

pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize;

    /// Uniform sample in `[low, high)`.
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_unit()
    }
}

impl RandomSource for fastrand::Rng {
    fn next_unit(&mut self) -> f32 {
        self.f32()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.usize(..len)
    }
}

/// Derive a per-episode seed from a run seed.
///
/// A fixed splitmix64 mix of `(root, index)`, so batch episode `i` replays the
/// same draws regardless of how many episodes run or which toolchain built
/// the binary.
#[must_use]
pub fn derive_seed(root: u64, index: u64) -> u64 {
    splitmix64(splitmix64(root) ^ index)
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
