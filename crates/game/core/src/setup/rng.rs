//! Deterministic random number generation for setup-time decisions.
//!
//! Only setup consumes randomness (seeded seating order). Replay never does,
//! so a game is fully determined by its initial state and its action log.

/// Deterministic RNG keyed by an explicit seed.
///
/// Implementations must produce the same value for the same seed on every
/// platform and every run.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// PCG-XSH-RR generator: 64-bit state, 32-bit output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes a base seed with a draw index into an independent per-draw seed.
pub fn compute_seed(game_seed: u64, draw: u64) -> u64 {
    // SplitMix64-style finalizer
    let mut hash = game_seed ^ draw.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Fisher-Yates shuffle driven by [`PcgRng`].
pub fn seeded_shuffle<T>(items: &mut [T], seed: u64) {
    let rng = PcgRng;
    for i in (1..items.len()).rev() {
        let j = rng.range(compute_seed(seed, i as u64), 0, i as u32) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_output() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_ne!(rng.next_u32(42), rng.next_u32(43));
    }

    #[test]
    fn range_stays_in_bounds() {
        let rng = PcgRng;
        for seed in 0..500 {
            let value = rng.range(seed, 2, 5);
            assert!((2..=5).contains(&value));
        }
        assert_eq!(rng.range(7, 3, 3), 3);
    }

    #[test]
    fn shuffle_is_a_deterministic_permutation() {
        let mut a: Vec<u32> = (0..10).collect();
        let mut b = a.clone();
        seeded_shuffle(&mut a, 1);
        seeded_shuffle(&mut b, 1);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }
}
