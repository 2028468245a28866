//! Randomness for wager resolution.
//!
//! Fairness here is a correctness property, not a security one: the draw must
//! be statistically uniform over the two outcomes and reproducible under a
//! fixed seed so it can be tested and audited.

use commonware_cryptography::{sha256::Sha256, Hasher};
use perch_types::Outcome;
use rand::RngCore;

/// Source of coin-flip outcomes.
///
/// The engine draws through this trait so settlement logic can be tested
/// against fixed outcomes.
pub trait CoinSource {
    fn flip(&mut self) -> Outcome;
}

/// SHA-256 hash-chain generator.
///
/// Seeded explicitly it is fully deterministic; [WagerRng::from_entropy] is
/// the production construction.
#[derive(Clone)]
pub struct WagerRng {
    state: [u8; 32],
    index: usize,
}

impl WagerRng {
    /// Create a deterministic generator from a seed and a stream number.
    /// Different streams over the same seed produce independent sequences.
    pub fn new(seed: [u8; 32], stream: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&seed);
        hasher.update(&stream.to_be_bytes());
        Self {
            state: hasher.finalize().0,
            index: 0,
        }
    }

    /// Create a generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        Self::new(seed, 0)
    }

    /// Get the next random byte.
    fn next_byte(&mut self) -> u8 {
        if self.index >= 32 {
            // Rehash to get more bytes
            let mut hasher = Sha256::new();
            hasher.update(&self.state);
            self.state = hasher.finalize().0;
            self.index = 0;
        }
        let result = self.state[self.index];
        self.index += 1;
        result
    }

    /// Get a random value in range [0, max), unbiased via rejection sampling.
    pub fn next_bounded(&mut self, max: u8) -> u8 {
        if max == 0 {
            return 0;
        }
        let limit = u8::MAX - (u8::MAX % max);
        loop {
            let value = self.next_byte();
            if value < limit {
                return value % max;
            }
        }
    }
}

impl CoinSource for WagerRng {
    fn flip(&mut self) -> Outcome {
        match self.next_bounded(2) {
            0 => Outcome::Heads,
            _ => Outcome::Tails,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; 32] = [7u8; 32];

    #[test]
    fn test_rng_deterministic() {
        let mut a = WagerRng::new(SEED, 1);
        let mut b = WagerRng::new(SEED, 1);
        for _ in 0..100 {
            assert_eq!(a.flip(), b.flip());
        }
    }

    #[test]
    fn test_rng_streams_diverge() {
        let mut a = WagerRng::new(SEED, 1);
        let mut b = WagerRng::new(SEED, 2);
        let seq_a: Vec<Outcome> = (0..32).map(|_| a.flip()).collect();
        let seq_b: Vec<Outcome> = (0..32).map(|_| b.flip()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn test_rng_bounded() {
        let mut rng = WagerRng::new(SEED, 1);
        for _ in 0..1000 {
            assert!(rng.next_bounded(6) < 6);
        }
        assert_eq!(rng.next_bounded(0), 0);
        assert_eq!(rng.next_bounded(1), 0);
    }

    #[test]
    fn test_flip_roughly_uniform() {
        // Deterministic under the fixed seed, so the band assertion is stable.
        let mut rng = WagerRng::new(SEED, 1);
        let heads = (0..10_000)
            .filter(|_| rng.flip() == Outcome::Heads)
            .count();
        assert!((4_500..=5_500).contains(&heads), "heads = {}", heads);
    }

    #[test]
    fn test_flip_produces_both_outcomes() {
        let mut rng = WagerRng::new(SEED, 3);
        let outcomes: Vec<Outcome> = (0..64).map(|_| rng.flip()).collect();
        assert!(outcomes.contains(&Outcome::Heads));
        assert!(outcomes.contains(&Outcome::Tails));
    }
}
