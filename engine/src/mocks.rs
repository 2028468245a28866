//! Test fixtures: canned coin sources and pre-seeded stores.

use crate::rng::{CoinSource, WagerRng};
use crate::store::Memory;
use perch_types::{AccountId, Outcome, Resources};
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Coin that always lands the same way.
pub struct FixedCoin(pub Outcome);

impl CoinSource for FixedCoin {
    fn flip(&mut self) -> Outcome {
        self.0
    }
}

/// Coin that alternates faces, starting with the given outcome.
pub struct AlternatingCoin(pub Outcome);

impl CoinSource for AlternatingCoin {
    fn flip(&mut self) -> Outcome {
        let outcome = self.0;
        self.0 = outcome.other();
        outcome
    }
}

/// Shorthand for a coin that will draw `outcome`.
pub fn drawing(outcome: Outcome) -> FixedCoin {
    FixedCoin(outcome)
}

/// A store holding a single account with the given balance and no resources.
pub fn single_account_store(coins: u64) -> (Memory, AccountId) {
    let store = Memory::default();
    let id = store.create("tester".to_string(), coins, Resources::default());
    (store, id)
}

/// A deterministic wager RNG derived from a small integer seed.
pub fn seeded_rng(seed: u64) -> WagerRng {
    let mut bytes = [0u8; 32];
    StdRng::seed_from_u64(seed).fill_bytes(&mut bytes);
    WagerRng::new(bytes, 0)
}
