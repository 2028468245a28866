//! Coin-flip wager resolution.
//!
//! A wager is settled in one pass: validate, draw, then commit exactly one
//! atomic balance mutation. A rejected wager never touches the balance, and
//! two wagers racing on the same account can never both spend the same coins.

use crate::config::WagerConfig;
use crate::rng::CoinSource;
use crate::store::{adjust_balance, AccountStore, StoreError};
use perch_types::{WagerRequest, WagerResult};
use thiserror::Error;
use tracing::debug;

/// Why a wager was not resolved. Each kind is surfaced distinctly to the
/// caller; none of them are retried here beyond the internal
/// compare-and-swap budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WagerError {
    #[error("stake must be a positive amount of coins")]
    InvalidStake,
    #[error("account not found")]
    AccountNotFound,
    #[error("insufficient coins: have {balance}, staked {stake}")]
    InsufficientFunds { balance: u64, stake: u64 },
    /// The balance kept changing under concurrent settlement and the retry
    /// budget ran out.
    #[error("concurrent update conflict")]
    ConcurrentConflict,
}

/// Resolves wagers against an account store.
pub struct WagerEngine<'a, S: AccountStore> {
    config: &'a WagerConfig,
    store: &'a S,
}

impl<'a, S: AccountStore> WagerEngine<'a, S> {
    pub fn new(config: &'a WagerConfig, store: &'a S) -> Self {
        Self { config, store }
    }

    /// Resolve a single wager.
    ///
    /// Validation order (first failure wins): stake, account existence,
    /// funds. The drawn outcome is compared to the prediction by equality; a
    /// win credits the stake, a loss debits it, committed as one guarded
    /// atomic adjustment.
    pub fn resolve(
        &self,
        request: &WagerRequest,
        coin: &mut impl CoinSource,
    ) -> Result<WagerResult, WagerError> {
        // Stake must be positive and representable as a settlement delta.
        if request.stake == 0 || request.stake > i64::MAX as u64 {
            return Err(WagerError::InvalidStake);
        }

        let snapshot = self
            .store
            .load(request.account)
            .ok_or(WagerError::AccountNotFound)?;
        if snapshot.account.coins < request.stake {
            return Err(WagerError::InsufficientFunds {
                balance: snapshot.account.coins,
                stake: request.stake,
            });
        }

        let outcome = coin.flip();
        let won = outcome == request.predicted;
        let delta = if won {
            request.stake as i64
        } else {
            -(request.stake as i64)
        };

        // The guard re-checks `balance >= stake` inside the same atomic step
        // as the debit, so a concurrent spend cannot push the balance
        // negative between our read and this write.
        let balance_after =
            adjust_balance(self.store, request.account, delta, 0, self.config.adjust_attempts)
                .map_err(|err| match err {
                    StoreError::NotFound => WagerError::AccountNotFound,
                    StoreError::Rejected { balance, .. } => WagerError::InsufficientFunds {
                        balance,
                        stake: request.stake,
                    },
                    StoreError::Conflict => WagerError::ConcurrentConflict,
                })?;

        debug!(
            account = %request.account,
            stake = request.stake,
            ?outcome,
            won,
            balance_after,
            "wager settled"
        );
        Ok(WagerResult {
            won,
            outcome,
            balance_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{drawing, single_account_store, AlternatingCoin};
    use perch_types::{AccountId, Outcome};

    fn request(account: AccountId, predicted: Outcome, stake: u64) -> WagerRequest {
        WagerRequest {
            account,
            predicted,
            stake,
        }
    }

    #[test]
    fn test_win_credits_stake() {
        let config = WagerConfig::default();
        let (store, id) = single_account_store(100);
        let engine = WagerEngine::new(&config, &store);

        let result = engine
            .resolve(
                &request(id, Outcome::Heads, 40),
                &mut drawing(Outcome::Heads),
            )
            .unwrap();

        assert!(result.won);
        assert_eq!(result.outcome, Outcome::Heads);
        assert_eq!(result.balance_after, 140);
        assert_eq!(store.load(id).unwrap().account.coins, 140);
    }

    #[test]
    fn test_loss_debits_stake_to_zero() {
        let config = WagerConfig::default();
        let (store, id) = single_account_store(50);
        let engine = WagerEngine::new(&config, &store);

        let result = engine
            .resolve(
                &request(id, Outcome::Heads, 50),
                &mut drawing(Outcome::Tails),
            )
            .unwrap();

        assert!(!result.won);
        assert_eq!(result.outcome, Outcome::Tails);
        assert_eq!(result.balance_after, 0);
        assert_eq!(store.load(id).unwrap().account.coins, 0);
    }

    #[test]
    fn test_stake_over_balance_rejected() {
        let config = WagerConfig::default();
        let (store, id) = single_account_store(100);
        let engine = WagerEngine::new(&config, &store);

        let err = engine
            .resolve(
                &request(id, Outcome::Heads, 150),
                &mut drawing(Outcome::Heads),
            )
            .unwrap_err();

        assert_eq!(
            err,
            WagerError::InsufficientFunds {
                balance: 100,
                stake: 150
            }
        );
        // Balance untouched by the rejected wager.
        assert_eq!(store.load(id).unwrap().account.coins, 100);
    }

    #[test]
    fn test_zero_stake_checked_before_existence() {
        let config = WagerConfig::default();
        let (store, _) = single_account_store(100);
        let engine = WagerEngine::new(&config, &store);

        // Nonexistent account, but the stake check comes first.
        let err = engine
            .resolve(
                &request(AccountId(999), Outcome::Heads, 0),
                &mut drawing(Outcome::Heads),
            )
            .unwrap_err();
        assert_eq!(err, WagerError::InvalidStake);
    }

    #[test]
    fn test_unknown_account_rejected() {
        let config = WagerConfig::default();
        let (store, _) = single_account_store(100);
        let engine = WagerEngine::new(&config, &store);

        let err = engine
            .resolve(
                &request(AccountId(999), Outcome::Heads, 10),
                &mut drawing(Outcome::Heads),
            )
            .unwrap_err();
        assert_eq!(err, WagerError::AccountNotFound);
    }

    #[test]
    fn test_unrepresentable_stake_rejected() {
        let config = WagerConfig::default();
        let (store, id) = single_account_store(u64::MAX);
        let engine = WagerEngine::new(&config, &store);

        let err = engine
            .resolve(
                &request(id, Outcome::Heads, i64::MAX as u64 + 1),
                &mut drawing(Outcome::Heads),
            )
            .unwrap_err();
        assert_eq!(err, WagerError::InvalidStake);
    }

    #[test]
    fn test_exactly_one_mutation_per_wager() {
        let config = WagerConfig::default();
        let (store, id) = single_account_store(100);
        let engine = WagerEngine::new(&config, &store);

        assert_eq!(store.load(id).unwrap().version, 0);
        engine
            .resolve(
                &request(id, Outcome::Tails, 10),
                &mut drawing(Outcome::Tails),
            )
            .unwrap();
        assert_eq!(store.load(id).unwrap().version, 1);

        // A rejected wager performs no write at all.
        let _ = engine
            .resolve(
                &request(id, Outcome::Tails, 1_000),
                &mut drawing(Outcome::Tails),
            )
            .unwrap_err();
        assert_eq!(store.load(id).unwrap().version, 1);
    }

    #[test]
    fn test_alternating_draws_net_to_zero() {
        let config = WagerConfig::default();
        let (store, id) = single_account_store(100);
        let engine = WagerEngine::new(&config, &store);

        // Constant prediction against an alternating coin: every win is
        // followed by an equal loss.
        let mut coin = AlternatingCoin(Outcome::Heads);
        for _ in 0..10 {
            engine
                .resolve(&request(id, Outcome::Heads, 10), &mut coin)
                .unwrap();
        }
        assert_eq!(store.load(id).unwrap().account.coins, 100);
    }

    #[test]
    fn test_prediction_of_either_face_can_win() {
        let config = WagerConfig::default();
        let (store, id) = single_account_store(100);
        let engine = WagerEngine::new(&config, &store);

        for predicted in [Outcome::Heads, Outcome::Tails] {
            let result = engine
                .resolve(&request(id, predicted, 10), &mut drawing(predicted))
                .unwrap();
            assert!(result.won);

            let result = engine
                .resolve(&request(id, predicted, 10), &mut drawing(predicted.other()))
                .unwrap();
            assert!(!result.won);
        }
        // Two wins and two losses net to the starting balance.
        assert_eq!(store.load(id).unwrap().account.coins, 100);
    }
}
