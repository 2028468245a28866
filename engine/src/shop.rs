//! Coins-for-resources shop.
//!
//! A purchase debits the account's coins and grants the resource in the same
//! compare-and-swap commit, so concurrent requests cannot lose updates and
//! the receipt the caller gets back always describes a state that actually
//! existed.

use crate::config::{ShopConfig, WagerConfig};
use crate::store::{AccountStore, Snapshot, SwapError};
use perch_types::{AccountId, ResourceKind};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a purchase was not completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("amount must be a positive number of units")]
    InvalidAmount,
    #[error("account not found")]
    AccountNotFound,
    #[error("insufficient coins: have {balance}, need {cost}")]
    InsufficientFunds { balance: u64, cost: u64 },
    #[error("concurrent update conflict")]
    ConcurrentConflict,
}

/// Receipt for a completed purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Purchase {
    pub kind: ResourceKind,
    pub amount: u64,
    pub total_cost: u64,
    pub balance_after: u64,
    /// Total units of `kind` held after the grant.
    pub resource_total: u64,
}

/// Sells resources against an account store at configured unit prices.
pub struct Shop<'a, S: AccountStore> {
    prices: &'a ShopConfig,
    wager: &'a WagerConfig,
    store: &'a S,
}

impl<'a, S: AccountStore> Shop<'a, S> {
    pub fn new(prices: &'a ShopConfig, wager: &'a WagerConfig, store: &'a S) -> Self {
        Self {
            prices,
            wager,
            store,
        }
    }

    /// Buy `amount` units of `kind`.
    ///
    /// The debit and the resource grant commit as one swap; bounded retries
    /// absorb transient contention.
    pub fn purchase(
        &self,
        id: AccountId,
        kind: ResourceKind,
        amount: u64,
    ) -> Result<Purchase, PurchaseError> {
        if amount == 0 {
            return Err(PurchaseError::InvalidAmount);
        }
        let total_cost = self
            .prices
            .price(kind)
            .checked_mul(amount)
            .ok_or(PurchaseError::InvalidAmount)?;

        for _ in 0..self.wager.adjust_attempts {
            let Snapshot {
                version,
                mut account,
            } = self.store.load(id).ok_or(PurchaseError::AccountNotFound)?;

            if account.coins < total_cost {
                return Err(PurchaseError::InsufficientFunds {
                    balance: account.coins,
                    cost: total_cost,
                });
            }

            account.coins -= total_cost;
            account.resources.grant(kind, amount);
            let receipt = Purchase {
                kind,
                amount,
                total_cost,
                balance_after: account.coins,
                resource_total: account.resources.amount(kind),
            };

            match self.store.swap(id, version, account) {
                Ok(_) => {
                    debug!(account = %id, %kind, amount, total_cost, "purchase settled");
                    return Ok(receipt);
                }
                Err(SwapError::NotFound) => return Err(PurchaseError::AccountNotFound),
                Err(SwapError::Stale) => {
                    debug!(account = %id, %kind, "account changed underfoot, retrying");
                }
            }
        }
        warn!(account = %id, %kind, amount, "purchase retries exhausted");
        Err(PurchaseError::ConcurrentConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::mocks::single_account_store;
    use crate::store::Memory;

    fn shop_config() -> Config {
        Config::parse(
            r#"
shop:
  ram: 10
  disk: 5
  slots: 100
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_purchase_debits_and_grants() {
        let config = shop_config();
        let (store, id) = single_account_store(1_000);
        let shop = Shop::new(&config.shop, &config.wager, &store);

        let receipt = shop.purchase(id, ResourceKind::Ram, 64).unwrap();
        assert_eq!(receipt.total_cost, 640);
        assert_eq!(receipt.balance_after, 360);
        assert_eq!(receipt.resource_total, 64);

        let account = store.load(id).unwrap().account;
        assert_eq!(account.coins, 360);
        assert_eq!(account.resources.ram, 64);
    }

    #[test]
    fn test_purchase_accumulates_resource() {
        let config = shop_config();
        let (store, id) = single_account_store(1_000);
        let shop = Shop::new(&config.shop, &config.wager, &store);

        shop.purchase(id, ResourceKind::Disk, 10).unwrap();
        let receipt = shop.purchase(id, ResourceKind::Disk, 30).unwrap();
        assert_eq!(receipt.resource_total, 40);
        assert_eq!(receipt.balance_after, 1_000 - 50 - 150);
    }

    #[test]
    fn test_purchase_insufficient_funds() {
        let config = shop_config();
        let (store, id) = single_account_store(99);
        let shop = Shop::new(&config.shop, &config.wager, &store);

        let err = shop.purchase(id, ResourceKind::Slots, 1).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::InsufficientFunds {
                balance: 99,
                cost: 100
            }
        );
        // Nothing debited, nothing granted.
        let account = store.load(id).unwrap().account;
        assert_eq!(account.coins, 99);
        assert_eq!(account.resources.slots, 0);
    }

    #[test]
    fn test_purchase_zero_amount_rejected() {
        let config = shop_config();
        let (store, id) = single_account_store(1_000);
        let shop = Shop::new(&config.shop, &config.wager, &store);

        assert_eq!(
            shop.purchase(id, ResourceKind::Ram, 0),
            Err(PurchaseError::InvalidAmount)
        );
    }

    #[test]
    fn test_purchase_cost_overflow_rejected() {
        let config = shop_config();
        let (store, id) = single_account_store(1_000);
        let shop = Shop::new(&config.shop, &config.wager, &store);

        assert_eq!(
            shop.purchase(id, ResourceKind::Ram, u64::MAX / 2),
            Err(PurchaseError::InvalidAmount)
        );
        assert_eq!(store.load(id).unwrap().account.coins, 1_000);
    }

    #[test]
    fn test_purchase_unknown_account() {
        let config = shop_config();
        let store = Memory::default();
        let shop = Shop::new(&config.shop, &config.wager, &store);

        assert_eq!(
            shop.purchase(AccountId(5), ResourceKind::Ram, 1),
            Err(PurchaseError::AccountNotFound)
        );
    }
}
