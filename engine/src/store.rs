//! Account store seam.
//!
//! The engine never owns account records; it reads and conditionally writes
//! them through [AccountStore]. The trait exposes a versioned load and a
//! compare-and-swap write, and [adjust_balance] builds the guarded atomic
//! balance adjustment on top of those two calls.

use perch_types::{Account, AccountId, Resources};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// An account record together with the store version observed at read time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub version: u64,
    pub account: Account,
}

/// Failure of a conditional write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("account not found")]
    NotFound,
    /// The record changed since the snapshot was taken.
    #[error("snapshot is stale")]
    Stale,
}

/// Failure of an atomic balance adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("account not found")]
    NotFound,
    /// The guard condition on the resulting balance does not hold.
    #[error("balance guard rejected: have {balance}, need {required}")]
    Rejected { balance: u64, required: u64 },
    /// The record kept changing underfoot and the retry budget ran out.
    #[error("concurrent update conflict")]
    Conflict,
}

/// Versioned key-value view of the externally-owned account table.
///
/// `swap` must be atomic with respect to other `swap` calls on the same id:
/// at most one writer observing a given version succeeds. That single
/// guarantee is what every balance mutation in this crate is built on.
pub trait AccountStore {
    /// Read an account with its current version.
    fn load(&self, id: AccountId) -> Option<Snapshot>;

    /// Replace the record only if its stored version still equals `expected`.
    /// Returns the new version on success.
    fn swap(&self, id: AccountId, expected: u64, account: Account) -> Result<u64, SwapError>;
}

/// Apply `delta` to an account balance, but only if the resulting balance
/// would satisfy `>= min_resulting`. One indivisible mutation: either the
/// whole adjustment commits or the balance is untouched.
///
/// Contention is retried up to `attempts` times; exhaustion surfaces as
/// [StoreError::Conflict].
pub fn adjust_balance<S: AccountStore + ?Sized>(
    store: &S,
    id: AccountId,
    delta: i64,
    min_resulting: u64,
    attempts: u32,
) -> Result<u64, StoreError> {
    for attempt in 0..attempts {
        let Snapshot {
            version,
            mut account,
        } = store.load(id).ok_or(StoreError::NotFound)?;

        let resulting = account
            .coins
            .checked_add_signed(delta)
            .filter(|resulting| *resulting >= min_resulting);
        let Some(resulting) = resulting else {
            return Err(StoreError::Rejected {
                balance: account.coins,
                required: min_resulting.saturating_add(delta.min(0).unsigned_abs()),
            });
        };

        account.coins = resulting;
        match store.swap(id, version, account) {
            Ok(_) => return Ok(resulting),
            Err(SwapError::NotFound) => return Err(StoreError::NotFound),
            Err(SwapError::Stale) => {
                debug!(%id, delta, attempt, "balance changed underfoot, retrying");
            }
        }
    }
    warn!(%id, delta, attempts, "balance adjustment retries exhausted");
    Err(StoreError::Conflict)
}

/// In-process account table with auto-increment ids.
///
/// The mutex is held only for the duration of a single load or swap, never
/// across a read-modify-write, so contention between callers is resolved by
/// the version check rather than by lock ordering.
#[derive(Default)]
pub struct Memory {
    accounts: Mutex<HashMap<AccountId, (u64, Account)>>,
    next_id: AtomicU64,
}

impl Memory {
    /// Create an account with the next free id, returning the id.
    pub fn create(&self, name: String, coins: u64, resources: Resources) -> AccountId {
        let id = AccountId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let account = Account::new(id, name, coins, resources);
        self.accounts
            .lock()
            .expect("account table lock poisoned")
            .insert(id, (0, account));
        id
    }

    /// Remove an account record (admin surface; the engine itself never
    /// destroys accounts).
    pub fn remove(&self, id: AccountId) -> Option<Account> {
        self.accounts
            .lock()
            .expect("account table lock poisoned")
            .remove(&id)
            .map(|(_, account)| account)
    }
}

impl AccountStore for Memory {
    fn load(&self, id: AccountId) -> Option<Snapshot> {
        self.accounts
            .lock()
            .expect("account table lock poisoned")
            .get(&id)
            .map(|(version, account)| Snapshot {
                version: *version,
                account: account.clone(),
            })
    }

    fn swap(&self, id: AccountId, expected: u64, account: Account) -> Result<u64, SwapError> {
        let mut accounts = self.accounts.lock().expect("account table lock poisoned");
        let entry = accounts.get_mut(&id).ok_or(SwapError::NotFound)?;
        if entry.0 != expected {
            return Err(SwapError::Stale);
        }
        entry.0 += 1;
        entry.1 = account;
        Ok(entry.0)
    }
}
