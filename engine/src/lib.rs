//! Balance-mutation engine for the perch billing backend.
//!
//! Two operations settle against a user's coin balance: the coin-flip wager
//! ([wager::WagerEngine]) and the resource shop ([shop::Shop]). Both commit
//! through the compare-and-swap account store seam in [store], so a balance
//! can never go negative and never loses an update under concurrent calls.

pub mod config;
pub mod rng;
pub mod shop;
pub mod store;
pub mod wager;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;


pub use config::{Config, ShopConfig, StartingResources, WagerConfig};
pub use rng::{CoinSource, WagerRng};
pub use shop::{Purchase, PurchaseError, Shop};
pub use store::{adjust_balance, AccountStore, Memory, Snapshot, StoreError, SwapError};
pub use wager::{WagerEngine, WagerError};
