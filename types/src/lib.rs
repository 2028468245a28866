//! Data model for the perch billing engine.
//!
//! Account records, hosting resource counters, and the coin-flip wager
//! request/result types, with codec implementations for the externally-owned
//! account store.

mod account;
mod constants;
mod wager;

pub use account::*;
pub use constants::*;
pub use wager::*;
