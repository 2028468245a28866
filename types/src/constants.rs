/// Maximum name length for an account record
pub const MAX_NAME_LENGTH: usize = 32;

/// Coins granted to a freshly created account when no config override is set
pub const DEFAULT_STARTING_COINS: u64 = 0;

/// Default bound on compare-and-swap attempts before a balance mutation is
/// reported as a concurrent-update conflict
pub const DEFAULT_ADJUST_ATTEMPTS: u32 = 3;
