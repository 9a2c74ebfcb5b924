/// Fixed delay between link read attempts
pub const RETRY_MILLIS: u64 = 10;

/// Slowest speed ever commanded to an axis that has somewhere to go
pub const MIN_SPEED_COUNTS: i64 = 1;

/// Consecutive stationary polls after which the mount is treated as settled
pub const SETTLE_POLLS: u32 = 3;
