pub const ACCOUNT_NAME_MIN_LENGTH: usize = 3;
pub const ACCOUNT_NAME_MAX_LENGTH: usize = 30;

pub const ACCOUNT_NUMBER_MIN: i32 = 1_000_000_000;
/// Exclusive upper bound.
pub const ACCOUNT_NUMBER_MAX: i32 = i32::MAX;
pub const MAX_ACCOUNT_NUMBER_ATTEMPTS: usize = 10;

pub const USERNAME_MIN_LENGTH: usize = 6;
pub const NAME_MIN_LENGTH: usize = 2;

pub const SALT_LENGTH: usize = 32;

/// Fractional digits kept by the `DECIMAL(18,2)` money columns.
pub const AMOUNT_SCALE: u32 = 2;
