//! One-time security codes issued for phone login.

use rand::Rng;
use std::ops::RangeInclusive;

/// Length of the verification code
pub const CODE_LENGTH: usize = 5;

/// Every issued code falls in this range, so it never has a leading zero
pub const CODE_RANGE: RangeInclusive<u32> = 10_000..=99_999;

/// Default expiration time for verification codes (5 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 5;

/// Generates a uniformly random 5-digit code
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(CODE_RANGE).to_string()
}
