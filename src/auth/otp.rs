//! One-time code generation for email verification.

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, rngs::OsRng};

const OTP_MIN: u32 = 100_000;
const OTP_MAX: u32 = 999_999;

/// Six digit code drawn uniformly from the OS entropy source.
pub(crate) fn generate_otp() -> String {
    OsRng.gen_range(OTP_MIN..=OTP_MAX).to_string()
}

/// Expiry of a code issued at `now`. The window is always strictly in the
/// future, even for a misconfigured non-positive ttl.
pub(crate) fn otp_expiry(ttl_seconds: i64, now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::seconds(ttl_seconds.max(1))
}
