//! Phone number validation.

use std::sync::LazyLock;

use regex::Regex;

/// Accepted format: `+7-9XX-XXX-XXXX`. Anchored on both ends — partial
/// matches are rejected.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+7-9\d{2}-\d{3}-\d{4}$").expect("valid phone pattern"));

/// Check whether `phone` matches the accepted format exactly. Never fails.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone)
}
