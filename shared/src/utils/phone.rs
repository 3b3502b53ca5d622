//! Phone number utilities

use regex::Regex;
use once_cell::sync::Lazy;

/// Country code prepended to numbers that arrive without one (Chile)
pub const DEFAULT_COUNTRY_CODE: &str = "56";

static NON_DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\D").unwrap()
});

/// Normalize a phone number to the stored form.
///
/// Every non-digit character is removed. If the remaining digits do not
/// already start with `country_code`, a single leading `0` is dropped and the
/// country code is prepended.
///
/// ```
/// use pf_shared::utils::phone::normalize_phone_number;
///
/// assert_eq!(normalize_phone_number("+56 9 1234 5678", "56"), "56912345678");
/// assert_eq!(normalize_phone_number("091234567", "56"), "5691234567");
/// ```
pub fn normalize_phone_number(phone: &str, country_code: &str) -> String {
    let cleaned = NON_DIGIT_REGEX.replace_all(phone, "");

    if cleaned.starts_with(country_code) {
        return cleaned.into_owned();
    }

    let local = cleaned.strip_prefix('0').unwrap_or(&cleaned);
    format!("{}{}", country_code, local)
}

/// Strip a single leading `+`, leaving every other character untouched
pub fn strip_plus_prefix(phone: &str) -> &str {
    phone.strip_prefix('+').unwrap_or(phone)
}

/// Mask a phone number for logs (e.g., 569****5678)
pub fn mask_phone_number(phone: &str) -> String {
    let digits = NON_DIGIT_REGEX.replace_all(phone, "");
    if digits.len() >= 7 {
        format!(
            "{}****{}",
            &digits[0..3],
            &digits[digits.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}
