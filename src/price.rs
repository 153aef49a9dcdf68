//! Price text normalization.
//!
//! Listing prices arrive as display text (`"₹1,234.50"`, `"Rs. 99"`). Every digit is
//! kept and the last two are treated as the fractional part, so the stored form is
//! always `<digits>.<two digits>`.

/// Keep only ASCII digits from `raw`.
pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize display text into the fixed two-decimal string used for cache
/// comparison and storage.
///
/// More than two digits: a point goes in before the last two (`"12345"` -> `"123.45"`).
/// Two or fewer: `".00"` is appended to the digits as-is (`"5"` -> `"5.00"`).
///
/// Input without any digits normalizes to `".00"`. That output does not match
/// `\d+\.\d{2}` and is kept unchanged for compatibility with existing cache entries.
pub fn normalize_price(raw: &str) -> String {
    let digits = strip_non_digits(raw);

    if digits.len() > 2 {
        let (whole, cents) = digits.split_at(digits.len() - 2);
        format!("{}.{}", whole, cents)
    } else {
        format!("{}.00", digits)
    }
}
