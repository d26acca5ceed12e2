//! Kenyan phone number handling.
//!
//! Customers write the same number as `0712345678`, `254712345678` or `+254 712 345 678`. Orders keep whatever the
//! customer typed for display, and are looked up by [`phone_key`].

/// Returns the 9-digit subscriber part of a Kenyan mobile number, or `None` if `raw` is not recognisable as one.
pub fn subscriber_number(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_start_matches('+').replace([' ', '-', '(', ')'], "");
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let national = match cleaned.len() {
        12 if cleaned.starts_with("254") => &cleaned[3..],
        10 if cleaned.starts_with('0') => &cleaned[1..],
        9 => cleaned.as_str(),
        _ => return None,
    };
    if national.starts_with('7') || national.starts_with('1') {
        Some(national.to_string())
    } else {
        None
    }
}

/// `254XXXXXXXXX`
pub fn normalize_phone(raw: &str) -> Option<String> {
    subscriber_number(raw).map(|n| format!("254{n}"))
}

/// The form a phone number is stored and searched under. Kenyan mobile numbers become `254XXXXXXXXX`; anything else
/// keeps its digits and a leading `+`, so that spacing and punctuation never decide whether an order is found.
pub fn phone_key(raw: &str) -> String {
    normalize_phone(raw).unwrap_or_else(|| {
        raw.trim().chars().filter(|c| c.is_ascii_alphanumeric() || *c == '+').collect()
    })
}
