/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Parse a non-negative integer setting. Thousands separators (`5,000`) and surrounding whitespace are tolerated.
/// Returns `None` if the value is missing or cannot be parsed, so that callers can log and fall back to a default.
pub fn parse_amount(value: Option<String>) -> Option<i64> {
    let cleaned = value?.trim().replace([',', '_'], "");
    cleaned.parse::<i64>().ok().filter(|v| *v >= 0)
}
