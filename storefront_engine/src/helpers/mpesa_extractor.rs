//! Pulls the transaction code and payer phone number out of a forwarded M-Pesa confirmation SMS.
//!
//! Extraction is best-effort. Whatever the buyer pasted is kept verbatim so that staff can check it by hand, and the
//! only hard rule is the minimum message length.
use log::*;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{db_types::MpesaDetails, sf_api::errors::ValidationError};

/// Pastes shorter than this are treated as accidental and rejected.
pub const MIN_CONFIRMATION_LENGTH: usize = 10;

static CODE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| compile(r"\b[A-Z0-9]{10}\b"));
static PHONE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| compile(r"(?:^|[^0-9])((?:254|0)[0-9]{9})(?:[^0-9]|$)"));

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|e| error!("🛒 Could not compile M-Pesa pattern {pattern}. Extraction is disabled. {e}"))
        .ok()
}

/// The first run of exactly 10 upper-case letters or digits, e.g. `SHK3A7B2C1`.
///
/// The run must stand on its own: a longer run such as an 11-character account reference is not cut down to a code.
/// A bare local phone number (`0712345678`) is also 10 digits, so runs that read as a phone number are skipped.
pub fn extract_transaction_code(message: &str) -> Option<String> {
    let re = CODE_PATTERN.as_ref()?;
    re.find_iter(message).map(|m| m.as_str()).find(|candidate| !is_phone_number(candidate)).map(String::from)
}

fn is_phone_number(candidate: &str) -> bool {
    PHONE_PATTERN.as_ref().is_some_and(|re| re.is_match(candidate))
}

/// The first Kenyan phone number, written either as `254XXXXXXXXX` or `0XXXXXXXXX`.
pub fn extract_payer_phone(message: &str) -> Option<String> {
    let re = PHONE_PATTERN.as_ref()?;
    re.captures(message).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Validates a pasted confirmation message and builds the payment details for the order.
///
/// Fields that cannot be extracted from the message fall back to what the buyer typed into the code and phone fields.
/// A message shorter than [`MIN_CONFIRMATION_LENGTH`] is rejected, whatever was typed manually.
pub fn parse_confirmation(
    message: &str,
    manual_code: Option<&str>,
    manual_phone: Option<&str>,
) -> Result<MpesaDetails, ValidationError> {
    let trimmed = message.trim();
    let actual = trimmed.chars().count();
    if actual < MIN_CONFIRMATION_LENGTH {
        return Err(ValidationError::MessageTooShort { min: MIN_CONFIRMATION_LENGTH, actual });
    }
    let code = extract_transaction_code(trimmed).or_else(|| non_blank(manual_code));
    let phone = extract_payer_phone(trimmed).or_else(|| non_blank(manual_phone));
    if code.is_none() {
        debug!("🛒 No transaction code found in the M-Pesa message. Staff will need to read it manually.");
    }
    Ok(MpesaDetails { code, phone, raw_message: Some(message.to_string()) })
}
