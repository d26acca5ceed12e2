use chrono::{DateTime, Utc};
use rand::Rng;

use crate::db_types::OrderNumber;

/// Generates a customer-facing order number of the form `{prefix}-{yymmdd}-{nnnn}`, e.g. `ORD-260205-0417`.
///
/// The random suffix only gives 10,000 numbers per day, so callers must be prepared for a collision on insert and
/// try again with a fresh number.
pub fn new_order_number(prefix: &str, now: DateTime<Utc>) -> OrderNumber {
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format_order_number(prefix, now, suffix)
}

pub fn format_order_number(prefix: &str, now: DateTime<Utc>, suffix: u16) -> OrderNumber {
    let prefix = prefix.trim();
    let date = now.format("%y%m%d");
    if prefix.is_empty() {
        OrderNumber(format!("{date}-{suffix:04}"))
    } else {
        OrderNumber(format!("{prefix}-{date}-{suffix:04}"))
    }
}
