mod mpesa_extractor;
mod order_number;
mod phone;
mod time_ago;

pub use mpesa_extractor::{extract_payer_phone, extract_transaction_code, parse_confirmation, MIN_CONFIRMATION_LENGTH};
pub use order_number::{format_order_number, new_order_number};
pub use phone::{normalize_phone, phone_key, subscriber_number};
pub use time_ago::time_ago;
