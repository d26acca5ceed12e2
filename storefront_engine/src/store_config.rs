use std::env;

use log::*;
use sf_common::helpers::parse_amount;

use crate::db_types::Shillings;

pub const DEFAULT_FREE_SHIPPING_THRESHOLD: i64 = 5_000;
pub const DEFAULT_ORDER_NUMBER_PREFIX: &str = "ORD";

/// Business settings that the order pipeline needs. Network and database settings live with the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Orders whose subtotal reaches this amount ship for free.
    pub free_shipping_threshold: Shillings,
    /// The number that chat-handoff orders are sent to, in international format without the `+`.
    pub whatsapp_number: String,
    /// The till that buyers pay into for mobile-money orders. Only ever displayed.
    pub till_number: String,
    pub order_number_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Shillings::from(DEFAULT_FREE_SHIPPING_THRESHOLD),
            whatsapp_number: String::default(),
            till_number: String::default(),
            order_number_prefix: DEFAULT_ORDER_NUMBER_PREFIX.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn from_env_or_default() -> Self {
        let free_shipping_threshold = match parse_amount(env::var("SF_FREE_SHIPPING_THRESHOLD").ok()) {
            Some(v) => Shillings::from(v),
            None => {
                info!(
                    "🪛️ SF_FREE_SHIPPING_THRESHOLD is not set or is invalid. Using the default of \
                     {DEFAULT_FREE_SHIPPING_THRESHOLD}."
                );
                Shillings::from(DEFAULT_FREE_SHIPPING_THRESHOLD)
            },
        };
        let whatsapp_number = env::var("SF_WHATSAPP_NUMBER").ok().unwrap_or_else(|| {
            warn!("🪛️ SF_WHATSAPP_NUMBER is not set. WhatsApp checkout links will not reach the shop.");
            String::default()
        });
        let till_number = env::var("SF_MPESA_TILL_NUMBER").ok().unwrap_or_else(|| {
            warn!("🪛️ SF_MPESA_TILL_NUMBER is not set. Buyers will not be shown a till number for M-Pesa payments.");
            String::default()
        });
        let order_number_prefix = env::var("SF_ORDER_NUMBER_PREFIX")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ORDER_NUMBER_PREFIX.to_string());
        Self { free_shipping_threshold, whatsapp_number, till_number, order_number_prefix }
    }

    pub fn qualifies_for_free_shipping(&self, subtotal: Shillings) -> bool {
        subtotal >= self.free_shipping_threshold
    }

    /// The delivery fee that is actually charged: the location's fee, or zero once the free-shipping threshold is met.
    pub fn effective_delivery_fee(&self, subtotal: Shillings, location_fee: Shillings) -> Shillings {
        if self.qualifies_for_free_shipping(subtotal) {
            Shillings::zero()
        } else {
            location_fee
        }
    }
}
