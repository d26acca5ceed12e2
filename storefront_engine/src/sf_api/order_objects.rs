use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{
        Channel,
        CustomerDetails,
        MpesaDetails,
        NewOrder,
        OrderItem,
        OrderNumber,
        OrderStatusType,
        PaymentMethod,
        Shillings,
    },
    sf_api::errors::ValidationError,
    store_config::StoreConfig,
};

//--------------------------------------    OrderRequest     ----------------------------------------------------------
/// The order-creation payload, as sent by checkout to `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub customer_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_location_id: Option<i64>,
    pub delivery_address: String,
    pub delivery_fee: Shillings,
    pub subtotal: Shillings,
    pub total: Shillings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub ordered_via: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpesa_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpesa_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpesa_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatusType>,
    pub items: Vec<OrderRequestItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequestItem {
    pub product_id: i64,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    pub quantity: i64,
    pub unit_price: Shillings,
    pub total_price: Shillings,
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl OrderRequest {
    /// Checks the request before it is stored:
    /// * name, phone and delivery address are present,
    /// * no amount is negative, and none of the sums overflow,
    /// * there is at least one item, and every line total is `unit price × quantity`,
    /// * the subtotal is the sum of the line totals,
    /// * `total == subtotal + delivery fee`, or `total == subtotal` once the free-shipping threshold is reached,
    /// * the initial status, if given, is `pending`.
    pub fn validate(&self, config: &StoreConfig) -> Result<(), ValidationError> {
        if is_blank(&self.customer_name) {
            return Err(ValidationError::MissingField("customerName"));
        }
        if is_blank(&self.customer_phone) {
            return Err(ValidationError::MissingField("customerPhone"));
        }
        if is_blank(&self.delivery_address) {
            return Err(ValidationError::MissingField("deliveryAddress"));
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        for (field, amount) in [("subtotal", self.subtotal), ("deliveryFee", self.delivery_fee), ("total", self.total)] {
            if amount.is_negative() {
                return Err(ValidationError::NegativeAmount(field));
            }
        }
        let line_is_valid = |i: &OrderRequestItem| {
            i.quantity >= 1 && !i.unit_price.is_negative() && i.unit_price.checked_mul(i.quantity) == Some(i.total_price)
        };
        if let Some(item) = self.items.iter().find(|i| !line_is_valid(i)) {
            return Err(ValidationError::InvalidItem { product: item.product_name.clone() });
        }
        let items = self
            .items
            .iter()
            .try_fold(Shillings::zero(), |sum, i| sum.checked_add(i.total_price))
            .ok_or(ValidationError::AmountTooLarge("subtotal"))?;
        if items != self.subtotal {
            return Err(ValidationError::SubtotalMismatch { subtotal: self.subtotal, items });
        }
        let with_fee = self.subtotal.checked_add(self.delivery_fee);
        let charged = with_fee == Some(self.total);
        let waived = config.qualifies_for_free_shipping(self.subtotal) && self.total == self.subtotal;
        if !(charged || waived) {
            if with_fee.is_none() {
                return Err(ValidationError::AmountTooLarge("total"));
            }
            return Err(ValidationError::TotalMismatch {
                subtotal: self.subtotal,
                delivery_fee: self.delivery_fee,
                total: self.total,
            });
        }
        match self.status {
            None | Some(OrderStatusType::Pending) => Ok(()),
            Some(s) => Err(ValidationError::InitialStatusNotPending(s)),
        }
    }

    /// Converts the request into a storable order. The payment method defaults to the one implied by the channel.
    pub fn into_new_order(self, order_number: OrderNumber) -> NewOrder {
        let payment_method = self.payment_method.unwrap_or_else(|| self.ordered_via.default_payment_method());
        let items = self
            .items
            .into_iter()
            .map(|i| OrderItem {
                product_id: i.product_id,
                name: i.product_name,
                unit_price: i.unit_price,
                image: i.product_image,
                variation_label: non_blank(i.variation),
                quantity: i.quantity,
                line_total: i.total_price,
            })
            .collect();
        let mpesa = MpesaDetails {
            code: non_blank(self.mpesa_code),
            phone: non_blank(self.mpesa_phone),
            raw_message: self.mpesa_message.filter(|m| !is_blank(m)),
        };
        NewOrder {
            order_number,
            customer: CustomerDetails {
                name: self.customer_name.trim().to_string(),
                phone: self.customer_phone.trim().to_string(),
                email: non_blank(self.customer_email),
            },
            delivery_location_id: self.delivery_location_id,
            delivery_address: self.delivery_address.trim().to_string(),
            notes: non_blank(self.notes),
            items,
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            total: self.total,
            status: OrderStatusType::Pending,
            channel: self.ordered_via,
            payment_method,
            mpesa,
        }
    }
}

/// Returned when an order has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_number: OrderNumber,
    pub order_id: i64,
}

//--------------------------------------   OrderQueryFilter   ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub status: Option<Vec<OrderStatusType>>,
    pub channel: Option<Channel>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Free-text search over order number, customer name and phone
    pub search: Option<String>,
}

impl OrderQueryFilter {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.as_ref().map(|s| s.is_empty()).unwrap_or(true) &&
            self.channel.is_none() &&
            self.since.is_none() &&
            self.until.is_none() &&
            self.search.as_ref().map(|s| s.trim().is_empty()).unwrap_or(true)
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No filters.");
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "status in [{statuses}]. ")?;
        }
        if let Some(channel) = &self.channel {
            write!(f, "via {channel}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        if let Some(search) = &self.search {
            write!(f, "matching '{search}'. ")?;
        }
        Ok(())
    }
}

//--------------------------------------     StatusChange     ---------------------------------------------------------
/// The result of a staff status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub order_id: i64,
    pub old: OrderStatusType,
    pub new: OrderStatusType,
    /// True when the order moved back along the fulfilment path (e.g. `delivered -> pending`) or a cancelled order
    /// was reopened. These moves are allowed, but are worth a second look.
    pub backwards: bool,
}

impl StatusChange {
    pub fn new(order_id: i64, old: OrderStatusType, new: OrderStatusType) -> Self {
        Self { order_id, old, new, backwards: is_backwards(old, new) }
    }
}

pub fn is_backwards(old: OrderStatusType, new: OrderStatusType) -> bool {
    match (old.progress_rank(), new.progress_rank()) {
        (Some(o), Some(n)) => n < o,
        (None, Some(_)) => true,
        _ => false,
    }
}

//--------------------------------------    DeletionReport    ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    /// Number of distinct ids that were asked for
    pub requested: usize,
    pub deleted: usize,
    pub failed: usize,
    pub deleted_ids: Vec<i64>,
    pub failed_ids: Vec<i64>,
}

impl DeletionReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.deleted == self.requested
    }
}
