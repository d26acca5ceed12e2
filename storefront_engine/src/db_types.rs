use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use sf_common::Shillings;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The server-held status of an order. `Pending` is the only legal initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// Newly created. Mobile-money orders stay here until staff verify the pasted confirmation message.
    Pending,
    /// Staff have accepted the order (and verified payment, where applicable).
    Confirmed,
    /// The order has left the shop.
    Dispatched,
    /// The customer has received the order.
    Delivered,
    /// The order was cancelled by staff.
    Cancelled,
}

impl OrderStatusType {
    pub const ALL: [OrderStatusType; 5] = [Self::Pending, Self::Confirmed, Self::Dispatched, Self::Delivered, Self::Cancelled];

    /// Orders in these states count as sales for revenue and product rankings.
    pub fn is_sale(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Dispatched | Self::Delivered)
    }

    /// Position along the fulfilment path. `Cancelled` sits outside the path and has no rank.
    pub fn progress_rank(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Dispatched => Some(2),
            Self::Delivered => Some(3),
            Self::Cancelled => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Dispatched => "dispatched",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "dispatched" => Ok(Self::Dispatched),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------      Channel        ---------------------------------------------------------
/// The path an order came in through (`orderedVia` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Website,
    Whatsapp,
    Mpesa,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Whatsapp => "whatsapp",
            Self::Mpesa => "mpesa",
        }
    }

    /// The payment method implied by the channel when the request does not name one.
    pub fn default_payment_method(&self) -> PaymentMethod {
        match self {
            Self::Website => PaymentMethod::Cod,
            Self::Whatsapp => PaymentMethod::Whatsapp,
            Self::Mpesa => PaymentMethod::Mpesa,
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "website" => Ok(Self::Website),
            "whatsapp" => Ok(Self::Whatsapp),
            "mpesa" => Ok(Self::Mpesa),
            s => Err(ConversionError(format!("Invalid order channel: {s}"))),
        }
    }
}

//--------------------------------------    PaymentMethod     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,
    Whatsapp,
    Mpesa,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Whatsapp => "whatsapp",
            Self::Mpesa => "mpesa",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(Self::Cod),
            "whatsapp" => Ok(Self::Whatsapp),
            "mpesa" => Ok(Self::Mpesa),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------     OrderNumber      ---------------------------------------------------------
/// The human-readable, store-unique order reference that customers quote when tracking an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      Customer        ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

//--------------------------------------    MpesaDetails      ---------------------------------------------------------
/// What the buyer told us about their M-Pesa payment. `raw_message` is kept verbatim for staff to audit;
/// the code and phone are best-effort extractions from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpesaDetails {
    pub code: Option<String>,
    pub phone: Option<String>,
    pub raw_message: Option<String>,
}

impl MpesaDetails {
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.phone.is_none() && self.raw_message.is_none()
    }
}

//--------------------------------------      Product         ---------------------------------------------------------
/// A catalog record, as far as the order pipeline cares about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Shillings,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl Product {
    pub fn new<S: Into<String>>(id: i64, name: S, price: Shillings) -> Self {
        Self { id, name: name.into(), price, image: None, category: None }
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Chosen option per variation type (e.g. `Size -> M`). A `BTreeMap` keeps the keys sorted, which is what makes
/// the variation signature canonical.
pub type Variations = BTreeMap<String, String>;

/// Renders variations as `Color: Red, Size: M`. Returns `None` when nothing was selected.
pub fn variation_label(variations: &Variations) -> Option<String> {
    if variations.is_empty() {
        return None;
    }
    let label = variations.iter().map(|(k, v)| format!("{k}: {v}")).collect::<Vec<_>>().join(", ");
    Some(label)
}

//--------------------------------------  DeliveryLocation    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryLocation {
    pub id: i64,
    pub name: String,
    pub fee: Shillings,
}

//--------------------------------------      OrderItem       ---------------------------------------------------------
/// A frozen copy of a product at order time. Never recomputed from the live catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub unit_price: Shillings,
    pub image: Option<String>,
    pub variation_label: Option<String>,
    pub quantity: i64,
    pub line_total: Shillings,
}

//--------------------------------------        Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub customer: CustomerDetails,
    pub delivery_location_id: Option<i64>,
    /// Name of the delivery location at the time of the order, if one was chosen
    pub delivery_location: Option<String>,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: Shillings,
    pub delivery_fee: Shillings,
    pub total: Shillings,
    pub status: OrderStatusType,
    pub channel: Channel,
    pub payment_method: PaymentMethod,
    pub mpesa: MpesaDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

//--------------------------------------       NewOrder       ---------------------------------------------------------
/// A validated order that is ready to be written to the store. Order numbers are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub customer: CustomerDetails,
    pub delivery_location_id: Option<i64>,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub subtotal: Shillings,
    pub delivery_fee: Shillings,
    pub total: Shillings,
    pub status: OrderStatusType,
    pub channel: Channel,
    pub payment_method: PaymentMethod,
    pub mpesa: MpesaDetails,
}

impl NewOrder {
    pub fn with_order_number(mut self, order_number: OrderNumber) -> Self {
        self.order_number = order_number;
        self
    }
}
