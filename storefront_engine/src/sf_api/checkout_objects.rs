use serde::{Deserialize, Serialize};

use crate::{
    cart::CartLine,
    db_types::{Channel, MpesaDetails, OrderNumber, OrderStatusType, PaymentMethod, Shillings},
    order_objects::{OrderCreated, OrderRequest, OrderRequestItem},
    sf_api::errors::ValidationError,
    store_config::StoreConfig,
};

//--------------------------------------    CheckoutForm     ----------------------------------------------------------
/// What the customer typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub delivery_location_id: Option<i64>,
    pub delivery_address: String,
    pub notes: Option<String>,
}

impl CheckoutForm {
    /// Name, phone and delivery address are required on every channel.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::MissingField("phone"));
        }
        if self.delivery_address.trim().is_empty() {
            return Err(ValidationError::MissingField("delivery address"));
        }
        Ok(())
    }
}

//--------------------------------------   CheckoutChannel   ----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutChannel {
    /// Cash on delivery
    Website,
    /// Hand the order over to the shop's WhatsApp chat
    WhatsApp,
    /// Pay into the shop's till, then paste the confirmation SMS
    Mpesa(MpesaConfirmationInput),
}

impl CheckoutChannel {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Website => Channel::Website,
            Self::WhatsApp => Channel::Whatsapp,
            Self::Mpesa(_) => Channel::Mpesa,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MpesaConfirmationInput {
    /// The pasted confirmation message
    pub message: String,
    /// Manually typed transaction code, used if none can be read from the message
    pub code: Option<String>,
    /// Manually typed payer phone, used if none can be read from the message
    pub phone: Option<String>,
}

//--------------------------------------    CheckoutQuote    ----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuote {
    pub subtotal: Shillings,
    /// The fee for the chosen delivery location, before any waiver
    pub location_fee: Shillings,
    /// The fee actually charged
    pub delivery_fee: Shillings,
    pub free_shipping: bool,
    pub total: Shillings,
}

impl CheckoutQuote {
    pub fn new(subtotal: Shillings, location_fee: Shillings, config: &StoreConfig) -> Self {
        let free_shipping = config.qualifies_for_free_shipping(subtotal);
        let delivery_fee = config.effective_delivery_fee(subtotal, location_fee);
        Self { subtotal, location_fee, delivery_fee, free_shipping, total: subtotal + delivery_fee }
    }
}

/// What the buyer sees on the mobile-money payment screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstructions {
    pub till_number: String,
    pub amount_due: Shillings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order was stored (website and M-Pesa channels).
    Placed(OrderCreated),
    /// The chat link was opened. `order` is set if the background record-keeping call also succeeded.
    ChatHandoff { link: String, order: Option<OrderCreated>, persisted: bool },
}

//--------------------------------------   payload building  ----------------------------------------------------------
/// Snapshots the cart lines into order items, using the prices currently on the lines.
pub fn order_items(lines: &[CartLine]) -> Vec<OrderRequestItem> {
    lines
        .iter()
        .map(|line| OrderRequestItem {
            product_id: line.product.id,
            product_name: line.product.name.clone(),
            product_image: line.product.image.clone(),
            variation: line.variation_label(),
            quantity: line.quantity,
            unit_price: line.product.price,
            total_price: line.line_total(),
        })
        .collect()
}

/// The payload shared by all three channels. The channel-specific fields (payment method, M-Pesa details) are left
/// for the caller to fill in.
pub fn build_order_request(
    lines: &[CartLine],
    form: &CheckoutForm,
    location_fee: Shillings,
    channel: Channel,
    config: &StoreConfig,
) -> OrderRequest {
    let items = order_items(lines);
    let subtotal = items.iter().map(|i| i.total_price).sum();
    let quote = CheckoutQuote::new(subtotal, location_fee, config);
    let optional = |s: &Option<String>| s.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    OrderRequest {
        customer_name: form.name.trim().to_string(),
        customer_email: optional(&form.email),
        customer_phone: form.phone.trim().to_string(),
        delivery_location_id: form.delivery_location_id,
        delivery_address: form.delivery_address.trim().to_string(),
        delivery_fee: quote.delivery_fee,
        subtotal: quote.subtotal,
        total: quote.total,
        notes: optional(&form.notes),
        ordered_via: channel,
        payment_method: Some(channel.default_payment_method()),
        mpesa_code: None,
        mpesa_phone: None,
        mpesa_message: None,
        status: None,
        items,
    }
}

//--------------------------------------     chat summary    ----------------------------------------------------------
/// A plain-text summary of the order for the shop's chat.
pub fn chat_summary(request: &OrderRequest, order_number: Option<&OrderNumber>, location: Option<&str>) -> String {
    let mut lines = Vec::with_capacity(request.items.len() + 12);
    match order_number {
        Some(n) => lines.push(format!("Hello! I'd like to place order {n}:")),
        None => lines.push("Hello! I'd like to place an order:".to_string()),
    }
    lines.push(String::new());
    for item in &request.items {
        let variation = item.variation.as_ref().map(|v| format!(" ({v})")).unwrap_or_default();
        lines.push(format!("• {}{variation} x{} = {}", item.product_name, item.quantity, item.total_price));
    }
    lines.push(String::new());
    lines.push(format!("Subtotal: {}", request.subtotal));
    if request.delivery_fee.is_zero() {
        lines.push("Delivery: FREE".to_string());
    } else {
        lines.push(format!("Delivery: {}", request.delivery_fee));
    }
    lines.push(format!("Total: {}", request.total));
    lines.push(String::new());
    lines.push(format!("Name: {}", request.customer_name));
    lines.push(format!("Phone: {}", request.customer_phone));
    if let Some(location) = location {
        lines.push(format!("Location: {location}"));
    }
    lines.push(format!("Address: {}", request.delivery_address));
    if let Some(notes) = &request.notes {
        lines.push(format!("Notes: {notes}"));
    }
    lines.join("\n")
}

/// `https://wa.me/{number}?text={urlencoded summary}`
pub fn chat_link(number: &str, text: &str) -> String {
    let number = number.chars().filter(|c| c.is_ascii_digit()).collect::<String>();
    format!("https://wa.me/{number}?text={}", urlencoding::encode(text))
}

/// Fills in the mobile-money fields of an order request.
pub fn with_mpesa_details(mut request: OrderRequest, details: MpesaDetails) -> OrderRequest {
    request.payment_method = Some(PaymentMethod::Mpesa);
    request.status = Some(OrderStatusType::Pending);
    request.mpesa_code = details.code;
    request.mpesa_phone = details.phone;
    request.mpesa_message = details.raw_message;
    request
}
