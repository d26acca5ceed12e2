use thiserror::Error;

use crate::{
    db_types::{OrderStatusType, Shillings},
    traits::{CatalogError, OrderManagementError},
};

/// Problems with user input. These are caught before anything is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("The M-Pesa confirmation message must be at least {min} characters long (got {actual})")]
    MessageTooShort { min: usize, actual: usize },
    #[error("{0} is not a valid order status")]
    InvalidStatus(String),
    #[error("New orders must start out as pending, not {0}")]
    InitialStatusNotPending(OrderStatusType),
    #[error("Search by order number or by phone number, not both")]
    AmbiguousTrackingQuery,
    #[error("Enter an order number or a phone number to search for")]
    EmptyTrackingQuery,
    #[error("Order total {total} does not equal subtotal {subtotal} plus delivery fee {delivery_fee}")]
    TotalMismatch { subtotal: Shillings, delivery_fee: Shillings, total: Shillings },
    #[error("Order subtotal {subtotal} does not equal the sum of the item totals, {items}")]
    SubtotalMismatch { subtotal: Shillings, items: Shillings },
    #[error("Item {product} has an invalid quantity or line total")]
    InvalidItem { product: String },
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),
    #[error("{0} is too large")]
    AmountTooLarge(&'static str),
    #[error("An order must contain at least one item")]
    NoItems,
    #[error("Deleting orders is permanent and must be explicitly confirmed")]
    DeletionNotConfirmed,
}

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Invalid request. {0}")]
    Validation(#[from] ValidationError),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Could not find a free order number after {0} attempts")]
    OrderNumberExhausted(usize),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<OrderManagementError> for OrderApiError {
    fn from(e: OrderManagementError) -> Self {
        match e {
            OrderManagementError::OrderNotFound(id) => OrderApiError::OrderNotFound(id),
            OrderManagementError::DatabaseError(s) => OrderApiError::DatabaseError(s),
            OrderManagementError::DuplicateOrderNumber(n) => {
                OrderApiError::DatabaseError(format!("Order number {n} is already in use"))
            },
        }
    }
}

impl From<CatalogError> for OrderApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(s) => OrderApiError::DatabaseError(s),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("This order is already being submitted")]
    SubmissionInFlight,
    #[error("Your cart is empty")]
    EmptyCart,
    /// The order could not be sent or stored. The caller may offer a retry; nothing is retried automatically.
    #[error("We could not place your order. Please try again. {0}")]
    Backend(String),
    #[error("Delivery location {0} does not exist")]
    DeliveryLocationNotFound(i64),
    #[error("Could not open the chat. {0}")]
    ChatUnavailable(String),
}

impl From<OrderApiError> for CheckoutError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::Validation(v) => CheckoutError::Validation(v),
            e => CheckoutError::Backend(e.to_string()),
        }
    }
}

impl From<CatalogError> for CheckoutError {
    fn from(e: CatalogError) -> Self {
        CheckoutError::Backend(e.to_string())
    }
}
