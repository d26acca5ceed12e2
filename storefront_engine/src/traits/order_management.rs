use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatusType},
    order_objects::OrderQueryFilter,
};

#[derive(Debug, Clone, Error)]
pub enum OrderManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Order number {0} is already in use")]
    DuplicateOrderNumber(String),
}

impl From<sqlx::Error> for OrderManagementError {
    fn from(e: sqlx::Error) -> Self {
        OrderManagementError::DatabaseError(e.to_string())
    }
}

/// The order store. Backends persist orders together with their item snapshots, and hand them back with the
/// delivery location name filled in.
///
/// Every write is a single authoritative statement (or transaction). There is no version check, so concurrent status
/// updates from different staff sessions are last-write-wins.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores the order and its items atomically. If the order number is already taken, nothing is written and
    /// [`OrderManagementError::DuplicateOrderNumber`] is returned so that the caller can retry with a new number.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError>;

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderManagementError>;

    /// Exact match on the order number, ignoring case.
    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderManagementError>;

    /// Every order placed with this phone number, however it was written at checkout. `phone` is a lookup key as
    /// produced by [`crate::helpers::phone_key`]. Newest first.
    async fn fetch_orders_by_phone(&self, phone: &str) -> Result<Vec<Order>, OrderManagementError>;

    /// Orders matching the filter, newest first. An empty filter returns every order.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderManagementError>;

    /// Overwrites the status of the order. Returns the status it had before, along with the updated order.
    async fn update_order_status(
        &self,
        id: i64,
        status: OrderStatusType,
    ) -> Result<(OrderStatusType, Order), OrderManagementError>;

    /// Permanently removes the order and its items. Returns `false` if there was no such order.
    async fn delete_order(&self, id: i64) -> Result<bool, OrderManagementError>;

    async fn count_orders_with_status(&self, status: OrderStatusType) -> Result<i64, OrderManagementError>;
}
