use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderStatusType},
    order_objects::OrderQueryFilter,
    sf_api::{
        errors::OrderApiError,
        pagination::{Page, Pagination},
    },
    traits::OrderManagement,
};

/// Read-only order access for staff: filtered listings, single orders and the pending-order count.
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi")
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Orders matching `filter`, newest first, cut into pages.
    pub async fn list_orders(
        &self,
        filter: OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<Page<Order>, OrderApiError> {
        trace!("📦 Listing orders. {filter}");
        let orders = self.db.search_orders(filter).await?;
        Ok(Page::paginate(orders, pagination))
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderApiError> {
        Ok(self.db.search_orders(OrderQueryFilter::default()).await?)
    }

    pub async fn order_by_id(&self, id: i64) -> Result<Order, OrderApiError> {
        self.db.fetch_order_by_id(id).await?.ok_or(OrderApiError::OrderNotFound(id))
    }

    pub async fn pending_count(&self) -> Result<i64, OrderApiError> {
        Ok(self.db.count_orders_with_status(OrderStatusType::Pending).await?)
    }
}
