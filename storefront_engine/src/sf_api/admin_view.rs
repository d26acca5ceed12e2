//! The staff-side list of orders currently on screen.
//!
//! The view only ever echoes writes that the backend has acknowledged. A failed status update leaves the displayed
//! status exactly as it was, and a partially failed bulk delete removes only the orders that were actually deleted.
use log::*;

use crate::{
    db_types::{Order, OrderStatusType},
    order_objects::{DeletionReport, OrderQueryFilter, StatusChange},
    sf_api::{
        errors::OrderApiError,
        order_flow_api::OrderFlowApi,
        order_query_api::OrderQueryApi,
        pagination::{Page, Pagination},
    },
    traits::OrderManagement,
};

#[derive(Debug, Clone, Default)]
pub struct AdminOrderView {
    orders: Vec<Order>,
    page: usize,
    total_pages: usize,
    total_items: usize,
}

impl AdminOrderView {
    pub fn new(orders: Vec<Order>) -> Self {
        let total_items = orders.len();
        Self { orders, page: 1, total_pages: 1, total_items }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn order(&self, id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn displayed_status(&self, id: i64) -> Option<OrderStatusType> {
        self.order(id).map(|o| o.status)
    }

    /// Replaces the displayed orders with a fresh page from the backend. On failure the current list is kept.
    pub async fn load<B: OrderManagement>(
        &mut self,
        api: &OrderQueryApi<B>,
        filter: OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<(), OrderApiError> {
        let Page { items, page, total_pages, total_items, .. } = api.list_orders(filter, pagination).await?;
        self.orders = items;
        self.page = page;
        self.total_pages = total_pages;
        self.total_items = total_items;
        Ok(())
    }

    /// Sends the status change and, once it is acknowledged, shows the new status.
    pub async fn set_status<B: OrderManagement>(
        &mut self,
        api: &OrderFlowApi<B>,
        id: i64,
        status: OrderStatusType,
    ) -> Result<StatusChange, OrderApiError> {
        let change = api.set_status(id, status).await.map_err(|e| {
            warn!("📦 Status of order #{id} is unchanged. {e}");
            e
        })?;
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == id) {
            order.status = change.new;
        }
        Ok(change)
    }

    /// Deletes the orders and drops those that are gone from the view.
    pub async fn delete<B: OrderManagement>(
        &mut self,
        api: &OrderFlowApi<B>,
        ids: &[i64],
        confirmed: bool,
    ) -> Result<DeletionReport, OrderApiError> {
        let report = api.delete_orders(ids, confirmed).await?;
        self.orders.retain(|o| !report.deleted_ids.contains(&o.id));
        self.total_items = self.total_items.saturating_sub(report.deleted);
        Ok(report)
    }
}
