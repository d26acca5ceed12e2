use std::{collections::BTreeSet, fmt::Debug};

use chrono::Utc;
use log::*;

use crate::{
    db_types::{Order, OrderStatusType},
    events::{EventProducers, OrderCreatedEvent, OrderStatusChangedEvent, OrdersDeletedEvent},
    helpers::new_order_number,
    order_objects::{DeletionReport, OrderCreated, OrderRequest, StatusChange},
    sf_api::errors::{OrderApiError, ValidationError},
    store_config::StoreConfig,
    traits::{OrderGateway, OrderManagement, OrderManagementError},
};

/// How many fresh order numbers to try before giving up on an insert.
pub const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

/// `OrderFlowApi` owns every write to an order: creation, status changes and deletion.
///
/// Status changes are deliberately unrestricted. Staff may move an order from any status to any other; moves that go
/// backwards are logged and flagged in the returned [`StatusChange`] but are not refused.
pub struct OrderFlowApi<B> {
    db: B,
    config: StoreConfig,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, config: StoreConfig, producers: EventProducers) -> Self {
        Self { db, config, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Validates and stores a new order. The order always starts out as `pending`.
    ///
    /// A fresh order number is generated for each attempt. If the number is already taken, another is tried, up to
    /// [`MAX_ORDER_NUMBER_ATTEMPTS`] times. Identical submissions are *not* deduplicated.
    pub async fn create_order(&self, request: OrderRequest) -> Result<OrderCreated, OrderApiError> {
        request.validate(&self.config)?;
        let channel = request.ordered_via;
        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let number = new_order_number(&self.config.order_number_prefix, Utc::now());
            let new_order = request.clone().into_new_order(number.clone());
            match self.db.insert_order(new_order).await {
                Ok(order) => {
                    info!("📦 New {channel} order {} for {} stored with id {}", order.order_number, order.total, order.id);
                    let created = OrderCreated { order_number: order.order_number.clone(), order_id: order.id };
                    self.producers.publish_order_created(OrderCreatedEvent::new(order)).await;
                    return Ok(created);
                },
                Err(OrderManagementError::DuplicateOrderNumber(n)) => {
                    debug!("📦 Order number {n} is taken (attempt {attempt}). Trying another.");
                },
                Err(e) => return Err(e.into()),
            }
        }
        error!("📦 Gave up looking for a free order number after {MAX_ORDER_NUMBER_ATTEMPTS} attempts");
        Err(OrderApiError::OrderNumberExhausted(MAX_ORDER_NUMBER_ATTEMPTS))
    }

    /// Overwrites the status of an order. Returns the old and new status only once the write has been acknowledged.
    ///
    /// Any status may follow any other. Setting the status an order already has is a harmless no-op write.
    pub async fn set_status(&self, order_id: i64, new_status: OrderStatusType) -> Result<StatusChange, OrderApiError> {
        let (old_status, order) = self.db.update_order_status(order_id, new_status).await?;
        let change = StatusChange::new(order_id, old_status, new_status);
        if change.backwards {
            warn!(
                "📦 Order {} was moved backwards from {old_status} to {new_status}. Make sure this was intended.",
                order.order_number
            );
        } else {
            info!("📦 Order {} status changed from {old_status} to {new_status}", order.order_number);
        }
        let event = OrderStatusChangedEvent::new(old_status, order, change.backwards);
        self.producers.publish_status_changed(event).await;
        Ok(change)
    }

    /// Convenience wrapper for the admin surface, where statuses arrive as strings.
    pub async fn set_status_str(&self, order_id: i64, new_status: &str) -> Result<StatusChange, OrderApiError> {
        let status = new_status
            .parse::<OrderStatusType>()
            .map_err(|_| ValidationError::InvalidStatus(new_status.to_string()))?;
        self.set_status(order_id, status).await
    }

    /// Permanently deletes orders. This cannot be undone, so `confirmed` must be true.
    ///
    /// Each order is deleted independently. Failures do not stop the batch; they are counted in the report instead.
    pub async fn delete_orders(&self, ids: &[i64], confirmed: bool) -> Result<DeletionReport, OrderApiError> {
        if !confirmed {
            return Err(ValidationError::DeletionNotConfirmed.into());
        }
        let unique = ids.iter().copied().collect::<BTreeSet<i64>>();
        let mut report = DeletionReport { requested: unique.len(), ..Default::default() };
        for id in unique {
            match self.db.delete_order(id).await {
                Ok(true) => report.deleted_ids.push(id),
                Ok(false) => {
                    debug!("📦 Order #{id} was not deleted because it does not exist");
                    report.failed_ids.push(id);
                },
                Err(e) => {
                    warn!("📦 Could not delete order #{id}. {e}");
                    report.failed_ids.push(id);
                },
            }
        }
        report.deleted = report.deleted_ids.len();
        report.failed = report.failed_ids.len();
        info!("📦 Deleted {} of {} orders. {} failed.", report.deleted, report.requested, report.failed);
        if report.deleted > 0 {
            let event = OrdersDeletedEvent { ids: report.deleted_ids.clone() };
            self.producers.publish_orders_deleted(event).await;
        }
        Ok(report)
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<Order, OrderApiError> {
        self.db.fetch_order_by_id(order_id).await?.ok_or(OrderApiError::OrderNotFound(order_id))
    }
}

impl<B> OrderGateway for OrderFlowApi<B>
where B: OrderManagement
{
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderCreated, OrderApiError> {
        self.create_order(request).await
    }
}
