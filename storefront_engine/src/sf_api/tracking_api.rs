//! Customer self-service order lookup.
//!
//! A customer searches by order number *or* by phone number. Matching orders are returned with a three-step timeline
//! (`Order Placed → Processing → Delivered`). `confirmed` and `dispatched` both show as "Processing", and a cancelled
//! order gets a cancellation banner instead of a position on the timeline.
//!
//! "No matching orders" is reported as [`TrackingOutcome::NotFound`]. That is a different state from
//! [`TrackingState::NotSearched`], which is what a page shows before the customer has searched at all.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderItem, OrderNumber, OrderStatusType, Shillings},
    helpers::phone_key,
    sf_api::errors::{OrderApiError, ValidationError},
    traits::OrderManagement,
};

//--------------------------------------    TrackingQuery    ----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingQuery {
    OrderNumber(String),
    Phone(String),
}

impl TrackingQuery {
    /// Builds a query from the two search inputs. Exactly one of them must be filled in; blank inputs count as empty.
    pub fn from_params(order_number: Option<String>, phone: Option<String>) -> Result<Self, ValidationError> {
        let order_number = order_number.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let phone = phone.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        match (order_number, phone) {
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousTrackingQuery),
            (Some(n), None) => Ok(Self::OrderNumber(n)),
            (None, Some(p)) => Ok(Self::Phone(p)),
            (None, None) => Err(ValidationError::EmptyTrackingQuery),
        }
    }
}

//--------------------------------------      Timeline       ----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineStep {
    Placed,
    Processing,
    Delivered,
}

impl TimelineStep {
    pub const ALL: [TimelineStep; 3] = [Self::Placed, Self::Processing, Self::Delivered];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Placed => "Order Placed",
            Self::Processing => "Processing",
            Self::Delivered => "Delivered",
        }
    }

    /// Where an order status sits on the customer timeline. Cancelled orders are not on it.
    pub fn for_status(status: OrderStatusType) -> Option<Self> {
        match status {
            OrderStatusType::Pending => Some(Self::Placed),
            OrderStatusType::Confirmed | OrderStatusType::Dispatched => Some(Self::Processing),
            OrderStatusType::Delivered => Some(Self::Delivered),
            OrderStatusType::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub step: TimelineStep,
    pub label: String,
    pub reached: bool,
    pub current: bool,
}

pub fn timeline(status: OrderStatusType) -> Vec<Milestone> {
    let current = TimelineStep::for_status(status);
    TimelineStep::ALL
        .iter()
        .map(|&step| {
            let reached = match current {
                Some(c) => step <= c,
                // A cancelled order was still placed
                None => step == TimelineStep::Placed,
            };
            Milestone { step, label: step.label().to_string(), reached, current: current == Some(step) }
        })
        .collect()
}

//--------------------------------------    TrackedOrder     ----------------------------------------------------------
/// The customer-facing summary of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedOrder {
    pub id: i64,
    pub order_number: OrderNumber,
    pub customer: String,
    pub phone: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Shillings,
    pub delivery_fee: Shillings,
    pub total: Shillings,
    pub location: Option<String>,
    pub address: String,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub timeline: Vec<Milestone>,
    pub cancelled: bool,
}

impl From<Order> for TrackedOrder {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            customer: order.customer.name,
            phone: order.customer.phone,
            items: order.items,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            total: order.total,
            location: order.delivery_location,
            address: order.delivery_address,
            status: order.status,
            created_at: order.created_at,
            timeline: timeline(order.status),
            cancelled: order.status == OrderStatusType::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingOutcome {
    Found(Vec<TrackedOrder>),
    NotFound,
}

/// The state of a tracking page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrackingState {
    #[default]
    NotSearched,
    Searching,
    Done(TrackingOutcome),
    /// The lookup failed. The customer may search again.
    Failed(String),
}

impl TrackingState {
    pub fn begin(&mut self) {
        *self = TrackingState::Searching;
    }

    pub fn finish(&mut self, result: Result<TrackingOutcome, OrderApiError>) {
        *self = match result {
            Ok(outcome) => TrackingState::Done(outcome),
            Err(e) => TrackingState::Failed(e.to_string()),
        };
    }
}

//--------------------------------------     TrackingApi     ----------------------------------------------------------
pub struct TrackingApi<B> {
    db: B,
}

impl<B> Debug for TrackingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrackingApi")
    }
}

impl<B> TrackingApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Looks up orders for a customer. A phone search returns every order placed with that number, newest first.
    pub async fn track(&self, query: TrackingQuery) -> Result<TrackingOutcome, OrderApiError> {
        let orders = match &query {
            TrackingQuery::OrderNumber(n) => {
                let number = OrderNumber(n.trim_start_matches('#').trim().to_string());
                self.db.fetch_order_by_number(&number).await?.into_iter().collect::<Vec<_>>()
            },
            TrackingQuery::Phone(p) => {
                let key = phone_key(p);
                if key.is_empty() {
                    vec![]
                } else {
                    self.db.fetch_orders_by_phone(&key).await?
                }
            },
        };
        debug!("📦 Tracking lookup {query:?} found {} orders", orders.len());
        if orders.is_empty() {
            Ok(TrackingOutcome::NotFound)
        } else {
            Ok(TrackingOutcome::Found(orders.into_iter().map(TrackedOrder::from).collect()))
        }
    }

    /// Runs a lookup and records the result in `state`.
    pub async fn search(&self, state: &mut TrackingState, query: TrackingQuery) {
        state.begin();
        let result = self.track(query).await;
        state.finish(result);
    }
}
