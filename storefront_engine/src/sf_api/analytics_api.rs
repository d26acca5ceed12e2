use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    sf_api::{
        analytics::{aggregate, CommerceMetrics, DashboardPages},
        errors::OrderApiError,
    },
    traits::{CatalogManagement, OrderManagement, TrafficFeed, TrafficSummary},
};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// The staff dashboard: visitor traffic from the external feed, side by side with the commerce metrics derived from
/// the orders and products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Lookback window for the traffic figures
    pub days: u32,
    pub traffic: TrafficSummary,
    /// False if the traffic feed could not be reached. Traffic figures are zero in that case.
    pub traffic_available: bool,
    pub commerce: CommerceMetrics,
}

pub struct AnalyticsApi<B, C, T> {
    orders: B,
    catalog: C,
    traffic: T,
}

impl<B, C, T> Debug for AnalyticsApi<B, C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnalyticsApi")
    }
}

impl<B, C, T> AnalyticsApi<B, C, T>
where
    B: OrderManagement,
    C: CatalogManagement,
    T: TrafficFeed,
{
    pub fn new(orders: B, catalog: C, traffic: T) -> Self {
        Self { orders, catalog, traffic }
    }

    /// Builds the dashboard from fresh snapshots of all orders and products. Commerce metrics always cover the full
    /// order history; `days` only applies to the traffic feed.
    pub async fn dashboard(
        &self,
        days: Option<u32>,
        pages: DashboardPages,
        now: DateTime<Utc>,
    ) -> Result<Dashboard, OrderApiError> {
        let days = days.filter(|d| *d > 0).unwrap_or(DEFAULT_LOOKBACK_DAYS);
        let orders = self.orders.search_orders(Default::default()).await?;
        let products = self.catalog.fetch_products().await?;
        trace!("📊 Aggregating {} orders over {} products", orders.len(), products.len());
        let commerce = aggregate(&orders, &products, now, pages);
        let (traffic, traffic_available) = match self.traffic.traffic_summary(days).await {
            Ok(summary) => (summary, true),
            Err(e) => {
                warn!("📊 Showing the dashboard without traffic figures. {e}");
                (TrafficSummary::default(), false)
            },
        };
        Ok(Dashboard { days, traffic, traffic_available, commerce })
    }
}
