use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_engine::{
    db_types::{Channel, OrderStatusType},
    order_objects::{OrderQueryFilter, StatusChange},
    sf_api::{analytics::DashboardPages, pagination::Pagination},
    ValidationError,
};

use crate::errors::ServerError;

/// `GET /api/track` query. Exactly one of the two fields must be given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackParams {
    pub order_number: Option<String>,
    pub phone: Option<String>,
}

/// `GET /api/admin/orders` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminOrdersParams {
    /// Comma-separated list of statuses, e.g. `pending,confirmed`
    pub status: Option<String>,
    pub channel: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl AdminOrdersParams {
    pub fn into_query(self) -> Result<(OrderQueryFilter, Pagination), ServerError> {
        let mut filter = OrderQueryFilter::default();
        if let Some(statuses) = self.status.as_deref() {
            for s in statuses.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let status = s.parse::<OrderStatusType>().map_err(|_| ValidationError::InvalidStatus(s.to_string()))?;
                filter = filter.with_status(status);
            }
        }
        if let Some(channel) = self.channel.as_deref().filter(|c| !c.is_empty()) {
            let channel = channel.parse::<Channel>().map_err(|e| ServerError::InvalidQuery(e.to_string()))?;
            filter = filter.with_channel(channel);
        }
        if let Some(since) = self.since {
            filter = filter.since(since);
        }
        if let Some(until) = self.until {
            filter = filter.until(until);
        }
        if let Some(search) = self.search.filter(|s| !s.trim().is_empty()) {
            filter = filter.with_search(search.trim());
        }
        Ok((filter, Pagination::new(self.page, self.per_page)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub old: OrderStatusType,
    pub new: OrderStatusType,
    pub backwards: bool,
}

impl From<StatusChange> for StatusUpdateResponse {
    fn from(change: StatusChange) -> Self {
        Self { success: true, old: change.old, new: change.new, backwards: change.backwards }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOrdersRequest {
    pub ids: Vec<i64>,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCount {
    pub pending: i64,
}

/// `GET /api/admin/analytics` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsParams {
    pub days: Option<u32>,
    pub top_page: Option<usize>,
    pub activity_page: Option<usize>,
    pub per_page: Option<usize>,
}

impl AnalyticsParams {
    pub fn pages(&self) -> DashboardPages {
        DashboardPages {
            top_products: Pagination::new(self.top_page, self.per_page),
            activity: Pagination::new(self.activity_page, self.per_page),
        }
    }
}
