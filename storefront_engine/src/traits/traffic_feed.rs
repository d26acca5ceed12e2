use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Traffic feed is unavailable: {0}")]
pub struct TrafficFeedError(pub String);

/// Visitor metrics for the analytics dashboard. These come from an outside analytics service and are passed through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSummary {
    pub page_views: u64,
    pub unique_visitors: u64,
    pub devices: BTreeMap<String, u64>,
    pub referrers: BTreeMap<String, u64>,
}

#[allow(async_fn_in_trait)]
pub trait TrafficFeed {
    async fn traffic_summary(&self, days: u32) -> Result<TrafficSummary, TrafficFeedError>;
}

/// Used when no analytics service is configured. Always reports zero traffic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrafficFeed;

impl TrafficFeed for NoTrafficFeed {
    async fn traffic_summary(&self, _days: u32) -> Result<TrafficSummary, TrafficFeedError> {
        Ok(TrafficSummary::default())
    }
}
