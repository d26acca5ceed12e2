//! # Backend interfaces
//!
//! This module defines the contracts that the storefront engine depends on, but does not implement itself (apart from
//! the SQLite backend in [`crate::SqliteDatabase`]).
//!
//! * [`OrderManagement`] stores and retrieves orders and their frozen item snapshots, and mutates order status.
//! * [`CatalogManagement`] provides products and delivery locations.
//! * [`OrderGateway`] accepts finished order requests from checkout.
//! * [`ChatLauncher`] opens the chat deep link for the chat-handoff channel.
//! * [`TrafficFeed`] supplies visitor metrics that are merged into the analytics dashboard.
mod catalog_management;
mod order_gateway;
mod order_management;
mod traffic_feed;

pub use catalog_management::{CatalogError, CatalogManagement};
pub use order_gateway::{ChatLauncher, OrderGateway};
pub use order_management::{OrderManagement, OrderManagementError};
pub use traffic_feed::{NoTrafficFeed, TrafficFeed, TrafficFeedError, TrafficSummary};
