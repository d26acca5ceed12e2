//! Storefront Engine
//!
//! The storefront engine carries an order from a shopper's cart to the staff dashboard. It covers the cart, checkout
//! over three channels (cash on delivery, WhatsApp handoff and M-Pesa till payment), staff order management, customer
//! order tracking and the commerce analytics shown on the dashboard.
//!
//! The library is divided into two main sections:
//! 1. Persistence ([`mod@db`] and [`traits`]). The engine depends on the backend traits only. A SQLite backend is
//!    provided, and the data types it stores are defined in [`db_types`].
//! 2. The public API ([`mod@sf_api`]). Each API is created by handing it the backends it needs.
//!
//! The engine also publishes events when orders are created, change status or are deleted. See [`events`] for how
//! to hook into them.
mod db;

pub mod cart;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod sf_api;
pub mod store_config;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use sf_api::{
    admin_view::AdminOrderView,
    analytics_api::{AnalyticsApi, Dashboard},
    checkout_api::{CheckoutApi, LogChatLauncher},
    errors::{CheckoutError, OrderApiError, ValidationError},
    order_flow_api::OrderFlowApi,
    order_objects,
    order_query_api::OrderQueryApi,
    tracking_api::TrackingApi,
};
pub use store_config::StoreConfig;
