//! # Storefront engine public API
//!
//! The `sf_api` module exposes the order pipeline of the storefront. Like the backends, the API is split up so that
//! each surface only needs the collaborators it actually uses.
//!
//! * [`checkout_api`] turns a cart and checkout form into an order, through the website, WhatsApp or M-Pesa channel.
//! * [`order_flow_api`] owns every write to an order: creation, staff status changes and bulk deletion.
//! * [`order_query_api`] provides filtered, paginated order listings for staff.
//! * [`tracking_api`] is the customer's read-only order lookup by order number or phone number.
//! * [`analytics_api`] builds the staff dashboard from the [`analytics`] aggregations and the external traffic feed.
//! * [`admin_view`] keeps the staff order list in step with acknowledged writes.
//!
//! The other submodules hold the request and response types shared by these APIs.
//!
//! # API usage
//!
//! Every API is created by supplying the backends it depends on:
//!
//! ```rust,ignore
//! use storefront_engine::{OrderQueryApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/storefront.db", 5).await?;
//! // SqliteDatabase implements OrderManagement
//! let api = OrderQueryApi::new(db);
//! let pending = api.pending_count().await?;
//! ```

pub mod admin_view;
pub mod analytics;
pub mod analytics_api;
pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod order_query_api;
pub mod pagination;
pub mod tracking_api;

#[cfg(test)]
pub(crate) mod test_mocks;
