//! # Storefront server
//! This module hosts the HTTP surface of the storefront. It is responsible for:
//! Accepting orders from checkout and validating them before they are stored.
//! Answering customer tracking lookups by order number or phone.
//! Serving the staff order list, status updates, bulk deletion, the pending-order badge and the analytics dashboard.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders`, `/api/track`, `/api/delivery_locations`: Public routes used by the storefront.
//! * `/api/admin/...`: Staff routes. These require the `sf_admin_token` header.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod middleware;
pub mod pending_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
