//! HTTP API layer for templatehub.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, catalog, orders/payment, reviews
//! - **Extractors**: authenticated identity and role checks
//! - **Middleware**: bearer-token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
