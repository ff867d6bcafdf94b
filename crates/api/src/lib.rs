//! HTTP API layer for recipehaven.
//!
//! This crate provides the JSON API:
//!
//! - **Endpoints**: auth, catalog, uploads, interactions and admin routes
//! - **Extractors**: session-based authentication
//! - **Middleware**: session cookie resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
