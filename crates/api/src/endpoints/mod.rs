//! API endpoints.

mod admin;
mod auth;
mod interactions;
mod recipes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/recipes", recipes::router().merge(interactions::router()))
        .nest("/admin", admin::router())
}
