//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use recipehaven_core::{
    AccountService, AdminService, CatalogService, InteractionService, RecipeService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub catalog_service: CatalogService,
    pub recipe_service: RecipeService,
    pub interaction_service: InteractionService,
    pub admin_service: AdminService,
    /// Name of the session cookie, from [`recipehaven_common::Config`].
    pub session_cookie: String,
}

/// Session middleware.
///
/// Resolves the session cookie to a user and stashes the model in request
/// extensions. Requests with no cookie, an expired session or a suspended
/// account simply proceed anonymously; handlers that need a user reject
/// through the extractors.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    if let Some(cookie) = jar.get(&state.session_cookie)
        && let Ok(user) = state.account_service.authenticate(cookie.value()).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
