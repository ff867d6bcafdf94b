//! Authentication endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use recipehaven_common::{AppError, AppResult};
use recipehaven_core::{AuthenticatedSession, LoginInput, RegisterInput};
use recipehaven_db::entities::user;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// The signed-in user, as returned by register and login.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    pub name: String,
    pub role: user::UserRole,
}

/// Register a new account and open a session.
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterInput>,
) -> AppResult<impl IntoResponse> {
    let session = state.account_service.register(req).await?;
    Ok(respond_with_session(&state, jar, session))
}

/// Log in to an existing account.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginInput>,
) -> AppResult<impl IntoResponse> {
    let session = state.account_service.login(req).await?;
    Ok(respond_with_session(&state, jar, session))
}

/// Logout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub ok: bool,
}

/// Tear down the current session and clear the cookie.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> AppResult<impl IntoResponse> {
    let Some(cookie) = jar.get(&state.session_cookie) else {
        return Err(AppError::Unauthorized);
    };
    state.account_service.logout(cookie.value()).await?;

    let jar = jar.remove(Cookie::from(state.session_cookie.clone()));
    Ok((jar, ApiResponse::ok(LogoutResponse { ok: true })))
}

fn respond_with_session(
    state: &AppState,
    jar: CookieJar,
    session: AuthenticatedSession,
) -> impl IntoResponse + use<> {
    let cookie = Cookie::build((state.session_cookie.clone(), session.token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (
        jar.add(cookie),
        ApiResponse::ok(SessionResponse {
            user_id: session.user.id,
            name: session.user.name,
            role: session.user.role,
        }),
    )
}
