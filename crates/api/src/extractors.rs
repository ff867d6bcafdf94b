//! Request extractors.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use recipehaven_common::AppError;
use recipehaven_db::entities::user;

/// Authenticated user extractor.
///
/// Rejections are [`AppError`] values, so the 401/403 bodies carry the
/// same JSON error envelope as every handler error.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the session middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// Admin-only extractor. Rejects non-admin sessions with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        if user.is_admin() {
            Ok(Self(user))
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;

    fn create_test_user(role: user::UserRole) -> user::Model {
        user::Model {
            id: "u1".to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            role,
            status: user::UserStatus::Active,
            joined_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_auth_user_missing() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();

        let result = AuthUser::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_auth_user_present() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();
        parts.extensions.insert(create_test_user(user::UserRole::User));

        let result = AuthUser::from_request_parts(&mut parts, &()).await;

        assert_eq!(result.unwrap().0.id, "u1");
    }

    #[tokio::test]
    async fn test_admin_user_rejects_regular_user() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();
        parts.extensions.insert(create_test_user(user::UserRole::User));

        let result = AdminUser::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_user_rejection_uses_error_envelope() {
        use axum::response::IntoResponse;

        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();
        parts.extensions.insert(create_test_user(user::UserRole::User));

        let rejection = AdminUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        let response = rejection.into_response();

        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap();
        assert_eq!(content_type, "application/json");
    }

    #[tokio::test]
    async fn test_admin_user_accepts_admin() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();
        parts
            .extensions
            .insert(create_test_user(user::UserRole::Admin));

        let result = AdminUser::from_request_parts(&mut parts, &()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_maybe_auth_user_absent() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();

        let result = MaybeAuthUser::from_request_parts(&mut parts, &()).await;

        assert!(result.unwrap().0.is_none());
    }
}
