//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success envelope for JSON endpoints.
///
/// Error responses carry the `{"error": {code, message}}` shape and are
/// produced by `AppError::into_response`, never by this type.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_serializes_data_only() {
        let response = ApiResponse::ok(serde_json::json!({"id": "r1"}));
        let body = serde_json::to_value(&response).unwrap();

        assert_eq!(body["data"]["id"], "r1");
        assert!(body.get("error").is_none());
    }
}
