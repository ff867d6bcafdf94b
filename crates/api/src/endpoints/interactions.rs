//! Social interaction endpoints: favorites, likes, ratings and comments.

use axum::{Json, Router, extract::State, routing::post};
use recipehaven_common::AppResult;
use recipehaven_core::RatingOutcome;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create the interactions router. Nested under `/recipes`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle-favorite", post(toggle_favorite))
        .route("/toggle-like", post(toggle_like))
        .route("/rate", post(rate))
        .route("/comments", post(post_comment))
}

/// Request naming a target recipe.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeTarget {
    pub recipe_id: String,
}

/// Favorite toggle response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub favorited: bool,
}

/// Toggle the signed-in user's favorite on a recipe.
async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<RecipeTarget>,
) -> AppResult<ApiResponse<FavoriteResponse>> {
    let favorited = state
        .interaction_service
        .toggle_favorite(&user.id, &req.recipe_id)
        .await?;

    Ok(ApiResponse::ok(FavoriteResponse { favorited }))
}

/// Like toggle response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub likes_count: i32,
}

/// Toggle the signed-in user's like on a recipe.
async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<RecipeTarget>,
) -> AppResult<ApiResponse<LikeResponse>> {
    let (liked, likes_count) = state
        .interaction_service
        .toggle_like(&user.id, &req.recipe_id)
        .await?;

    Ok(ApiResponse::ok(LikeResponse { liked, likes_count }))
}

/// Rating request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub recipe_id: String,
    pub score: i16,
}

/// Record a 1-5 rating; repeats replace the previous score.
async fn rate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<RateRequest>,
) -> AppResult<ApiResponse<RatingOutcome>> {
    let outcome = state
        .interaction_service
        .rate(&user.id, &req.recipe_id, req.score)
        .await?;

    Ok(ApiResponse::ok(outcome))
}

/// Comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub recipe_id: String,
    pub content: String,
}

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub author_name: String,
    pub content: String,
    pub posted_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Post a comment under a recipe.
async fn post_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .interaction_service
        .post_comment(&user, &req.recipe_id, &req.content)
        .await?;

    Ok(ApiResponse::ok(CommentResponse {
        id: comment.id,
        author_name: comment.author_name,
        content: comment.content,
        posted_at: comment.posted_at,
    }))
}
