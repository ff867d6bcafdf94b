//! Admin endpoints: dashboard, moderation of recipes, users and comments.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use recipehaven_common::AppResult;
use recipehaven_core::{AdminCommentView, AdminRecipeList, AdminUserList, DashboardStats};
use recipehaven_db::entities::recipe::RecipeStatus;
use serde::Serialize;

use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

/// Create the admin router. Every route requires an admin session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/recipes", get(list_recipes))
        .route("/recipes/{id}/approve", post(approve_recipe))
        .route("/recipes/{id}/reject", post(reject_recipe))
        .route("/recipes/{id}/delete", post(delete_recipe))
        .route("/recipes/{id}/toggle-feature", post(toggle_feature))
        .route("/users", get(list_users))
        .route("/users/{id}/suspend", post(suspend_user))
        .route("/users/{id}/activate", post(activate_user))
        .route("/users/{id}/delete", post(delete_user))
        .route("/comments", get(list_comments))
        .route("/comments/{id}/delete", post(delete_comment))
}

/// Aggregated dashboard statistics.
async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<ApiResponse<DashboardStats>> {
    let stats = state.admin_service.dashboard().await?;
    Ok(ApiResponse::ok(stats))
}

/// The pending queue and the full recipe table.
async fn list_recipes(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<ApiResponse<AdminRecipeList>> {
    let recipes = state.admin_service.list_recipes().await?;
    Ok(ApiResponse::ok(recipes))
}

/// Moderation response carrying the recipe's new status.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResponse {
    pub id: String,
    pub status: RecipeStatus,
}

/// Approve a pending recipe.
async fn approve_recipe(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ModerationResponse>> {
    let recipe = state.recipe_service.approve(&id).await?;
    Ok(ApiResponse::ok(ModerationResponse {
        id: recipe.id,
        status: recipe.status,
    }))
}

/// Reject a recipe; the row is kept but hidden.
async fn reject_recipe(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ModerationResponse>> {
    let recipe = state.recipe_service.reject(&id).await?;
    Ok(ApiResponse::ok(ModerationResponse {
        id: recipe.id,
        status: recipe.status,
    }))
}

/// Empty ok response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkResponse {
    pub ok: bool,
}

/// Delete a recipe and its image.
async fn delete_recipe(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.recipe_service.delete(&id).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// Featured toggle response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureResponse {
    pub id: String,
    pub is_featured: bool,
}

/// Flip a recipe's featured flag.
async fn toggle_feature(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<FeatureResponse>> {
    let recipe = state.recipe_service.toggle_featured(&id).await?;
    Ok(ApiResponse::ok(FeatureResponse {
        id: recipe.id,
        is_featured: recipe.is_featured,
    }))
}

/// All users with contribution counts and status tallies.
async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<ApiResponse<AdminUserList>> {
    let users = state.admin_service.list_users().await?;
    Ok(ApiResponse::ok(users))
}

/// Suspend a user and drop their sessions.
async fn suspend_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.admin_service.suspend_user(&id).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// Reactivate a suspended user.
async fn activate_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.admin_service.activate_user(&id).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// Delete a user; their recipes stay with the author cleared.
async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.admin_service.delete_user(&id).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// All comments for the moderation table.
async fn list_comments(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<ApiResponse<Vec<AdminCommentView>>> {
    let comments = state.admin_service.list_comments().await?;
    Ok(ApiResponse::ok(comments))
}

/// Delete a single comment.
async fn delete_comment(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.admin_service.delete_comment(&id).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}
