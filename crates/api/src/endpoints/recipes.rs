//! Recipe catalog and upload endpoints.

use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
};
use recipehaven_common::{AppError, AppResult};
use recipehaven_core::{
    BrowseFilters, BrowsePage, RecipeCard, RecipeDetail, UploadImage, UploadRecipeInput,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create the recipes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(browse).post(upload))
        .route("/favorites", get(favorites))
        .route("/{id}", get(detail))
}

/// Browse query parameters. All filters combine with AND.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    pub category_id: Option<String>,
    pub ingredient: Option<String>,
    pub recipe_name: Option<String>,
}

/// Approved recipes matching the query.
async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<ApiResponse<BrowsePage>> {
    let filters = BrowseFilters {
        category_id: query.category_id,
        ingredient: query.ingredient,
        recipe_name: query.recipe_name,
    };

    let page = state.catalog_service.browse(&filters).await?;
    Ok(ApiResponse::ok(page))
}

/// A single recipe with comments and the viewer's flags.
async fn detail(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RecipeDetail>> {
    let detail = state.catalog_service.detail(&id, viewer.as_ref()).await?;
    Ok(ApiResponse::ok(detail))
}

/// The signed-in user's favorited recipes.
async fn favorites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<Vec<RecipeCard>>> {
    let recipes = state.catalog_service.my_favorites(&user.id).await?;
    Ok(ApiResponse::ok(recipes))
}

/// Upload response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: String,
    pub status: recipehaven_db::entities::recipe::RecipeStatus,
}

/// Upload a recipe via multipart form. It lands in the pending queue.
async fn upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let input = read_upload_form(multipart).await?;
    let recipe = state.recipe_service.upload(&user, input).await?;

    Ok(ApiResponse::ok(UploadResponse {
        id: recipe.id,
        status: recipe.status,
    }))
}

/// Collect the multipart form fields into an [`UploadRecipeInput`].
async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadRecipeInput> {
    let mut name = String::new();
    let mut description = String::new();
    let mut prep_time = String::new();
    let mut cook_time = String::new();
    let mut servings: Option<i32> = None;
    let mut category_id = String::new();
    let mut ingredients = String::new();
    let mut instructions = String::new();
    let mut image: Option<UploadImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let Some(field_name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid image upload: {e}")))?;
                if !file_name.is_empty() && !data.is_empty() {
                    image = Some(UploadImage {
                        file_name,
                        data: data.to_vec(),
                    });
                }
            }
            other => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid form field: {e}")))?;
                match other {
                    "name" => name = text,
                    "description" => description = text,
                    "prepTime" => prep_time = text,
                    "cookTime" => cook_time = text,
                    "servings" => {
                        servings = Some(text.trim().parse().map_err(|_| {
                            AppError::Validation(format!("Invalid servings value: {text}"))
                        })?);
                    }
                    "categoryId" => category_id = text,
                    "ingredients" => ingredients = text,
                    "instructions" => instructions = text,
                    _ => {}
                }
            }
        }
    }

    Ok(UploadRecipeInput {
        name,
        description,
        prep_time,
        cook_time,
        servings: servings
            .ok_or_else(|| AppError::Validation("Servings is required".to_string()))?,
        category_id,
        ingredients,
        instructions,
        image,
    })
}
