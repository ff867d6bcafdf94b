//! Recipe service: upload and moderation lifecycle.

use chrono::Utc;
use recipehaven_common::{AppError, AppResult, IdGenerator, LocalStorage};
use recipehaven_db::{
    entities::{recipe, recipe::RecipeStatus, user},
    repositories::{CategoryRepository, RecipeRepository},
};
use sea_orm::Set;
use tracing::info;
use validator::Validate;

/// Image file extensions accepted for recipe photos.
const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Segment separator used by the upload form for ingredients and steps.
const SEGMENT_SEPARATOR: &str = "|||";

/// An uploaded image file.
#[derive(Debug, Clone)]
pub struct UploadImage {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Input for uploading a recipe.
///
/// Times arrive as the form strings (`"30"` or `"30 min"`); ingredients and
/// instructions arrive `|||`-separated.
#[derive(Debug, Clone, Validate)]
pub struct UploadRecipeInput {
    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    #[validate(range(min = 1, max = 100, message = "Servings must be between 1 and 100"))]
    pub servings: i32,
    pub category_id: String,
    pub ingredients: String,
    pub instructions: String,
    pub image: Option<UploadImage>,
}

/// Recipe service for uploads and admin moderation.
#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    category_repo: CategoryRepository,
    storage: LocalStorage,
    id_gen: IdGenerator,
}

impl RecipeService {
    /// Create a new recipe service.
    #[must_use]
    pub const fn new(
        recipe_repo: RecipeRepository,
        category_repo: CategoryRepository,
        storage: LocalStorage,
    ) -> Self {
        Self {
            recipe_repo,
            category_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Store an uploaded recipe in the pending queue.
    pub async fn upload(
        &self,
        author: &user::Model,
        input: UploadRecipeInput,
    ) -> AppResult<recipe::Model> {
        input.validate()?;

        let prep_time = parse_minutes(&input.prep_time)?;
        let cook_time = parse_minutes(&input.cook_time)?;

        let ingredients = split_segments(&input.ingredients);
        if ingredients.is_empty() {
            return Err(AppError::Validation(
                "At least one ingredient is required".to_string(),
            ));
        }

        let instructions = split_segments(&input.instructions);
        if instructions.is_empty() {
            return Err(AppError::Validation(
                "At least one instruction step is required".to_string(),
            ));
        }

        if self
            .category_repo
            .find_by_id(&input.category_id)
            .await?
            .is_none()
        {
            return Err(AppError::Validation("Unknown category".to_string()));
        }

        let id = self.id_gen.generate();

        let image_url = match &input.image {
            Some(image) => {
                let ext = image_extension(&image.file_name)?;
                let stored = self
                    .storage
                    .store(&format!("{id}.{ext}"), &image.data)
                    .await?;
                Some(stored.url)
            }
            None => None,
        };

        let model = recipe::ActiveModel {
            id: Set(id),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description.trim().to_string()),
            prep_time: Set(prep_time),
            cook_time: Set(cook_time),
            servings: Set(input.servings),
            category_id: Set(input.category_id),
            image_url: Set(image_url),
            ingredients: Set(serde_json::json!(ingredients)),
            instructions: Set(serde_json::json!(instructions)),
            status: Set(RecipeStatus::Pending),
            author_id: Set(Some(author.id.clone())),
            is_featured: Set(false),
            likes_count: Set(0),
            average_rating: Set(0.0),
            created_at: Set(Utc::now().into()),
        };

        let recipe = self.recipe_repo.create(model).await?;
        info!(recipe_id = %recipe.id, author_id = %author.id, "recipe uploaded");
        Ok(recipe)
    }

    /// Approve a pending recipe, making it publicly visible.
    pub async fn approve(&self, recipe_id: &str) -> AppResult<recipe::Model> {
        let recipe = self
            .recipe_repo
            .set_status(recipe_id, RecipeStatus::Approved)
            .await?;
        info!(recipe_id = %recipe.id, "recipe approved");
        Ok(recipe)
    }

    /// Reject a recipe. The row is kept but hidden from the catalog.
    pub async fn reject(&self, recipe_id: &str) -> AppResult<recipe::Model> {
        let recipe = self
            .recipe_repo
            .set_status(recipe_id, RecipeStatus::Rejected)
            .await?;
        info!(recipe_id = %recipe.id, "recipe rejected");
        Ok(recipe)
    }

    /// Delete a recipe along with its stored image.
    pub async fn delete(&self, recipe_id: &str) -> AppResult<()> {
        let recipe = self
            .recipe_repo
            .find_by_id(recipe_id)
            .await?
            .ok_or(AppError::RecipeNotFound)?;

        if let Some(file_name) = recipe.image_url.as_deref().and_then(stored_file_name) {
            self.storage.delete(file_name).await?;
        }

        self.recipe_repo.delete(&recipe.id).await?;
        info!(recipe_id = %recipe.id, "recipe deleted");
        Ok(())
    }

    /// Flip a recipe's featured flag, returning the updated model.
    pub async fn toggle_featured(&self, recipe_id: &str) -> AppResult<recipe::Model> {
        let recipe = self
            .recipe_repo
            .find_by_id(recipe_id)
            .await?
            .ok_or(AppError::RecipeNotFound)?;

        let recipe = self
            .recipe_repo
            .set_featured(&recipe.id, !recipe.is_featured)
            .await?;
        info!(recipe_id = %recipe.id, featured = recipe.is_featured, "featured toggled");
        Ok(recipe)
    }
}

/// Parse a duration form field such as `"30"` or `"30 min"` into minutes.
fn parse_minutes(value: &str) -> AppResult<i32> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_suffix("mins")
        .or_else(|| trimmed.strip_suffix("min"))
        .unwrap_or(trimmed)
        .trim();

    let minutes: i32 = digits
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid time value: {value}")))?;

    if minutes < 0 {
        return Err(AppError::Validation(format!(
            "Time cannot be negative: {value}"
        )));
    }

    Ok(minutes)
}

/// Split a `|||`-separated form field, dropping blank segments.
fn split_segments(value: &str) -> Vec<String> {
    value
        .split(SEGMENT_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Lowercased extension of an uploaded image, checked against the allow-list.
fn image_extension(file_name: &str) -> AppResult<String> {
    let ext = file_name
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::Validation(format!(
            "Unsupported image type: {file_name}"
        )))
    }
}

/// File name component of a stored image URL.
fn stored_file_name(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use recipehaven_db::entities::category;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_author() -> user::Model {
        user::Model {
            id: "u1".to_string(),
            name: "Cook".to_string(),
            email: "cook@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: user::UserRole::User,
            status: user::UserStatus::Active,
            joined_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_input() -> UploadRecipeInput {
        UploadRecipeInput {
            name: "Pancakes".to_string(),
            description: "Fluffy pancakes".to_string(),
            prep_time: "10 min".to_string(),
            cook_time: "15".to_string(),
            servings: 4,
            category_id: "c1".to_string(),
            ingredients: "2 eggs|||1 cup flour".to_string(),
            instructions: "Mix|||Fry".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_parse_minutes_plain_number() {
        assert_eq!(parse_minutes("30").unwrap(), 30);
    }

    #[test]
    fn test_parse_minutes_with_suffix() {
        assert_eq!(parse_minutes("30 min").unwrap(), 30);
        assert_eq!(parse_minutes("45 mins").unwrap(), 45);
        assert_eq!(parse_minutes(" 5min ").unwrap(), 5);
    }

    #[test]
    fn test_parse_minutes_malformed() {
        assert!(matches!(
            parse_minutes("half an hour"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(parse_minutes(""), Err(AppError::Validation(_))));
        assert!(matches!(parse_minutes("-5"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_split_segments() {
        assert_eq!(
            split_segments("2 eggs||| 1 cup flour |||"),
            vec!["2 eggs".to_string(), "1 cup flour".to_string()]
        );
        assert!(split_segments("").is_empty());
        assert!(split_segments("|||  |||").is_empty());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("photo.JPG").unwrap(), "jpg");
        assert_eq!(image_extension("dish.webp").unwrap(), "webp");
        assert!(matches!(
            image_extension("script.exe"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_stored_file_name() {
        assert_eq!(stored_file_name("/images/abc.jpg"), Some("abc.jpg"));
        assert_eq!(stored_file_name("abc.jpg"), Some("abc.jpg"));
        assert_eq!(stored_file_name("/images/"), None);
    }

    #[tokio::test]
    async fn test_upload_unknown_category() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .into_connection(),
        );

        let service = RecipeService::new(
            RecipeRepository::new(Arc::clone(&db)),
            CategoryRepository::new(db),
            LocalStorage::new("/tmp/recipehaven-test-images", "/images"),
        );

        let result = service.upload(&create_test_author(), create_test_input()).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_rejects_malformed_time() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = RecipeService::new(
            RecipeRepository::new(Arc::clone(&db)),
            CategoryRepository::new(db),
            LocalStorage::new("/tmp/recipehaven-test-images", "/images"),
        );

        let mut input = create_test_input();
        input.prep_time = "a while".to_string();

        let result = service.upload(&create_test_author(), input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
