//! Interaction service: favorites, likes, ratings and comments.

use chrono::Utc;
use recipehaven_common::{AppError, AppResult, IdGenerator};
use recipehaven_db::{
    entities::{comment, user},
    repositories::{
        CommentRepository, FavoriteRepository, LikeRepository, RatingRepository, RecipeRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;
use tracing::info;

/// Longest accepted comment, in characters.
const MAX_COMMENT_LENGTH: usize = 1000;

/// Result of recording a rating.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingOutcome {
    /// The score the user just gave.
    pub score: i16,
    /// The recipe's new average, rounded to one decimal.
    pub average: f64,
}

/// Interaction service for the signed-in social features.
#[derive(Clone)]
pub struct InteractionService {
    recipe_repo: RecipeRepository,
    favorite_repo: FavoriteRepository,
    like_repo: LikeRepository,
    rating_repo: RatingRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl InteractionService {
    /// Create a new interaction service.
    #[must_use]
    pub const fn new(
        recipe_repo: RecipeRepository,
        favorite_repo: FavoriteRepository,
        like_repo: LikeRepository,
        rating_repo: RatingRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            recipe_repo,
            favorite_repo,
            like_repo,
            rating_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle a favorite, returning whether the recipe is now favorited.
    pub async fn toggle_favorite(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        self.require_recipe(recipe_id).await?;

        let favorited = self
            .favorite_repo
            .toggle(&self.id_gen.generate(), user_id, recipe_id)
            .await?;

        info!(user_id, recipe_id, favorited, "favorite toggled");
        Ok(favorited)
    }

    /// Toggle a like, returning `(liked_now, likes_count)`.
    pub async fn toggle_like(&self, user_id: &str, recipe_id: &str) -> AppResult<(bool, i32)> {
        let (liked, count) = self
            .like_repo
            .toggle(&self.id_gen.generate(), user_id, recipe_id)
            .await?;

        info!(user_id, recipe_id, liked, count, "like toggled");
        Ok((liked, count))
    }

    /// Record a 1-5 score; a repeat rating replaces the previous one.
    pub async fn rate(&self, user_id: &str, recipe_id: &str, score: i16) -> AppResult<RatingOutcome> {
        if !(1..=5).contains(&score) {
            return Err(AppError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let average = self
            .rating_repo
            .upsert(&self.id_gen.generate(), user_id, recipe_id, score)
            .await?;

        info!(user_id, recipe_id, score, average, "rating recorded");
        Ok(RatingOutcome { score, average })
    }

    /// Post a comment under a recipe.
    ///
    /// The author's display name is snapshotted onto the comment so it
    /// survives later profile changes.
    pub async fn post_comment(
        &self,
        author: &user::Model,
        recipe_id: &str,
        content: &str,
    ) -> AppResult<comment::Model> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment cannot exceed {MAX_COMMENT_LENGTH} characters"
            )));
        }

        self.require_recipe(recipe_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipe_id: Set(recipe_id.to_string()),
            user_id: Set(author.id.clone()),
            author_name: Set(author.name.clone()),
            content: Set(content.to_string()),
            posted_at: Set(Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        info!(comment_id = %comment.id, recipe_id, "comment posted");
        Ok(comment)
    }

    async fn require_recipe(&self, recipe_id: &str) -> AppResult<()> {
        self.recipe_repo
            .find_by_id(recipe_id)
            .await?
            .map(|_| ())
            .ok_or(AppError::RecipeNotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use recipehaven_db::entities::recipe;
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

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> InteractionService {
        InteractionService::new(
            RecipeRepository::new(Arc::clone(&db)),
            FavoriteRepository::new(Arc::clone(&db)),
            LikeRepository::new(Arc::clone(&db)),
            RatingRepository::new(Arc::clone(&db)),
            CommentRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_rate_out_of_range() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        assert!(matches!(
            service.rate("u1", "r1", 0).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.rate("u1", "r1", 6).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_post_comment_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service
            .post_comment(&create_test_author(), "r1", "   ")
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_post_comment_too_long() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let long = "x".repeat(MAX_COMMENT_LENGTH + 1);
        let result = service.post_comment(&create_test_author(), "r1", &long).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_toggle_favorite_missing_recipe() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.toggle_favorite("u1", "missing").await;

        assert!(matches!(result, Err(AppError::RecipeNotFound)));
    }
}
