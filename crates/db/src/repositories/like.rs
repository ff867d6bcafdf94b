//! Like repository.

use std::sync::Arc;

use crate::entities::{Like, Recipe, like, recipe};
use chrono::Utc;
use recipehaven_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};

/// Like repository for database operations.
///
/// `recipe.likes_count` is derived from like rows, so the toggle runs the
/// row mutation and the counter write in one transaction.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and recipe.
    pub async fn find_by_user_and_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked a recipe.
    pub async fn has_liked(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_recipe(user_id, recipe_id)
            .await?
            .is_some())
    }

    /// Toggle a like and adjust the recipe's counter atomically.
    ///
    /// Returns `(liked_now, likes_count)` after the toggle. The counter
    /// never drops below zero.
    pub async fn toggle(&self, id: &str, user_id: &str, recipe_id: &str) -> AppResult<(bool, i32)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let recipe = Recipe::find_by_id(recipe_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or(AppError::RecipeNotFound)?;

        let existing = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::RecipeId.eq(recipe_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let (liked_now, count) = match existing {
            Some(row) => {
                row.delete(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                (false, (recipe.likes_count - 1).max(0))
            }
            None => {
                let model = like::ActiveModel {
                    id: Set(id.to_string()),
                    user_id: Set(user_id.to_string()),
                    recipe_id: Set(recipe_id.to_string()),
                    created_at: Set(Utc::now().into()),
                };
                model
                    .insert(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                (true, recipe.likes_count + 1)
            }
        };

        let mut active: recipe::ActiveModel = recipe.into();
        active.likes_count = Set(count);
        active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((liked_now, count))
    }

    /// Count likes on a recipe.
    pub async fn count_by_recipe(&self, recipe_id: &str) -> AppResult<u64> {
        Like::find()
            .filter(like::Column::RecipeId.eq(recipe_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn create_test_like(id: &str, user_id: &str, recipe_id: &str) -> like::Model {
        like::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            recipe_id: recipe_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_recipe(id: &str, likes_count: i32) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            name: "Cake".to_string(),
            description: String::new(),
            prep_time: 10,
            cook_time: 20,
            servings: 2,
            category_id: "c1".to_string(),
            image_url: None,
            ingredients: json!([]),
            instructions: json!([]),
            status: recipe::RecipeStatus::Approved,
            author_id: None,
            is_featured: false,
            likes_count,
            average_rating: 0.0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_has_liked_true() {
        let like = create_test_like("l1", "u1", "r1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.has_liked("u1", "r1").await.unwrap();

        assert!(result);
    }

    #[tokio::test]
    async fn test_has_liked_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<like::Model>::new()])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.has_liked("u1", "r2").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_toggle_missing_recipe() {
        use crate::entities::recipe;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.toggle("l1", "u1", "missing").await;

        assert!(matches!(result, Err(AppError::RecipeNotFound)));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_original_state() {
        let fresh = create_test_recipe("r1", 0);
        let liked = create_test_recipe("r1", 1);
        let like = create_test_like("l1", "u1", "r1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // first toggle inserts the like row and bumps the counter
                .append_query_results([[fresh.clone()]])
                .append_query_results([Vec::<like::Model>::new()])
                .append_query_results([[like.clone()]])
                .append_query_results([[liked.clone()]])
                // second toggle deletes the row and restores the counter
                .append_query_results([[liked]])
                .append_query_results([[like]])
                .append_query_results([[fresh]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);

        let (liked_now, count) = repo.toggle("l1", "u1", "r1").await.unwrap();
        assert!(liked_now);
        assert_eq!(count, 1);

        let (liked_now, count) = repo.toggle("l1", "u1", "r1").await.unwrap();
        assert!(!liked_now);
        assert_eq!(count, 0);
    }
}
