//! Rating repository.

use std::sync::Arc;

use crate::entities::{Rating, Recipe, rating, recipe};
use chrono::Utc;
use recipehaven_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

/// Rating repository for database operations.
///
/// `recipe.average_rating` is derived from rating rows, so the upsert
/// recomputes and persists the mean in the same transaction.
#[derive(Clone)]
pub struct RatingRepository {
    db: Arc<DatabaseConnection>,
}

impl RatingRepository {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a rating by user and recipe.
    pub async fn find_by_user_and_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> AppResult<Option<rating::Model>> {
        Rating::find()
            .filter(rating::Column::UserId.eq(user_id))
            .filter(rating::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All ratings on a recipe.
    pub async fn find_by_recipe(&self, recipe_id: &str) -> AppResult<Vec<rating::Model>> {
        Rating::find()
            .filter(rating::Column::RecipeId.eq(recipe_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mean score across every rating row, rounded to one decimal.
    /// Zero with no ratings.
    pub async fn average_all(&self) -> AppResult<f64> {
        let ratings = Rating::find()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(round_average(&ratings))
    }

    /// Record or replace a user's rating and refresh the recipe's average.
    ///
    /// Returns the new average, rounded to one decimal.
    pub async fn upsert(
        &self,
        id: &str,
        user_id: &str,
        recipe_id: &str,
        score: i16,
    ) -> AppResult<f64> {
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

        let existing = Rating::find()
            .filter(rating::Column::UserId.eq(user_id))
            .filter(rating::Column::RecipeId.eq(recipe_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match existing {
            Some(row) => {
                let mut active: rating::ActiveModel = row.into();
                active.score = Set(score);
                active.updated_at = Set(Some(Utc::now().into()));
                active
                    .update(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            None => {
                let model = rating::ActiveModel {
                    id: Set(id.to_string()),
                    user_id: Set(user_id.to_string()),
                    recipe_id: Set(recipe_id.to_string()),
                    score: Set(score),
                    created_at: Set(Utc::now().into()),
                    updated_at: Set(None),
                };
                model
                    .insert(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        let average = Self::average_for(&txn, recipe_id).await?;

        let mut active: recipe::ActiveModel = recipe.into();
        active.average_rating = Set(average);
        active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(average)
    }

    /// Mean score on a recipe, rounded to one decimal. Zero with no ratings.
    async fn average_for<C: ConnectionTrait>(conn: &C, recipe_id: &str) -> AppResult<f64> {
        let ratings = Rating::find()
            .filter(rating::Column::RecipeId.eq(recipe_id))
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(round_average(&ratings))
    }
}

fn round_average(ratings: &[rating::Model]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(r.score)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn create_test_rating(id: &str, recipe_id: &str, score: i16) -> rating::Model {
        rating::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            recipe_id: recipe_id.to_string(),
            score,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_recipe(id: &str) -> recipe::Model {
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
            likes_count: 0,
            average_rating: 2.0,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_round_average_empty() {
        assert!((round_average(&[]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round_average_one_decimal() {
        let ratings = vec![
            create_test_rating("a", "r1", 5),
            create_test_rating("b", "r1", 4),
            create_test_rating("c", "r1", 4),
        ];
        // 13 / 3 = 4.333... rounds to 4.3
        assert!((round_average(&ratings) - 4.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round_average_half_up() {
        let ratings = vec![
            create_test_rating("a", "r1", 4),
            create_test_rating("b", "r1", 5),
        ];
        assert!((round_average(&ratings) - 4.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_find_by_user_and_recipe() {
        let rating = create_test_rating("rt1", "r1", 5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rating]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let result = repo.find_by_user_and_recipe("u1", "r1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().score, 5);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_score() {
        let recipe = create_test_recipe("r1");
        let old = create_test_rating("rt1", "r1", 2);
        let replaced = create_test_rating("rt1", "r1", 5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe.clone()]])
                .append_query_results([[old]])
                .append_query_results([[replaced.clone()]])
                // still a single row for this (user, recipe) afterwards
                .append_query_results([[replaced]])
                .append_query_results([[recipe]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let average = repo.upsert("rt2", "u1", "r1", 5).await.unwrap();

        // the rewrite replaced the old score, so the mean is 5.0, not 3.5
        assert!((average - 5.0).abs() < f64::EPSILON);
    }
}
