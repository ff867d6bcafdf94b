//! Recipe repository.

use std::sync::Arc;

use crate::entities::{Recipe, recipe, recipe::RecipeStatus};
use chrono::{DateTime, Utc};
use recipehaven_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

/// Recipe repository for database operations.
#[derive(Clone)]
pub struct RecipeRepository {
    db: Arc<DatabaseConnection>,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find recipes by a list of IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<recipe::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Recipe::find()
            .filter(recipe::Column::Id.is_in(ids.iter().map(String::as_str)))
            .order_by_desc(recipe::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Approved recipes, optionally limited to one category.
    ///
    /// Featured recipes sort ahead of the rest, newest first within each band.
    pub async fn find_approved(&self, category_id: Option<&str>) -> AppResult<Vec<recipe::Model>> {
        let mut query = Recipe::find().filter(recipe::Column::Status.eq(RecipeStatus::Approved));

        if let Some(id) = category_id {
            query = query.filter(recipe::Column::CategoryId.eq(id));
        }

        query
            .order_by_desc(recipe::Column::IsFeatured)
            .order_by_desc(recipe::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recipes in a given moderation status, newest first.
    pub async fn find_by_status(&self, status: RecipeStatus) -> AppResult<Vec<recipe::Model>> {
        Recipe::find()
            .filter(recipe::Column::Status.eq(status))
            .order_by_desc(recipe::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All recipes regardless of status, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<recipe::Model>> {
        Recipe::find()
            .order_by_desc(recipe::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new recipe.
    pub async fn create(&self, model: recipe::ActiveModel) -> AppResult<recipe::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a recipe.
    pub async fn update(&self, model: recipe::ActiveModel) -> AppResult<recipe::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a recipe. Comments, likes, favorites and ratings cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let recipe = self.find_by_id(id).await?;
        if let Some(r) = recipe {
            r.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Move a recipe to a new moderation status.
    pub async fn set_status(&self, id: &str, status: RecipeStatus) -> AppResult<recipe::Model> {
        let recipe = self
            .find_by_id(id)
            .await?
            .ok_or(AppError::RecipeNotFound)?;

        let mut active: recipe::ActiveModel = recipe.into();
        active.status = Set(status);
        self.update(active).await
    }

    /// Flip the featured flag, returning the updated model.
    pub async fn set_featured(&self, id: &str, featured: bool) -> AppResult<recipe::Model> {
        let recipe = self
            .find_by_id(id)
            .await?
            .ok_or(AppError::RecipeNotFound)?;

        let mut active: recipe::ActiveModel = recipe.into();
        active.is_featured = Set(featured);
        self.update(active).await
    }

    /// Count all recipes.
    pub async fn count(&self) -> AppResult<u64> {
        Recipe::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes in a given moderation status.
    pub async fn count_by_status(&self, status: RecipeStatus) -> AppResult<u64> {
        Recipe::find()
            .filter(recipe::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes created inside a half-open time range.
    pub async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<u64> {
        Recipe::find()
            .filter(recipe::Column::CreatedAt.gte(start))
            .filter(recipe::Column::CreatedAt.lt(end))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn create_test_recipe(id: &str, name: &str, status: RecipeStatus) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            name: name.to_string(),
            description: "A test recipe".to_string(),
            prep_time: 10,
            cook_time: 20,
            servings: 4,
            category_id: "c1".to_string(),
            image_url: None,
            ingredients: json!(["2 eggs"]),
            instructions: json!(["Whisk"]),
            status,
            author_id: Some("u1".to_string()),
            is_featured: false,
            likes_count: 0,
            average_rating: 0.0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let recipe = create_test_recipe("r1", "Pancakes", RecipeStatus::Approved);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe.clone()]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let result = repo.find_by_id("r1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().name, "Pancakes");
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_approved() {
        let r1 = create_test_recipe("r1", "Pancakes", RecipeStatus::Approved);
        let r2 = create_test_recipe("r2", "Waffles", RecipeStatus::Approved);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let result = repo.find_approved(None).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_set_status_missing_recipe() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );

        let repo = RecipeRepository::new(db);
        let result = repo.set_status("missing", RecipeStatus::Approved).await;

        assert!(matches!(result, Err(AppError::RecipeNotFound)));
    }
}
