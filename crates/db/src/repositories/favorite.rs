//! Favorite repository.

use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use chrono::Utc;
use recipehaven_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a favorite by user and recipe.
    pub async fn find_by_user_and_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> AppResult<Option<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has favorited a recipe.
    pub async fn is_favorited(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_recipe(user_id, recipe_id)
            .await?
            .is_some())
    }

    /// Toggle a favorite, returning whether the recipe is favorited afterwards.
    pub async fn toggle(&self, id: &str, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        match self.find_by_user_and_recipe(user_id, recipe_id).await? {
            Some(row) => {
                row.delete(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(false)
            }
            None => {
                let model = favorite::ActiveModel {
                    id: Set(id.to_string()),
                    user_id: Set(user_id.to_string()),
                    recipe_id: Set(recipe_id.to_string()),
                    created_at: Set(Utc::now().into()),
                };
                model
                    .insert(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(true)
            }
        }
    }

    /// Recipe IDs a user has favorited, most recent first.
    pub async fn recipe_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .select_only()
            .column(favorite::Column::RecipeId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
