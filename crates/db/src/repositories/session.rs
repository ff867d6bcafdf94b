//! Session repository.

use std::sync::Arc;

use crate::entities::{Session, session};
use chrono::{DateTime, Utc};
use recipehaven_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

/// Session repository for database operations.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<session::Model>> {
        Session::find_by_id(token)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a session for a user.
    pub async fn create(
        &self,
        token: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<session::Model> {
        let model = session::ActiveModel {
            id: Set(token.to_string()),
            user_id: Set(user_id.to_string()),
            expires_at: Set(expires_at.into()),
            created_at: Set(Utc::now().into()),
        };
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Push a session's expiry forward (sliding idle timeout).
    pub async fn touch(&self, token: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        let session = self
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let mut active: session::ActiveModel = session.into();
        active.expires_at = Set(expires_at.into());
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a session.
    pub async fn delete(&self, token: &str) -> AppResult<()> {
        Session::delete_by_id(token)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete every session belonging to a user.
    pub async fn delete_by_user(&self, user_id: &str) -> AppResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Delete sessions whose expiry has passed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::ExpiresAt.lt(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_session(token: &str, user_id: &str) -> session::Model {
        session::Model {
            id: token.to_string(),
            user_id: user_id.to_string(),
            expires_at: (Utc::now() + Duration::minutes(30)).into(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_token_found() {
        let session = create_test_session("tok123", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[session]])
                .into_connection(),
        );

        let repo = SessionRepository::new(db);
        let result = repo.find_by_token("tok123").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().user_id, "u1");
    }

    #[tokio::test]
    async fn test_touch_missing_session() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<session::Model>::new()])
                .into_connection(),
        );

        let repo = SessionRepository::new(db);
        let result = repo.touch("missing", Utc::now()).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
