//! Admin service: dashboard analytics and moderation of users and comments.

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use recipehaven_common::{AppError, AppResult};
use recipehaven_db::{
    entities::{category, recipe, recipe::RecipeStatus, user},
    repositories::{
        CategoryRepository, CommentRepository, RatingRepository, RecipeRepository,
        SessionRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// How many trailing calendar months the growth chart covers.
const GROWTH_MONTHS: u32 = 6;

/// How many recipes the dashboard leaderboard shows.
const TOP_RECIPES: usize = 3;

/// Approved recipes per category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Sign-ups and uploads inside one calendar month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyActivity {
    /// Abbreviated month name, e.g. `"Mar"`.
    pub month: String,
    pub new_users: u64,
    pub new_recipes: u64,
}

/// A leaderboard entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopRecipe {
    pub id: String,
    pub name: String,
    pub category_name: String,
    pub average_rating: f64,
    pub likes_count: i32,
}

/// Everything the admin dashboard shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_users: u64,
    pub total_recipes: u64,
    pub pending_recipes: u64,
    pub approved_recipes: u64,
    pub total_comments: u64,
    /// Mean of every rating row, one decimal, zero with no ratings.
    pub average_rating: f64,
    pub category_distribution: Vec<CategoryCount>,
    /// Oldest month first.
    pub monthly_activity: Vec<MonthlyActivity>,
    pub top_recipes: Vec<TopRecipe>,
}

/// A recipe row in the admin moderation table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecipeView {
    pub id: String,
    pub name: String,
    pub category_name: String,
    pub author_name: String,
    pub status: RecipeStatus,
    pub is_featured: bool,
    pub likes_count: i32,
    pub average_rating: f64,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

/// A user row in the admin user table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: user::UserRole,
    pub status: user::UserStatus,
    pub joined_at: chrono::DateTime<chrono::FixedOffset>,
    pub recipe_count: u64,
    pub comment_count: u64,
}

/// The admin recipe page: the pending queue plus the full table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecipeList {
    pub pending: Vec<AdminRecipeView>,
    pub all: Vec<AdminRecipeView>,
}

/// The admin user page: every account plus status tallies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserList {
    pub users: Vec<AdminUserView>,
    pub active_users: u64,
    pub suspended_users: u64,
    pub total_users: u64,
}

/// A comment row in the admin comment table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCommentView {
    pub id: String,
    pub recipe_id: String,
    pub recipe_name: String,
    pub author_name: String,
    pub content: String,
    pub posted_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Admin service for the dashboard and user/comment moderation.
#[derive(Clone)]
pub struct AdminService {
    user_repo: UserRepository,
    recipe_repo: RecipeRepository,
    comment_repo: CommentRepository,
    category_repo: CategoryRepository,
    rating_repo: RatingRepository,
    session_repo: SessionRepository,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        recipe_repo: RecipeRepository,
        comment_repo: CommentRepository,
        category_repo: CategoryRepository,
        rating_repo: RatingRepository,
        session_repo: SessionRepository,
    ) -> Self {
        Self {
            user_repo,
            recipe_repo,
            comment_repo,
            category_repo,
            rating_repo,
            session_repo,
        }
    }

    /// Aggregate the dashboard statistics.
    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let total_users = self.user_repo.count().await?;
        let active_users = self
            .user_repo
            .count_by_status(user::UserStatus::Active)
            .await?;
        let total_recipes = self.recipe_repo.count().await?;
        let pending_recipes = self
            .recipe_repo
            .count_by_status(RecipeStatus::Pending)
            .await?;
        let approved_recipes = self
            .recipe_repo
            .count_by_status(RecipeStatus::Approved)
            .await?;
        let total_comments = self.comment_repo.count().await?;
        let average_rating = self.rating_repo.average_all().await?;

        let approved = self.recipe_repo.find_by_status(RecipeStatus::Approved).await?;
        let categories = self.category_repo.find_all().await?;
        let category_names: HashMap<&str, &str> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        let category_distribution = category_distribution(&approved, &categories);
        let top_recipes = rank_top_recipes(&approved, &category_names);
        let monthly_activity = self.monthly_activity(Utc::now()).await?;

        Ok(DashboardStats {
            total_users,
            active_users,
            total_recipes,
            pending_recipes,
            approved_recipes,
            total_comments,
            average_rating,
            category_distribution,
            monthly_activity,
            top_recipes,
        })
    }

    /// The pending moderation queue plus the full recipe table, newest first.
    pub async fn list_recipes(&self) -> AppResult<AdminRecipeList> {
        let recipes = self.recipe_repo.find_all().await?;
        let categories = self.category_repo.find_all().await?;
        let users = self.user_repo.find_all().await?;

        let category_names: HashMap<&str, &str> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();
        let user_names: HashMap<&str, &str> = users
            .iter()
            .map(|u| (u.id.as_str(), u.name.as_str()))
            .collect();

        let all: Vec<AdminRecipeView> = recipes
            .into_iter()
            .map(|r| {
                let category_name = category_names
                    .get(r.category_id.as_str())
                    .unwrap_or(&"")
                    .to_string();
                let author_name = r
                    .author_id
                    .as_deref()
                    .and_then(|id| user_names.get(id))
                    .map_or_else(|| "Unknown".to_string(), ToString::to_string);

                AdminRecipeView {
                    id: r.id,
                    name: r.name,
                    category_name,
                    author_name,
                    status: r.status,
                    is_featured: r.is_featured,
                    likes_count: r.likes_count,
                    average_rating: r.average_rating,
                    created_at: r.created_at,
                }
            })
            .collect();

        let pending: Vec<AdminRecipeView> = all
            .iter()
            .filter(|v| v.status == RecipeStatus::Pending)
            .cloned()
            .collect();

        Ok(AdminRecipeList { pending, all })
    }

    /// All users with their contribution counts and status tallies.
    pub async fn list_users(&self) -> AppResult<AdminUserList> {
        let users = self.user_repo.find_all().await?;
        let recipes = self.recipe_repo.find_all().await?;
        let comments = self.comment_repo.find_all().await?;

        let mut recipe_counts: HashMap<&str, u64> = HashMap::new();
        for recipe in &recipes {
            if let Some(author_id) = recipe.author_id.as_deref() {
                *recipe_counts.entry(author_id).or_default() += 1;
            }
        }

        let mut comment_counts: HashMap<&str, u64> = HashMap::new();
        for comment in &comments {
            *comment_counts.entry(comment.user_id.as_str()).or_default() += 1;
        }

        let views: Vec<AdminUserView> = users
            .into_iter()
            .map(|u| AdminUserView {
                recipe_count: recipe_counts.get(u.id.as_str()).copied().unwrap_or(0),
                comment_count: comment_counts.get(u.id.as_str()).copied().unwrap_or(0),
                id: u.id,
                name: u.name,
                email: u.email,
                role: u.role,
                status: u.status,
                joined_at: u.joined_at,
            })
            .collect();

        let active_users = views
            .iter()
            .filter(|v| v.status == user::UserStatus::Active)
            .count() as u64;
        let total_users = views.len() as u64;

        Ok(AdminUserList {
            suspended_users: total_users - active_users,
            active_users,
            total_users,
            users: views,
        })
    }

    /// Suspend a user and drop their open sessions.
    pub async fn suspend_user(&self, user_id: &str) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if user.is_admin() {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be suspended".to_string(),
            ));
        }

        let mut active: user::ActiveModel = user.into();
        active.status = Set(user::UserStatus::Suspended);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        self.session_repo.delete_by_user(user_id).await?;
        info!(user_id, "user suspended");
        Ok(())
    }

    /// Reactivate a suspended user.
    pub async fn activate_user(&self, user_id: &str) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let mut active: user::ActiveModel = user.into();
        active.status = Set(user::UserStatus::Active);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        info!(user_id, "user activated");
        Ok(())
    }

    /// Delete a user account.
    ///
    /// Their comments go first, then the account; their recipes stay with
    /// the author cleared.
    pub async fn delete_user(&self, user_id: &str) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if user.is_admin() {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be deleted".to_string(),
            ));
        }

        let removed = self.comment_repo.delete_by_user(user_id).await?;
        self.session_repo.delete_by_user(user_id).await?;
        self.user_repo.delete(user_id).await?;

        info!(user_id, removed_comments = removed, "user deleted");
        Ok(())
    }

    /// All comments for the moderation table, newest first.
    pub async fn list_comments(&self) -> AppResult<Vec<AdminCommentView>> {
        let comments = self.comment_repo.find_all().await?;
        let recipes = self.recipe_repo.find_all().await?;

        let recipe_names: HashMap<&str, &str> = recipes
            .iter()
            .map(|r| (r.id.as_str(), r.name.as_str()))
            .collect();

        Ok(comments
            .into_iter()
            .map(|c| AdminCommentView {
                recipe_name: recipe_names
                    .get(c.recipe_id.as_str())
                    .unwrap_or(&"")
                    .to_string(),
                id: c.id,
                recipe_id: c.recipe_id,
                author_name: c.author_name,
                content: c.content,
                posted_at: c.posted_at,
            })
            .collect())
    }

    /// Delete a single comment.
    pub async fn delete_comment(&self, comment_id: &str) -> AppResult<()> {
        if self.comment_repo.find_by_id(comment_id).await?.is_none() {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        self.comment_repo.delete(comment_id).await?;
        info!(comment_id, "comment deleted");
        Ok(())
    }

    async fn monthly_activity(&self, now: DateTime<Utc>) -> AppResult<Vec<MonthlyActivity>> {
        let mut buckets = Vec::with_capacity(GROWTH_MONTHS as usize);

        for start in trailing_month_starts(now, GROWTH_MONTHS) {
            let end = start + Months::new(1);
            let new_users = self.user_repo.count_joined_between(start, end).await?;
            let new_recipes = self.recipe_repo.count_created_between(start, end).await?;

            buckets.push(MonthlyActivity {
                month: start.format("%b").to_string(),
                new_users,
                new_recipes,
            });
        }

        Ok(buckets)
    }
}

/// Starts of the trailing `months` calendar months, oldest first.
fn trailing_month_starts(now: DateTime<Utc>, months: u32) -> Vec<DateTime<Utc>> {
    let current = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);

    (0..months).rev().map(|i| current - Months::new(i)).collect()
}

/// Approved recipes per category, busiest first.
fn category_distribution(
    approved: &[recipe::Model],
    categories: &[category::Model],
) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for recipe in approved {
        *counts.entry(recipe.category_id.as_str()).or_default() += 1;
    }

    let mut distribution: Vec<CategoryCount> = categories
        .iter()
        .map(|c| CategoryCount {
            category: c.name.clone(),
            count: counts.get(c.id.as_str()).copied().unwrap_or(0),
        })
        .collect();

    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    distribution
}

/// Best-rated approved recipes; likes break rating ties.
fn rank_top_recipes(
    approved: &[recipe::Model],
    category_names: &HashMap<&str, &str>,
) -> Vec<TopRecipe> {
    let mut ranked: Vec<&recipe::Model> = approved.iter().collect();
    ranked.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then_with(|| b.likes_count.cmp(&a.likes_count))
    });

    ranked
        .into_iter()
        .take(TOP_RECIPES)
        .map(|r| TopRecipe {
            id: r.id.clone(),
            name: r.name.clone(),
            category_name: category_names
                .get(r.category_id.as_str())
                .unwrap_or(&"")
                .to_string(),
            average_rating: r.average_rating,
            likes_count: r.likes_count,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_recipe(id: &str, category_id: &str, rating: f64, likes: i32) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            name: format!("Recipe {id}"),
            description: String::new(),
            prep_time: 10,
            cook_time: 10,
            servings: 2,
            category_id: category_id.to_string(),
            image_url: None,
            ingredients: json!([]),
            instructions: json!([]),
            status: RecipeStatus::Approved,
            author_id: None,
            is_featured: false,
            likes_count: likes,
            average_rating: rating,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_category(id: &str, name: &str) -> category::Model {
        category::Model {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_trailing_month_starts() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        let starts = trailing_month_starts(now, 6);

        assert_eq!(starts.len(), 6);
        assert_eq!(starts[0], Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap());
        assert_eq!(starts[5], Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());

        let labels: Vec<String> = starts.iter().map(|s| s.format("%b").to_string()).collect();
        assert_eq!(labels, vec!["Oct", "Nov", "Dec", "Jan", "Feb", "Mar"]);
    }

    #[test]
    fn test_category_distribution_includes_empty_categories() {
        let recipes = vec![
            create_test_recipe("r1", "c1", 0.0, 0),
            create_test_recipe("r2", "c1", 0.0, 0),
            create_test_recipe("r3", "c2", 0.0, 0),
        ];
        let categories = vec![
            create_test_category("c1", "Dessert"),
            create_test_category("c2", "Salad"),
            create_test_category("c3", "Pizza"),
        ];

        let distribution = category_distribution(&recipes, &categories);

        assert_eq!(distribution.len(), 3);
        assert_eq!(distribution[0].category, "Dessert");
        assert_eq!(distribution[0].count, 2);
        assert_eq!(distribution[2].category, "Pizza");
        assert_eq!(distribution[2].count, 0);
    }

    #[test]
    fn test_rank_top_recipes_rating_then_likes() {
        let recipes = vec![
            create_test_recipe("r1", "c1", 4.5, 2),
            create_test_recipe("r2", "c1", 4.8, 0),
            create_test_recipe("r3", "c1", 4.5, 9),
            create_test_recipe("r4", "c1", 3.0, 100),
        ];
        let names = HashMap::from([("c1", "Dessert")]);

        let top = rank_top_recipes(&recipes, &names);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].id, "r2");
        assert_eq!(top[1].id, "r3");
        assert_eq!(top[2].id, "r1");
        assert_eq!(top[0].category_name, "Dessert");
    }

    #[tokio::test]
    async fn test_suspend_admin_forbidden() {
        let admin = user::Model {
            id: "a1".to_string(),
            name: "Admin".to_string(),
            email: "admin@recipehaven.com".to_string(),
            password_hash: "hash".to_string(),
            role: user::UserRole::Admin,
            status: user::UserStatus::Active,
            joined_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );

        let service = AdminService::new(
            UserRepository::new(Arc::clone(&db)),
            RecipeRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            RatingRepository::new(Arc::clone(&db)),
            SessionRepository::new(db),
        );

        let result = service.suspend_user("a1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_user_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = AdminService::new(
            UserRepository::new(Arc::clone(&db)),
            RecipeRepository::new(Arc::clone(&db)),
            CommentRepository::new(Arc::clone(&db)),
            CategoryRepository::new(Arc::clone(&db)),
            RatingRepository::new(Arc::clone(&db)),
            SessionRepository::new(db),
        );

        let result = service.delete_user("missing").await;

        assert!(matches!(result, Err(AppError::UserNotFound)));
    }
}
