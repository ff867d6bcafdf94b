//! Catalog service: public browse, detail and favorites pages.

use recipehaven_common::{AppError, AppResult};
use recipehaven_db::{
    entities::{category, comment, recipe, user},
    repositories::{
        CategoryRepository, CommentRepository, FavoriteRepository, LikeRepository,
        RatingRepository, RecipeRepository, UserRepository,
    },
};
use serde::Serialize;
use std::collections::HashMap;

/// How many featured recipes the unfiltered browse page promotes.
const FEATURED_LIMIT: usize = 6;

/// Browse page filters. All of them combine with AND.
#[derive(Debug, Clone, Default)]
pub struct BrowseFilters {
    pub category_id: Option<String>,
    pub ingredient: Option<String>,
    pub recipe_name: Option<String>,
}

impl BrowseFilters {
    fn is_empty(&self) -> bool {
        fn blank(v: Option<&String>) -> bool {
            v.is_none_or(|s| s.trim().is_empty())
        }
        blank(self.category_id.as_ref())
            && blank(self.ingredient.as_ref())
            && blank(self.recipe_name.as_ref())
    }
}

/// A recipe as shown on list pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category_id: String,
    pub category_name: String,
    pub image_url: Option<String>,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub is_featured: bool,
    pub likes_count: i32,
    pub average_rating: f64,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

/// The browse page: a featured band plus the main grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowsePage {
    /// Promoted recipes; empty whenever any filter is active.
    pub featured: Vec<RecipeCard>,
    pub recipes: Vec<RecipeCard>,
    pub categories: Vec<category::Model>,
}

/// A comment as shown on the detail page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub author_name: String,
    pub content: String,
    pub posted_at: chrono::DateTime<chrono::FixedOffset>,
}

/// The viewer's relationship to a recipe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerContext {
    pub is_favorited: bool,
    pub has_liked: bool,
    /// The viewer's own score, if they have rated this recipe.
    pub rating: Option<i16>,
}

/// Full recipe detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category_id: String,
    pub category_name: String,
    pub image_url: Option<String>,
    pub prep_time: i32,
    pub cook_time: i32,
    pub total_time: i32,
    pub servings: i32,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub author_name: String,
    pub is_featured: bool,
    pub likes_count: i32,
    pub average_rating: f64,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub comments: Vec<CommentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<ViewerContext>,
}

/// Catalog service for the public read side.
#[derive(Clone)]
pub struct CatalogService {
    recipe_repo: RecipeRepository,
    category_repo: CategoryRepository,
    comment_repo: CommentRepository,
    favorite_repo: FavoriteRepository,
    like_repo: LikeRepository,
    rating_repo: RatingRepository,
    user_repo: UserRepository,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(
        recipe_repo: RecipeRepository,
        category_repo: CategoryRepository,
        comment_repo: CommentRepository,
        favorite_repo: FavoriteRepository,
        like_repo: LikeRepository,
        rating_repo: RatingRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            recipe_repo,
            category_repo,
            comment_repo,
            favorite_repo,
            like_repo,
            rating_repo,
            user_repo,
        }
    }

    /// All categories, alphabetical.
    pub async fn categories(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_all().await
    }

    /// Approved recipes matching the filters.
    ///
    /// Without filters the newest-first grid is topped by a band of up to
    /// six featured recipes, which are excluded from the grid itself. With
    /// any filter active the band is empty and featured recipes simply
    /// sort first.
    pub async fn browse(&self, filters: &BrowseFilters) -> AppResult<BrowsePage> {
        let categories = self.category_repo.find_all().await?;
        let names: HashMap<&str, &str> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        let recipes = self
            .recipe_repo
            .find_approved(filters.category_id.as_deref().filter(|s| !s.is_empty()))
            .await?;

        let matched: Vec<recipe::Model> = recipes
            .into_iter()
            .filter(|r| {
                matches_name(filters.recipe_name.as_deref(), &r.name)
                    && matches_ingredients(filters.ingredient.as_deref(), &r.ingredient_list())
            })
            .collect();

        let (featured, rest) = if filters.is_empty() {
            split_featured_band(matched)
        } else {
            (Vec::new(), matched)
        };

        let featured = card_list(featured, &names);
        let recipes = card_list(rest, &names);

        Ok(BrowsePage {
            featured,
            recipes,
            categories,
        })
    }

    /// A single recipe with its comments.
    ///
    /// Recipes outside the approved status are visible only to their
    /// author and to admins.
    pub async fn detail(
        &self,
        recipe_id: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<RecipeDetail> {
        let recipe = self
            .recipe_repo
            .find_by_id(recipe_id)
            .await?
            .ok_or(AppError::RecipeNotFound)?;

        if recipe.status != recipe::RecipeStatus::Approved && !may_preview(&recipe, viewer) {
            return Err(AppError::RecipeNotFound);
        }

        let category_name = self
            .category_repo
            .find_by_id(&recipe.category_id)
            .await?
            .map(|c| c.name)
            .unwrap_or_default();

        let author_name = match &recipe.author_id {
            Some(id) => self
                .user_repo
                .find_by_id(id)
                .await?
                .map_or_else(|| "Unknown".to_string(), |u| u.name),
            None => "Unknown".to_string(),
        };

        let comments = self
            .comment_repo
            .find_by_recipe(&recipe.id)
            .await?
            .into_iter()
            .map(comment_view)
            .collect();

        let viewer_ctx = match viewer {
            Some(user) => Some(ViewerContext {
                is_favorited: self.favorite_repo.is_favorited(&user.id, &recipe.id).await?,
                has_liked: self.like_repo.has_liked(&user.id, &recipe.id).await?,
                rating: self
                    .rating_repo
                    .find_by_user_and_recipe(&user.id, &recipe.id)
                    .await?
                    .map(|r| r.score),
            }),
            None => None,
        };

        Ok(RecipeDetail {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            category_id: recipe.category_id.clone(),
            category_name,
            image_url: recipe.image_url.clone(),
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            total_time: recipe.prep_time + recipe.cook_time,
            servings: recipe.servings,
            ingredients: recipe.ingredient_list(),
            instructions: recipe.instruction_list(),
            author_name,
            is_featured: recipe.is_featured,
            likes_count: recipe.likes_count,
            average_rating: recipe.average_rating,
            created_at: recipe.created_at,
            comments,
            viewer: viewer_ctx,
        })
    }

    /// The viewer's favorited recipes, most recently favorited first.
    ///
    /// Recipes that have since left the approved status drop out.
    pub async fn my_favorites(&self, user_id: &str) -> AppResult<Vec<RecipeCard>> {
        let ids = self.favorite_repo.recipe_ids_by_user(user_id).await?;
        let recipes = self.recipe_repo.find_by_ids(&ids).await?;

        let categories = self.category_repo.find_all().await?;
        let names: HashMap<&str, &str> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        let mut by_id: HashMap<String, recipe::Model> = recipes
            .into_iter()
            .filter(|r| r.status == recipe::RecipeStatus::Approved)
            .map(|r| (r.id.clone(), r))
            .collect();

        let ordered: Vec<recipe::Model> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
        Ok(card_list(ordered, &names))
    }
}

fn card_list(recipes: Vec<recipe::Model>, names: &HashMap<&str, &str>) -> Vec<RecipeCard> {
    recipes
        .into_iter()
        .map(|r| {
            let category_name = names.get(r.category_id.as_str()).unwrap_or(&"").to_string();
            recipe_card(r, category_name)
        })
        .collect()
}

fn may_preview(recipe: &recipe::Model, viewer: Option<&user::Model>) -> bool {
    viewer.is_some_and(|u| u.is_admin() || recipe.author_id.as_deref() == Some(u.id.as_str()))
}

fn recipe_card(recipe: recipe::Model, category_name: String) -> RecipeCard {
    RecipeCard {
        id: recipe.id,
        name: recipe.name,
        description: recipe.description,
        category_id: recipe.category_id,
        category_name,
        image_url: recipe.image_url,
        prep_time: recipe.prep_time,
        cook_time: recipe.cook_time,
        servings: recipe.servings,
        is_featured: recipe.is_featured,
        likes_count: recipe.likes_count,
        average_rating: recipe.average_rating,
        created_at: recipe.created_at,
    }
}

fn comment_view(comment: comment::Model) -> CommentView {
    CommentView {
        id: comment.id,
        author_name: comment.author_name,
        content: comment.content,
        posted_at: comment.posted_at,
    }
}

/// Case-insensitive substring match on the recipe name.
fn matches_name(query: Option<&str>, name: &str) -> bool {
    match query.map(str::trim) {
        None | Some("") => true,
        Some(q) => name.to_lowercase().contains(&q.to_lowercase()),
    }
}

/// Ingredient search: every comma-separated term must appear as a
/// case-insensitive substring of at least one ingredient entry.
fn matches_ingredients(query: Option<&str>, ingredients: &[String]) -> bool {
    match query.map(str::trim) {
        None | Some("") => true,
        Some(q) => {
            let lowered: Vec<String> = ingredients.iter().map(|i| i.to_lowercase()).collect();
            q.split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_lowercase)
                .all(|term| lowered.iter().any(|i| i.contains(&term)))
        }
    }
}

/// Split off up to [`FEATURED_LIMIT`] featured recipes for the band.
///
/// The input arrives featured-first from the repository; the remainder
/// (including featured recipes that overflowed the band) is re-sorted
/// by recency for the main grid.
fn split_featured_band(recipes: Vec<recipe::Model>) -> (Vec<recipe::Model>, Vec<recipe::Model>) {
    let mut featured = Vec::new();
    let mut rest = Vec::new();

    for recipe in recipes {
        if recipe.is_featured && featured.len() < FEATURED_LIMIT {
            featured.push(recipe);
        } else {
            rest.push(recipe);
        }
    }

    rest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    (featured, rest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn create_aged_recipe(id: &str, featured: bool, age_minutes: i64) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            name: format!("Recipe {id}"),
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
            is_featured: featured,
            likes_count: 0,
            average_rating: 0.0,
            created_at: (Utc::now() - Duration::minutes(age_minutes)).into(),
        }
    }

    fn create_test_recipe(id: &str, featured: bool) -> recipe::Model {
        create_aged_recipe(id, featured, 0)
    }

    #[test]
    fn test_matches_name_substring() {
        assert!(matches_name(Some("cake"), "Chocolate Cake"));
        assert!(!matches_name(Some("pie"), "Chocolate Cake"));
        assert!(matches_name(None, "Anything"));
        assert!(matches_name(Some("  "), "Anything"));
    }

    #[test]
    fn test_matches_ingredients_all_terms() {
        let ingredients = vec![
            "2 cups flour".to_string(),
            "1 cup sugar".to_string(),
            "3 eggs".to_string(),
        ];

        assert!(matches_ingredients(Some("flour,sugar"), &ingredients));
        assert!(matches_ingredients(Some("flour, sugar"), &ingredients));
        assert!(matches_ingredients(Some("EGGS"), &ingredients));
        assert!(!matches_ingredients(Some("flour,butter"), &ingredients));
        assert!(matches_ingredients(None, &ingredients));
    }

    #[test]
    fn test_matches_ingredients_empty_list() {
        assert!(!matches_ingredients(Some("flour"), &[]));
        assert!(matches_ingredients(None, &[]));
    }

    #[test]
    fn test_split_featured_band_caps_at_six() {
        let recipes: Vec<recipe::Model> = (0..10)
            .map(|i| create_test_recipe(&format!("r{i}"), true))
            .collect();

        let (featured, rest) = split_featured_band(recipes);

        assert_eq!(featured.len(), 6);
        assert_eq!(rest.len(), 4);
    }

    #[test]
    fn test_split_featured_band_keeps_order() {
        let recipes = vec![
            create_test_recipe("r1", true),
            create_test_recipe("r2", false),
            create_test_recipe("r3", true),
        ];

        let (featured, rest) = split_featured_band(recipes);

        assert_eq!(featured.len(), 2);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, "r2");
    }

    #[test]
    fn test_split_featured_band_overflow_sorts_main_grid_by_recency() {
        // Featured-first input, as the repository orders it: seven
        // featured recipes, then a plain one that is newer than all of
        // them. The seventh featured recipe overflows the band and must
        // fall behind the newer plain recipe in the main grid.
        let mut recipes: Vec<recipe::Model> = (0..7)
            .map(|i| create_aged_recipe(&format!("f{i}"), true, 10 + i))
            .collect();
        recipes.push(create_aged_recipe("plain", false, 1));

        let (featured, rest) = split_featured_band(recipes);

        assert_eq!(featured.len(), 6);
        assert_eq!(
            rest.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["plain", "f6"]
        );
    }

    #[test]
    fn test_filters_is_empty() {
        assert!(BrowseFilters::default().is_empty());
        assert!(
            BrowseFilters {
                category_id: Some(String::new()),
                ingredient: Some("  ".to_string()),
                recipe_name: None,
            }
            .is_empty()
        );
        assert!(
            !BrowseFilters {
                recipe_name: Some("cake".to_string()),
                ..BrowseFilters::default()
            }
            .is_empty()
        );
    }
}
