//! Business logic services.

pub mod account;
pub mod admin;
pub mod catalog;
pub mod interaction;
pub mod recipe;

pub use account::{AccountService, AuthenticatedSession, LoginInput, RegisterInput};
pub use admin::{
    AdminCommentView, AdminRecipeList, AdminRecipeView, AdminService, AdminUserList,
    AdminUserView, CategoryCount, DashboardStats, MonthlyActivity, TopRecipe,
};
pub use catalog::{
    BrowseFilters, BrowsePage, CatalogService, CommentView, RecipeCard, RecipeDetail,
    ViewerContext,
};
pub use interaction::{InteractionService, RatingOutcome};
pub use recipe::{RecipeService, UploadImage, UploadRecipeInput};
