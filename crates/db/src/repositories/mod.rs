//! Database repositories.

pub mod category;
pub mod comment;
pub mod favorite;
pub mod like;
pub mod rating;
pub mod recipe;
pub mod session;
pub mod user;

pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use favorite::FavoriteRepository;
pub use like::LikeRepository;
pub use rating::RatingRepository;
pub use recipe::RecipeRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
