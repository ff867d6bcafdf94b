//! Database entities.

pub mod category;
pub mod comment;
pub mod favorite;
pub mod like;
pub mod rating;
pub mod recipe;
pub mod session;
pub mod user;

pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use favorite::Entity as Favorite;
pub use like::Entity as Like;
pub use rating::Entity as Rating;
pub use recipe::Entity as Recipe;
pub use session::Entity as Session;
pub use user::Entity as User;
