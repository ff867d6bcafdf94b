//! Initial data seeding.
//!
//! Runs at startup after migrations. Inserts the recipe categories and the
//! administrator account when they are missing; an already-seeded database
//! is left untouched.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use recipehaven_common::{AppError, AppResult, Config, IdGenerator};
use sea_orm::{DatabaseConnection, Set};
use std::sync::Arc;
use tracing::info;

use crate::entities::{category, user};
use crate::repositories::{CategoryRepository, UserRepository};

/// Category names available to uploaders.
const CATEGORY_NAMES: [&str; 9] = [
    "Dessert",
    "Main Course",
    "Appetizer",
    "Vegetarian",
    "Mexican",
    "PastaNoodles",
    "Pasta",
    "Pizza",
    "Salad",
];

/// Seed categories and the admin account.
pub async fn run(db: &Arc<DatabaseConnection>, config: &Config) -> AppResult<()> {
    let id_gen = IdGenerator::new();

    seed_categories(db, &id_gen).await?;
    seed_admin(db, config, &id_gen).await?;

    Ok(())
}

async fn seed_categories(db: &Arc<DatabaseConnection>, id_gen: &IdGenerator) -> AppResult<()> {
    let repo = CategoryRepository::new(Arc::clone(db));

    for name in CATEGORY_NAMES {
        if repo.find_by_name(name).await?.is_none() {
            let model = category::ActiveModel {
                id: Set(id_gen.generate()),
                name: Set(name.to_string()),
            };
            repo.create(model).await?;
            info!(category = name, "seeded category");
        }
    }

    Ok(())
}

async fn seed_admin(
    db: &Arc<DatabaseConnection>,
    config: &Config,
    id_gen: &IdGenerator,
) -> AppResult<()> {
    let repo = UserRepository::new(Arc::clone(db));

    if repo.email_exists(&config.seed.admin_email).await? {
        return Ok(());
    }

    let model = user::ActiveModel {
        id: Set(id_gen.generate()),
        name: Set("Admin".to_string()),
        email: Set(config.seed.admin_email.clone()),
        password_hash: Set(hash_password(&config.seed.admin_password)?),
        role: Set(user::UserRole::Admin),
        status: Set(user::UserStatus::Active),
        joined_at: Set(Utc::now().into()),
        updated_at: Set(None),
    };
    repo.create(model).await?;
    info!(email = %config.seed.admin_email, "seeded admin account");

    Ok(())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    #[test]
    fn test_nine_categories() {
        assert_eq!(CATEGORY_NAMES.len(), 9);
    }

    #[test]
    fn test_hash_password_verifies() {
        let hash = hash_password("Admin123!").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"Admin123!", &parsed)
                .is_ok()
        );
    }
}
