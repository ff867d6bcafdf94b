//! Account service: registration, login and session handling.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use recipehaven_common::{AppError, AppResult, IdGenerator};
use recipehaven_db::{
    entities::user,
    repositories::{SessionRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Input for registering a new account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Input for logging in.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A logged-in user together with their session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: user::Model,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Account service for registration, login and session resolution.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    session_repo: SessionRepository,
    id_gen: IdGenerator,
    /// Idle minutes before a session expires; every request slides it forward.
    idle_minutes: i64,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        session_repo: SessionRepository,
        idle_minutes: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            id_gen: IdGenerator::new(),
            idle_minutes,
        }
    }

    /// Register a new account and open a session for it.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthenticatedSession> {
        input.validate()?;

        let email = normalize_email(&input.email);
        if self.user_repo.email_exists(&email).await? {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            email: Set(email),
            password_hash: Set(hash_password(&input.password)?),
            role: Set(user::UserRole::User),
            status: Set(user::UserStatus::Active),
            joined_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, "registered new account");

        self.open_session(user).await
    }

    /// Log in with email and password.
    ///
    /// The same error is returned for an unknown email and a wrong password.
    /// A suspended account is rejected before the password is checked, so
    /// suspension is reported regardless of credential correctness.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthenticatedSession> {
        input.validate()?;

        let email = normalize_email(&input.email);
        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            return Err(AppError::Unauthorized);
        };

        if user.is_suspended() {
            return Err(AppError::Forbidden(
                "This account has been suspended".to_string(),
            ));
        }

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        info!(user_id = %user.id, "login");
        self.open_session(user).await
    }

    /// Tear down a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.session_repo.delete(token).await
    }

    /// Resolve a session token to its user, sliding the expiry forward.
    ///
    /// Expired sessions are removed on sight. A suspended user's sessions
    /// are dropped and the request is rejected.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let Some(session) = self.session_repo.find_by_token(token).await? else {
            return Err(AppError::Unauthorized);
        };

        let now = Utc::now();
        if session.expires_at < now {
            self.session_repo.delete(token).await?;
            return Err(AppError::Unauthorized);
        }

        let user = self
            .user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.is_suspended() {
            self.session_repo.delete_by_user(&user.id).await?;
            return Err(AppError::Forbidden(
                "This account has been suspended".to_string(),
            ));
        }

        self.session_repo
            .touch(token, now + Duration::minutes(self.idle_minutes))
            .await?;

        Ok(user)
    }

    async fn open_session(&self, user: user::Model) -> AppResult<AuthenticatedSession> {
        let token = self.id_gen.generate_token();
        let expires_at = Utc::now() + Duration::minutes(self.idle_minutes);

        self.session_repo
            .create(&token, &user.id, expires_at)
            .await?;

        Ok(AuthenticatedSession {
            user,
            token,
            expires_at,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
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

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
