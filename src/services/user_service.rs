use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::repository::UserRepository;
use crate::models::{NewUser, User, UserChanges};
use crate::{AppError, Result};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    auth_service: Arc<AuthService>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, auth_service: Arc<AuthService>) -> Self {
        Self {
            user_repo,
            auth_service,
        }
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.user_repo.get_user_by_id(user_id).await
    }

    pub async fn find_user(&self, user_id: i64) -> Result<User> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", user_id)))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<User>> {
        self.user_repo.search_users(query).await
    }

    /// Whether `username` belongs to someone other than `except_id`.
    pub async fn username_taken(&self, username: &str, except_id: Option<i64>) -> Result<bool> {
        let owner = self.user_repo.get_user_by_username(username).await?;
        Ok(owner.is_some_and(|user| Some(user.id) != except_id))
    }

    pub async fn email_taken(&self, email: &str, except_id: Option<i64>) -> Result<bool> {
        let owner = self.user_repo.get_user_by_email(email).await?;
        Ok(owner.is_some_and(|user| Some(user.id) != except_id))
    }

    pub async fn register(&self, username: &str, email: &str, password: &str, language: &str) -> Result<User> {
        let password_hash = self.auth_service.hash_password(password)?;
        let user = self
            .user_repo
            .create_user(&NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                language: language.to_string(),
            })
            .await?;
        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Looks the account up by username, or by email when the identifier
    /// contains an `@`.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> Result<User> {
        let identifier = identifier.trim();
        let user = if identifier.contains('@') {
            self.user_repo.get_user_by_email(&identifier.to_lowercase()).await?
        } else {
            self.user_repo.get_user_by_username(identifier).await?
        };

        let user = user.ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;
        if !self.auth_service.verify_password(password, &user.password_hash)? {
            tracing::debug!("Wrong password for user {}", user.id);
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }
        Ok(user)
    }

    pub fn check_password(&self, user: &User, password: &str) -> Result<bool> {
        self.auth_service.verify_password(password, &user.password_hash)
    }

    pub async fn update_profile(
        &self,
        mut user: User,
        username: &str,
        email: &str,
        language: &str,
        new_password: Option<&str>,
    ) -> Result<User> {
        let password_hash = new_password
            .map(|password| self.auth_service.hash_password(password))
            .transpose()?;
        user.apply(UserChanges {
            username: username.to_string(),
            email: email.to_string(),
            language: language.to_string(),
            password_hash,
        });
        let updated = self.user_repo.update_user(&user).await?;
        tracing::info!("Updated profile of user {}", updated.id);
        Ok(updated)
    }

    /// Session token for a freshly authenticated user.
    pub fn issue_session(&self, user: &User) -> Result<String> {
        self.auth_service.generate_token(user.id, &user.username)
    }
}
