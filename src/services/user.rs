/// User use-cases on top of [`UserStorage`]
///
/// Storage errors pass through unchanged; this layer only adds input checks
/// and password hashing.

use std::sync::Arc;

use crate::auth::PasswordHasher;
use crate::error::AppError;
use crate::models::{CreateUser, UpdateUser, User};
use crate::storage::UserStorage;

pub struct UserService {
    storage: Arc<dyn UserStorage>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(storage: Arc<dyn UserStorage>, hasher: PasswordHasher) -> Self {
        Self { storage, hasher }
    }

    /// Look up `username` and check `password` against the stored hash
    ///
    /// # Errors
    /// - `NotFound` if no user has this username
    /// - `InvalidCredentials` if the password does not match
    pub async fn find_user_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let user = self.storage.find_by_username(username).await?;
        self.hasher
            .verify_blocking(user.password_hash.clone(), password.to_string())
            .await?;
        Ok(user)
    }

    pub async fn create(&self, dto: CreateUser) -> Result<User, AppError> {
        if dto.username.trim().is_empty() || dto.email.trim().is_empty() {
            return Err(AppError::BadRequest("username and email are required".into()));
        }
        if dto.password.is_empty() {
            return Err(AppError::BadRequest("password is required".into()));
        }
        if dto.password != dto.repeat_password {
            return Err(AppError::BadRequest("password does not match repeat password".into()));
        }

        let password_hash = self.hasher.hash_blocking(dto.password).await?;
        let user = self.storage.create(&dto.username, &dto.email, &password_hash).await?;

        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Apply a partial update; a new password is hashed before it is stored
    pub async fn update(&self, id: i32, mut dto: UpdateUser) -> Result<User, AppError> {
        self.storage.find_by_id(id).await?;

        if let Some(password) = dto.password.take() {
            if password.is_empty() {
                return Err(AppError::BadRequest("password must not be empty".into()));
            }
            dto.password = Some(self.hasher.hash_blocking(password).await?);
        }
        self.storage.update(id, &dto).await
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        self.storage.delete(id).await
    }

    pub async fn find_all(&self) -> Result<Vec<User>, AppError> {
        self.storage.find_all().await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<User, AppError> {
        self.storage.find_by_id(id).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, AppError> {
        self.storage.find_by_username(username).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.storage.find_by_email(email).await
    }
}
