use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, Resource};
use crate::models::{UpdateUser, User};
use crate::storage::map_db_error;

#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Insert a user whose password is already hashed
    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User, AppError>;
    async fn find_all(&self) -> Result<Vec<User>, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<User, AppError>;
    /// Case-sensitive exact match
    async fn find_by_username(&self, username: &str) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;
    /// `update.password`, when present, must already be a hash
    async fn update(&self, id: i32, update: &UpdateUser) -> Result<User, AppError>;
    async fn delete(&self, id: i32) -> Result<(), AppError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStorage for PgUserRepository {
    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO public."user" (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::User))
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash FROM public."user" ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::User))
    }

    async fn find_by_id(&self, id: i32) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash FROM public."user" WHERE id = $1"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::User))
    }

    async fn find_by_username(&self, username: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash FROM public."user" WHERE username = $1"#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::User))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password_hash FROM public."user" WHERE email = $1"#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::User))
    }

    async fn update(&self, id: i32, update: &UpdateUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE public."user"
            SET username = COALESCE($1, username),
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash)
            WHERE id = $4
            RETURNING id, username, email, password_hash
            "#,
        )
        .bind(update.username.as_deref())
        .bind(update.email.as_deref())
        .bind(update.password.as_deref())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::User))
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query(r#"DELETE FROM public."user" WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, Resource::User))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
