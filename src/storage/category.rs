use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, Resource};
use crate::models::{Category, CreateCategory};
use crate::storage::map_db_error;

#[async_trait]
pub trait CategoryStorage: Send + Sync {
    async fn create(&self, category: &CreateCategory) -> Result<Category, AppError>;
    async fn find_all(&self) -> Result<Vec<Category>, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Category, AppError>;
    async fn find_by_title(&self, title: &str) -> Result<Category, AppError>;
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStorage for PgCategoryRepository {
    async fn create(&self, category: &CreateCategory) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO public.category (title, child_id)
            VALUES ($1, $2)
            RETURNING id, title, child_id
            "#,
        )
        .bind(&category.title)
        .bind(category.child_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::Category))
    }

    async fn find_all(&self) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT id, title, child_id FROM public.category ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, Resource::Category))
    }

    async fn find_by_id(&self, id: i32) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("SELECT id, title, child_id FROM public.category WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, Resource::Category))
    }

    async fn find_by_title(&self, title: &str) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, title, child_id FROM public.category WHERE title = $1",
        )
        .bind(title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::Category))
    }
}
