use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, Resource};
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::storage::map_db_error;

#[async_trait]
pub trait ProductStorage: Send + Sync {
    async fn create(&self, product: &CreateProduct) -> Result<Product, AppError>;
    async fn find_all(&self) -> Result<Vec<Product>, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Product, AppError>;
    async fn update(&self, id: i32, update: &UpdateProduct) -> Result<Product, AppError>;
    async fn delete(&self, id: i32) -> Result<(), AppError>;
}

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStorage for PgProductRepository {
    async fn create(&self, product: &CreateProduct) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO public.product (title, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, owner_id
            "#,
        )
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::Product))
    }

    async fn find_all(&self) -> Result<Vec<Product>, AppError> {
        sqlx::query_as::<_, Product>(
            "SELECT id, title, description, owner_id FROM public.product ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::Product))
    }

    async fn find_by_id(&self, id: i32) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            "SELECT id, title, description, owner_id FROM public.product WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::Product))
    }

    async fn update(&self, id: i32, update: &UpdateProduct) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE public.product
            SET title = COALESCE($1, title),
                description = COALESCE($2, description)
            WHERE id = $3
            RETURNING id, title, description, owner_id
            "#,
        )
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, Resource::Product))
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM public.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, Resource::Product))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
