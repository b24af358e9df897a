use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::{CreateProduct, UpdateProduct};
use crate::routes::params::IdParam;
use crate::storage::ProductStorage;

/// POST /products/
pub async fn create_product(
    body: web::Json<CreateProduct>,
    products: web::Data<dyn ProductStorage>,
) -> Result<HttpResponse, AppError> {
    if body.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }
    let product = products.create(&body).await?;

    tracing::info!(product_id = product.id, owner_id = product.owner_id, "Product created");
    Ok(HttpResponse::Created().json(product))
}

/// GET /products/
pub async fn list_products(
    products: web::Data<dyn ProductStorage>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(products.find_all().await?))
}

/// GET /products/id/?id=N
pub async fn get_product(
    params: web::Query<IdParam>,
    products: web::Data<dyn ProductStorage>,
) -> Result<HttpResponse, AppError> {
    let product = products.find_by_id(params.parse()?).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// PUT /products/id/?id=N
pub async fn update_product(
    params: web::Query<IdParam>,
    body: web::Json<UpdateProduct>,
    products: web::Data<dyn ProductStorage>,
) -> Result<HttpResponse, AppError> {
    let id = params.parse()?;
    if body.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    let product = products.update(id, &body).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /products/id/?id=N
pub async fn delete_product(
    params: web::Query<IdParam>,
    products: web::Data<dyn ProductStorage>,
) -> Result<HttpResponse, AppError> {
    products.delete(params.parse()?).await?;
    Ok(HttpResponse::Ok().finish())
}
