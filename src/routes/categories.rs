use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::CreateCategory;
use crate::routes::params::{IdParam, TitleParam};
use crate::storage::CategoryStorage;

/// POST /categories/
pub async fn create_category(
    body: web::Json<CreateCategory>,
    categories: web::Data<dyn CategoryStorage>,
) -> Result<HttpResponse, AppError> {
    if body.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }
    let category = categories.create(&body).await?;
    Ok(HttpResponse::Created().json(category))
}

/// GET /categories/
pub async fn list_categories(
    categories: web::Data<dyn CategoryStorage>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(categories.find_all().await?))
}

/// GET /categories/id?id=N
pub async fn get_category_by_id(
    params: web::Query<IdParam>,
    categories: web::Data<dyn CategoryStorage>,
) -> Result<HttpResponse, AppError> {
    let category = categories.find_by_id(params.parse()?).await?;
    Ok(HttpResponse::Ok().json(category))
}

/// GET /categories/title?title=S
pub async fn get_category_by_title(
    params: web::Query<TitleParam>,
    categories: web::Data<dyn CategoryStorage>,
) -> Result<HttpResponse, AppError> {
    let category = categories.find_by_title(&params.title).await?;
    Ok(HttpResponse::Ok().json(category))
}
