use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::{CreateUser, UpdateUser, UserResponse};
use crate::routes::params::{EmailParam, IdParam, UsernameParam};
use crate::services::UserService;

/// POST /users
pub async fn create_user(
    body: web::Json<CreateUser>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// GET /users
pub async fn list_users(users: web::Data<UserService>) -> Result<HttpResponse, AppError> {
    let list: Vec<UserResponse> = users
        .find_all()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(list))
}

/// GET /users/id/?id=N
pub async fn get_user_by_id(
    params: web::Query<IdParam>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.find_by_id(params.parse()?).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// GET /users/username/?username=S
pub async fn get_user_by_username(
    params: web::Query<UsernameParam>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.find_by_username(&params.username).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// GET /users/email/?email=S
pub async fn get_user_by_email(
    params: web::Query<EmailParam>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.find_by_email(&params.email).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// PUT /users/id/?id=N
pub async fn update_user(
    params: web::Query<IdParam>,
    body: web::Json<UpdateUser>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.update(params.parse()?, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /users/id/?id=N
pub async fn delete_user(
    params: web::Query<IdParam>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    users.delete(params.parse()?).await?;
    Ok(HttpResponse::Ok().finish())
}
