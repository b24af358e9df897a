/// Login and refresh endpoints, both mounted on `/users/login/`

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{RefreshTokenRequest, TokenHelper};
use crate::error::AppError;
use crate::services::UserService;

#[derive(Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /users/login/?username=&password=
///
/// # Errors
/// - 400 `NS-000002`: username or password missing
/// - 404 `US-000003`: no such user
/// - 400 `US-0007`: wrong password
pub async fn login(
    params: web::Query<LoginParams>,
    users: web::Data<UserService>,
    tokens: web::Data<TokenHelper>,
) -> Result<HttpResponse, AppError> {
    if params.username.is_empty() || params.password.is_empty() {
        return Err(AppError::BadRequest(
            "invalid query parameters username or password".to_string(),
        ));
    }

    let user = users
        .find_user_by_username_and_password(&params.username, &params.password)
        .await?;
    let pair = tokens.generate_access_token(&user)?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(HttpResponse::Created().json(pair))
}

/// PUT /users/login/ with `{"refresh_token": "..."}`
///
/// The presented handle is consumed; a second use fails with 400 `NS-000003`.
pub async fn refresh(
    body: web::Json<RefreshTokenRequest>,
    tokens: web::Data<TokenHelper>,
) -> Result<HttpResponse, AppError> {
    let pair = tokens.update_refresh_token(&body)?;
    Ok(HttpResponse::Created().json(pair))
}
