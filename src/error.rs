/// Application error handling
///
/// Every handler returns `Result<_, AppError>`. The `ResponseError` impl at the
/// bottom of this module is the single place where errors become HTTP responses:
/// 1. Domain errors (expected, user-facing) keep their own message and code
/// 2. Everything else is reported as a generic system error and logged in full

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use crate::cache::CacheError;
use crate::configuration::ConfigError;

/// ============================================================================
/// 1. ERROR CODES
/// ============================================================================

pub const CODE_NOT_FOUND: &str = "US-000003";
pub const CODE_ALREADY_EXISTS: &str = "US-000005";
pub const CODE_INVALID_ID_PARAM: &str = "US-00006";
pub const CODE_INVALID_CREDENTIALS: &str = "US-0007";
pub const CODE_SYSTEM_ERROR: &str = "NS-000001";
pub const CODE_BAD_REQUEST: &str = "NS-000002";
pub const CODE_UNAUTHORIZED: &str = "NS-000003";

/// Resource whose unique constraint was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Product,
    Category,
}

impl Resource {
    fn already_exists_message(&self) -> &'static str {
        match self {
            Resource::User => "username or email already exist",
            Resource::Product => "product title already exist",
            Resource::Category => "category title already exist",
        }
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // --- domain errors ---
    #[error("not found")]
    NotFound,

    #[error("{}", .0.already_exists_message())]
    AlreadyExists(Resource),

    #[error("{0}")]
    BadRequest(String),

    #[error("password is not correct")]
    InvalidCredentials,

    #[error("param id must be number")]
    InvalidIdParam,

    #[error("{0}")]
    Unauthorized(String),

    // --- unexpected errors ---
    #[error("SQL error (SQLSTATE {}): {source}", .sqlstate.as_deref().unwrap_or("-"))]
    Storage {
        sqlstate: Option<String>,
        #[source]
        source: sqlx::Error,
    },

    #[error("refresh cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("token signing error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// A one-time refresh handle that is unknown, evicted, or already rotated.
    pub fn invalid_refresh_token() -> Self {
        AppError::Unauthorized("invalid refresh token".to_string())
    }

    /// Domain errors are part of the API contract; anything else is a system error.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            AppError::NotFound
                | AppError::AlreadyExists(_)
                | AppError::BadRequest(_)
                | AppError::InvalidCredentials
                | AppError::InvalidIdParam
                | AppError::Unauthorized(_)
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => CODE_NOT_FOUND,
            AppError::AlreadyExists(_) => CODE_ALREADY_EXISTS,
            AppError::BadRequest(_) => CODE_BAD_REQUEST,
            AppError::InvalidCredentials => CODE_INVALID_CREDENTIALS,
            AppError::InvalidIdParam => CODE_INVALID_ID_PARAM,
            AppError::Unauthorized(_) => CODE_UNAUTHORIZED,
            _ => CODE_SYSTEM_ERROR,
        }
    }

    fn developer_message(&self) -> Option<&'static str> {
        match self {
            AppError::BadRequest(_) => Some("something wrong with data"),
            _ => None,
        }
    }

    /// Wrap a driver error, keeping the SQLSTATE for diagnostics.
    pub fn storage(source: sqlx::Error) -> Self {
        let sqlstate = sqlstate(&source);
        AppError::Storage { sqlstate, source }
    }

    fn log(&self, error_id: &str) {
        if self.is_domain() {
            tracing::warn!(error_id = error_id, code = self.code(), error = %self, "Request rejected");
        } else {
            tracing::error!(error_id = error_id, error = %self, "Unexpected error");
        }
    }
}

/// SQLSTATE of a database error, if the driver reported one
pub fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// ============================================================================
/// 3. HTTP RESPONSE MAPPING
/// ============================================================================

/// JSON body written for every failed request
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    /// Correlates the response with the log line
    pub error_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub developer_message: Option<String>,
    pub code: String,
}

impl ErrorResponse {
    pub fn from_error(error: &AppError, error_id: String) -> Self {
        let message = if error.is_domain() {
            error.to_string()
        } else {
            "system error".to_string()
        };

        Self {
            error_id,
            message,
            developer_message: error.developer_message().map(str::to_string),
            code: error.code().to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            // Unauthorized is reported as 400 as well; clients already depend on it.
            e if e.is_domain() => StatusCode::BAD_REQUEST,
            // 418 is the long-standing sentinel for unexpected failures. Kept so that
            // existing clients keep matching on it; a v2 API should switch to 500.
            _ => StatusCode::IM_A_TEAPOT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = crate::logger::current_request_id()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.log(&error_id);

        HttpResponse::build(self.status_code()).json(ErrorResponse::from_error(self, error_id))
    }
}
