use serde::Deserialize;

use crate::error::AppError;

/// `?id=N`
#[derive(Debug, Deserialize)]
pub struct IdParam {
    id: Option<String>,
}

impl IdParam {
    /// # Errors
    /// `InvalidIdParam` when `id` is missing or not an integer
    pub fn parse(&self) -> Result<i32, AppError> {
        self.id
            .as_deref()
            .and_then(|id| id.trim().parse().ok())
            .ok_or(AppError::InvalidIdParam)
    }
}

#[derive(Debug, Deserialize)]
pub struct UsernameParam {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailParam {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleParam {
    #[serde(default)]
    pub title: String,
}
