/// JWT Claims structure
///
/// Payload of an access token: the registered claims `jti`, `aud`, `exp`,
/// `iat` (RFC 7519) plus the user's email.

use serde::{Deserialize, Serialize};

use crate::models::User;

/// Audience every access token is issued for
pub const AUDIENCE: &str = "users";
/// Access token lifetime in seconds (60 minutes)
pub const ACCESS_TOKEN_TTL: i64 = 60 * 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserClaims {
    /// User identifier rendered as a string
    pub jti: String,
    pub aud: Vec<String>,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    pub email: String,
}

impl UserClaims {
    /// Claims for `user`, issued at `now` (Unix seconds)
    pub fn new(user: &User, now: i64) -> Self {
        Self {
            jti: user.id.to_string(),
            aud: vec![AUDIENCE.to_string()],
            exp: now + ACCESS_TOKEN_TTL,
            iat: now,
            email: user.email.clone(),
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        self.jti.parse().ok()
    }
}
