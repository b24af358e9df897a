/// Access and refresh token issuance
///
/// An access token is a stateless HS256 JWT. A refresh token is an opaque
/// UUIDv4 handle that only exists as a key in the refresh cache, mapped to a
/// JSON snapshot of the user it was issued for. Handles are single-use:
/// exchanging one for a new pair removes it.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::claims::{UserClaims, AUDIENCE};
use crate::cache::{CacheError, CacheRepository};
use crate::configuration::{ConfigError, JwtSettings};
use crate::error::AppError;
use crate::models::User;

/// Refresh handles never expire by time; they live until rotated or evicted.
const REFRESH_TOKEN_TTL: u32 = 0;

/// Response body of a successful login or refresh
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Request body of a refresh
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

pub struct TokenHelper {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    cache: Arc<dyn CacheRepository>,
}

impl TokenHelper {
    /// Build a helper from resolved signing settings
    ///
    /// # Errors
    /// Returns `ConfigError` if the secret is missing or shorter than 32 bytes
    pub fn new(settings: &JwtSettings, cache: Arc<dyn CacheRepository>) -> Result<Self, ConfigError> {
        let key = settings.signing_key()?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            cache,
        })
    }

    /// Issue a signed access token and register a fresh refresh handle for `user`
    ///
    /// The handle is in the cache before this returns, so a client never
    /// receives a refresh token the server does not know about.
    pub fn generate_access_token(&self, user: &User) -> Result<TokenPair, AppError> {
        let claims = UserClaims::new(user, chrono::Utc::now().timestamp());
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        tracing::info!(user_id = user.id, "create refresh token");
        let refresh_token = Uuid::new_v4().to_string();
        let snapshot = serde_json::to_vec(user)?;
        self.cache
            .set(refresh_token.as_bytes(), &snapshot, REFRESH_TOKEN_TTL)
            .map_err(|e| {
                tracing::error!(user_id = user.id, error = %e, "Failed to register refresh token");
                AppError::from(e)
            })?;

        Ok(TokenPair {
            token,
            refresh_token,
        })
    }

    /// Exchange a refresh handle for a new token pair
    ///
    /// Order of cache operations: `get(old)`, `set(new)`, `del(old)`. The old
    /// handle is removed on every path once it has been read. If the removal
    /// finds the handle already gone, a concurrent rotation won the race; the
    /// pair minted here is withdrawn and the request fails.
    pub fn update_refresh_token(&self, request: &RefreshTokenRequest) -> Result<TokenPair, AppError> {
        let key = request.refresh_token.as_bytes();

        let snapshot = self.cache.get(key).map_err(|e| match e {
            CacheError::NotFound => AppError::invalid_refresh_token(),
            other => AppError::from(other),
        })?;

        let user: User = match serde_json::from_slice(&snapshot) {
            Ok(user) => user,
            Err(e) => {
                self.cache.del(key);
                tracing::error!(error = %e, "Refresh token snapshot is unreadable");
                return Err(e.into());
            }
        };

        let issued = self.generate_access_token(&user);
        let claimed = self.cache.del(key);

        match issued {
            Ok(pair) if claimed => Ok(pair),
            Ok(pair) => {
                self.cache.del(pair.refresh_token.as_bytes());
                tracing::warn!(user_id = user.id, "Refresh token was rotated concurrently");
                Err(AppError::invalid_refresh_token())
            }
            Err(e) => Err(e),
        }
    }

    /// Verify signature, expiry and audience of an access token
    pub fn validate_access_token(&self, token: &str) -> Result<UserClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUDIENCE]);

        decode::<UserClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!("JWT validation error: {}", e);
                AppError::Unauthorized("invalid or expired token".to_string())
            })
    }
}
