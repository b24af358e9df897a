/// Password Hashing and Verification
///
/// bcrypt hashes are self-describing (`$2b$<cost>$<salt><hash>`), so raising
/// the cost later needs no schema change: old hashes keep verifying.

use crate::error::AppError;

/// Lowest work factor bcrypt accepts
pub const MIN_COST: u32 = 4;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: MIN_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt
    ///
    /// # Errors
    /// Returns `PasswordHash` if the configured cost is out of range
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Verify a plaintext password against a stored hash
    ///
    /// The comparison is bcrypt's own constant-time check.
    ///
    /// # Errors
    /// - `InvalidCredentials` when the password does not match
    /// - `PasswordHash` when the stored hash cannot be parsed
    pub fn verify(&self, hash: &str, password: &str) -> Result<(), AppError> {
        match bcrypt::verify(password, hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::InvalidCredentials),
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash is corrupt");
                Err(AppError::PasswordHash(e))
            }
        }
    }

    /// Same as [`hash`](Self::hash), run on the blocking thread pool
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
    }

    /// Same as [`verify`](Self::verify), run on the blocking thread pool
    pub async fn verify_blocking(&self, hash: String, password: String) -> Result<(), AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))?
    }
}
