/// Authentication module
///
/// Password hashing, access-token signing and refresh-token rotation.

mod claims;
mod jwt;
mod password;

pub use claims::{UserClaims, ACCESS_TOKEN_TTL, AUDIENCE};
pub use jwt::{RefreshTokenRequest, TokenHelper, TokenPair};
pub use password::{PasswordHasher, MIN_COST};
