use std::time::Duration;

use async_trait::async_trait;
use auth::IssuedToken;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::TokenCacheError;
use crate::domain::auth::models::BearerToken;
use crate::domain::auth::models::LoginCredential;
use crate::domain::auth::models::TokenStatus;

/// Port for login and bearer token verification.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Exchange credentials for a signed token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password (indistinguishable)
    /// * `Password`, `Signing`, `Repository`, `Cache` - Internal failures
    async fn login(&self, credential: LoginCredential) -> Result<IssuedToken, AuthError>;

    /// Check a bearer token, preferring the cache over signature verification.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature or malformed token
    /// * `TokenExpired` - Token is past its expiry
    /// * `Cache` - Re-warming the cache failed
    async fn verify(&self, token: &BearerToken) -> Result<TokenStatus, AuthError>;
}

/// Record of tokens currently known to be valid.
///
/// A miss means "unknown", never "invalid".
#[async_trait]
pub trait TokenCache: Send + Sync + 'static {
    /// Mark `token` valid for `ttl`. Idempotent.
    ///
    /// # Errors
    /// * `Unavailable` - Cache could not be reached
    /// * `CommandFailed` - Cache rejected the write
    async fn mark_valid(&self, token: &str, ttl: Duration) -> Result<(), TokenCacheError>;

    /// Whether `token` is currently marked valid.
    ///
    /// # Errors
    /// * `Unavailable` - Cache could not be reached
    /// * `CommandFailed` - Cache rejected the read
    async fn is_valid(&self, token: &str) -> Result<bool, TokenCacheError>;
}
