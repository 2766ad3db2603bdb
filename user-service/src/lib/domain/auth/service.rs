use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::IssuedToken;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::BearerToken;
use crate::domain::auth::models::LoginCredential;
use crate::domain::auth::models::TokenStatus;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::TokenCache;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;

/// Coordinates login and token verification across the user repository,
/// the authenticator and the token cache.
pub struct AuthService<UR, TC>
where
    UR: UserRepository,
    TC: TokenCache,
{
    repository: Arc<UR>,
    token_cache: Arc<TC>,
    authenticator: Arc<Authenticator>,
}

impl<UR, TC> AuthService<UR, TC>
where
    UR: UserRepository,
    TC: TokenCache,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User lookup by username
    /// * `token_cache` - Fast-path record of valid tokens
    /// * `authenticator` - Password verification and token signing
    pub fn new(
        repository: Arc<UR>,
        token_cache: Arc<TC>,
        authenticator: Arc<Authenticator>,
    ) -> Self {
        Self {
            repository,
            token_cache,
            authenticator,
        }
    }
}

/// Time from `now` until `expires_at`, zero once passed.
fn remaining_ttl(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (expires_at - now).to_std().unwrap_or(Duration::ZERO)
}

#[async_trait]
impl<UR, TC> AuthServicePort for AuthService<UR, TC>
where
    UR: UserRepository,
    TC: TokenCache,
{
    async fn login(&self, credential: LoginCredential) -> Result<IssuedToken, AuthError> {
        // A name that could never have been stored is the same as an unknown user
        let user = match Username::new(credential.username) {
            Ok(username) => self.repository.find_by_username(&username).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            return Err(self
                .authenticator
                .reject_unknown_user(&credential.password)
                .into());
        };

        let issued = self.authenticator.authenticate(
            &credential.password,
            &user.password_hash,
            user.username.as_str(),
        )?;

        // Verification relies on the cache reflecting every issued token
        let ttl = remaining_ttl(issued.expires_at, Utc::now());
        self.token_cache.mark_valid(&issued.token, ttl).await?;

        tracing::info!(
            user_id = %user.id,
            expires_at = %issued.expires_at,
            "Login succeeded"
        );

        Ok(issued)
    }

    async fn verify(&self, token: &BearerToken) -> Result<TokenStatus, AuthError> {
        match self.token_cache.is_valid(token.as_str()).await {
            Ok(true) => {
                tracing::debug!("Token verified from cache");
                return Ok(TokenStatus::Cached);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Token cache lookup failed, verifying signature");
            }
        }

        let claims = self.authenticator.validate_token(token.as_str())?;

        let ttl = claims
            .remaining_lifetime(Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        if ttl.is_zero() {
            return Err(AuthError::TokenExpired);
        }

        self.token_cache.mark_valid(token.as_str(), ttl).await?;

        tracing::debug!(username = %claims.sub, "Token verified by signature, cache re-warmed");

        Ok(TokenStatus::Verified {
            username: claims.sub,
        })
    }
}
