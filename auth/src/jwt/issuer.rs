use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;

use super::claims::Claims;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Signed token together with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens for a username.
///
/// Holds the process-wide signing secret for its whole lifetime.
pub struct TokenIssuer {
    handler: JwtHandler,
    lifetime: Duration,
}

impl TokenIssuer {
    pub const DEFAULT_LIFETIME_HOURS: i64 = 24;

    /// Create a token issuer.
    ///
    /// # Arguments
    /// * `secret` - HS256 signing secret
    /// * `lifetime` - Validity window of every issued token
    ///
    /// # Errors
    /// * `InvalidConfiguration` - Secret is empty or lifetime is not positive
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, JwtError> {
        if lifetime <= Duration::zero() {
            return Err(JwtError::InvalidConfiguration(
                "token lifetime must be positive".to_string(),
            ));
        }

        Ok(Self {
            handler: JwtHandler::new(secret)?,
            lifetime,
        })
    }

    /// Create a token issuer with the default 24 hour lifetime.
    pub fn with_default_lifetime(secret: &[u8]) -> Result<Self, JwtError> {
        Self::new(secret, Duration::hours(Self::DEFAULT_LIFETIME_HOURS))
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `username` expiring one lifetime from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, username: &str) -> Result<IssuedToken, JwtError> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token as if it had been issued at `issued_at`.
    ///
    /// Claims carry whole seconds, so `issued_at` is truncated first.
    pub fn issue_at(
        &self,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let issued_at = issued_at.trunc_subsecs(0);
        let claims = Claims::for_user(username, issued_at, self.lifetime);
        let token = self.handler.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: issued_at + self.lifetime,
        })
    }

    /// Verify signature and expiry of a presented token.
    ///
    /// # Returns
    /// Decoded claims; the username is in `sub`
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature or malformed token
    /// * `TokenExpired` - Token is past its expiry
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.handler.decode(token)
    }
}
