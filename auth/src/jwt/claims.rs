use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// JWT claims binding a username to an absolute expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Create claims for a user with an expiration relative to `issued_at`.
    ///
    /// # Arguments
    /// * `username` - Subject of the token
    /// * `issued_at` - Issuance instant
    /// * `lifetime` - Time until the token expires
    pub fn for_user(username: impl ToString, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        let expiration = issued_at + lifetime;

        Self {
            sub: username.to_string(),
            exp: expiration.timestamp(),
            iat: issued_at.timestamp(),
        }
    }

    /// Username carried in the subject claim.
    pub fn username(&self) -> &str {
        &self.sub
    }

    /// Expiration as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        let remaining = Duration::seconds(self.exp - now.timestamp());
        remaining.max(Duration::zero())
    }
}
