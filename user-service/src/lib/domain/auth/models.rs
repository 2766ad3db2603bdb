use crate::domain::auth::errors::AuthError;

/// Username and plaintext password presented at login. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredential {
    pub username: String,
    pub password: String,
}

impl LoginCredential {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

/// Token taken from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    const SCHEME: &'static str = "Bearer ";

    /// Parse the raw `Authorization` header value.
    ///
    /// # Errors
    /// * `MissingToken` - Header is absent
    /// * `MalformedAuthorization` - Scheme is not `Bearer` or the token is empty
    pub fn from_authorization_header(header: Option<&str>) -> Result<Self, AuthError> {
        let header = header.ok_or(AuthError::MissingToken)?;

        let token = header
            .strip_prefix(Self::SCHEME)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MalformedAuthorization)?;

        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of a successful token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// Known valid through the token cache; signature not re-checked.
    Cached,
    /// Signature and expiry verified; cache re-warmed.
    Verified { username: String },
}
