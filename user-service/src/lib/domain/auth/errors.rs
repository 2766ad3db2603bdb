use thiserror::Error;

use crate::user::errors::UserError;

/// Error for token cache operations.
#[derive(Debug, Clone, Error)]
pub enum TokenCacheError {
    #[error("Token cache unavailable: {0}")]
    Unavailable(String),

    #[error("Token cache command failed: {0}")]
    CommandFailed(String),
}

/// Error for login and token verification.
///
/// Variants split into rejections (a judgment on the presented credential)
/// and internal failures (see [`AuthError::is_rejection`]).
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Rejections
    #[error("Authentication failed")]
    InvalidCredentials,

    #[error("Authorization header is missing")]
    MissingToken,

    #[error("Authorization header is not a bearer token")]
    MalformedAuthorization,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token is expired")]
    TokenExpired,

    // Internal failures
    #[error("Password verification failed: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("User lookup failed: {0}")]
    Repository(#[from] UserError),

    #[error("Token cache failure: {0}")]
    Cache(#[from] TokenCacheError),
}

impl AuthError {
    /// Whether the error is a validity judgment rather than an internal failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::MalformedAuthorization
                | AuthError::InvalidToken(_)
                | AuthError::TokenExpired
        )
    }
}

impl From<auth::JwtError> for AuthError {
    fn from(err: auth::JwtError) -> Self {
        match err {
            auth::JwtError::TokenExpired => AuthError::TokenExpired,
            auth::JwtError::InvalidToken(reason) => AuthError::InvalidToken(reason),
            auth::JwtError::EncodingFailed(reason)
            | auth::JwtError::InvalidConfiguration(reason) => AuthError::Signing(reason),
        }
    }
}

impl From<auth::AuthenticationError> for AuthError {
    fn from(err: auth::AuthenticationError) -> Self {
        match err {
            auth::AuthenticationError::InvalidCredentials => AuthError::InvalidCredentials,
            auth::AuthenticationError::PasswordError(e) => AuthError::Password(e),
            auth::AuthenticationError::JwtError(e) => AuthError::from(e),
        }
    }
}
