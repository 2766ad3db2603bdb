//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the user service:
//! - Password hashing (Argon2id, tunable cost)
//! - JWT issuance and verification with an expiry claim
//! - Authentication coordination
//!
//! Everything here is synchronous and free of I/O. Token caching and user
//! lookup live in the service that embeds this crate.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenIssuer;
//!
//! let issuer = TokenIssuer::with_default_lifetime(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let issued = issuer.issue("alice").unwrap();
//! let claims = issuer.verify(&issued.token).unwrap();
//! assert_eq!(claims.username(), "alice");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, PasswordHasher, TokenIssuer};
//!
//! let issuer = TokenIssuer::with_default_lifetime(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let auth = Authenticator::new(PasswordHasher::new(), issuer);
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let issued = auth.authenticate("password123", &hash, "alice").unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&issued.token).unwrap();
//! assert_eq!(claims.username(), "alice");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenIssuer;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
