//! Credential primitives for Chirpy.
//!
//! Provides salted Argon2id password hashing, HS256-signed identity tokens
//! with issuer and expiry, and `Authorization: Bearer` header parsing.
//!
//! Everything here is pure and lock-free; callers may use it from any number
//! of threads at once. All crypto wraps established libraries.

pub mod bearer;
pub mod error;
pub mod password;
pub mod token;

pub use bearer::{extract_bearer_token, BEARER_SCHEME};
pub use error::{AuthError, AuthResult};
pub use password::CredentialHasher;
pub use token::{issue_token, issue_token_at, validate_token, Claims, TOKEN_ISSUER};
