use thiserror::Error;

/// Errors from credential and token operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Bad signature, malformed token, wrong issuer, or expired.
    #[error("invalid token")]
    InvalidToken,

    /// No authorization header value was supplied.
    #[error("authorization header missing")]
    MissingHeader,

    /// The header is not of the form `Bearer <token>`.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// Internal failure of the password hash function or a stored hash
    /// that cannot be parsed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Internal failure while signing a token.
    #[error("token signing failed: {0}")]
    Signing(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
