use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("user not found")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    #[error("store error: {0}")]
    Store(#[from] chirpy_store::StoreError),

    #[error("credential error: {0}")]
    Auth(#[from] chirpy_auth::AuthError),
}

pub type RepoResult<T> = Result<T, RepoError>;
