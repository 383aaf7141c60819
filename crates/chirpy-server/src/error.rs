use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use chirpy_auth::AuthError;
use chirpy_sdk::RepoError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Repo(RepoError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Repo(RepoError::UserNotFound | RepoError::WrongPassword) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Repo(RepoError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Repo(RepoError::UserExists(_)) => StatusCode::CONFLICT,
            Self::Auth(AuthError::MalformedHeader) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::MissingHeader | AuthError::InvalidToken) => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
