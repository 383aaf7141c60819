use std::path::PathBuf;

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not valid JSON for the snapshot schema.
    #[error("cannot decode snapshot {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot decoded but breaks a record invariant.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    /// Serialization failure while encoding the snapshot.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Another user already holds this email.
    #[error("email already registered: {0}")]
    EmailTaken(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
