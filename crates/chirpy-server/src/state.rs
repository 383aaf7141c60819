use std::path::PathBuf;
use std::sync::Arc;

use chirpy_sdk::{RepoResult, Repository};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: ServerConfig) -> Self {
        Self {
            repo,
            config: Arc::new(config),
        }
    }

    /// Open the repository named by `config.database_path`.
    pub fn from_config(config: ServerConfig) -> ServerResult<Self> {
        let repo = Repository::open(&config.database_path)?;
        Ok(Self::new(Arc::new(repo), config))
    }

    pub fn jwt_secret(&self) -> &[u8] {
        self.config.jwt_secret.as_bytes()
    }

    pub fn static_root(&self) -> PathBuf {
        self.config.static_root.clone()
    }

    /// Run a repository call on the blocking pool.
    ///
    /// Store calls do synchronous file I/O under a mutex and password
    /// hashing is CPU-bound, so neither runs on the async workers.
    pub async fn with_repo<T, F>(&self, f: F) -> ServerResult<T>
    where
        F: FnOnce(&Repository) -> RepoResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || f(&repo))
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?
            .map_err(ServerError::from)
    }
}
