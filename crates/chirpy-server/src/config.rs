use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable that overrides [`ServerConfig::jwt_secret`].
pub const JWT_SECRET_ENV: &str = "CHIRPY_JWT_SECRET";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub static_root: PathBuf,
    pub jwt_secret: String,
    pub default_token_lifetime_secs: u64,
    pub max_token_lifetime_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: PathBuf::from("database.json"),
            static_root: PathBuf::from("."),
            jwt_secret: String::new(),
            default_token_lifetime_secs: 60 * 60,
            max_token_lifetime_secs: 24 * 60 * 60,
        }
    }
}

impl ServerConfig {
    /// Load a config from a TOML file. Missing keys take their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Take the signing secret from the environment when it is set.
    pub fn apply_env(mut self) -> Self {
        if let Ok(secret) = std::env::var(JWT_SECRET_ENV) {
            if !secret.is_empty() {
                self.jwt_secret = secret;
            }
        }
        self
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.jwt_secret.is_empty() {
            return Err(ServerError::Config(format!(
                "jwt_secret is empty; set it in the config file or {JWT_SECRET_ENV}"
            )));
        }
        if self.default_token_lifetime_secs == 0 || self.max_token_lifetime_secs == 0 {
            return Err(ServerError::Config("token lifetimes must be positive".into()));
        }
        Ok(())
    }

    /// Clamp a requested token lifetime into `[1, max_token_lifetime_secs]`.
    pub fn token_lifetime_secs(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_token_lifetime_secs)
            .clamp(1, self.max_token_lifetime_secs.max(1))
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("static_root", &self.static_root)
            .field("jwt_secret", &"<redacted>")
            .field("default_token_lifetime_secs", &self.default_token_lifetime_secs)
            .field("max_token_lifetime_secs", &self.max_token_lifetime_secs)
            .finish()
    }
}
