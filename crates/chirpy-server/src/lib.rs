//! HTTP server for Chirpy.
//!
//! Exposes user registration, login with bearer tokens, and chirp posting
//! and reading as a JSON API, plus a readiness probe and static files.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{ServerConfig, JWT_SECRET_ENV};
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::ChirpyServer;
pub use state::AppState;
