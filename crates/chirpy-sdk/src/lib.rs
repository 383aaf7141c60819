//! Domain API for Chirpy.
//!
//! [`Repository`] layers the business rules (unique emails, password
//! checks, the 140-character limit) over a [`RecordStore`] and the
//! credential hasher. This is the entry point for the HTTP layer and the
//! command-line tool.

pub mod error;
pub mod repository;
pub mod text;

pub use error::{RepoError, RepoResult};
pub use repository::{Repository, User, MAX_POST_CHARS};
pub use text::clean_chirp;

// Re-export key types
pub use chirpy_store::{JsonFileStore, Post, PostId, RecordStore, UserId};
pub use chirpy_auth::CredentialHasher;
