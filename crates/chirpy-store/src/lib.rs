//! File-backed record storage for Chirpy.
//!
//! The whole persisted state is a single JSON document, the [`Snapshot`].
//! Every store call reads the full snapshot, applies at most one change,
//! and writes the full snapshot back.
//!
//! # Record Types
//!
//! - [`Post`] -- a short text record ("chirp")
//! - [`UserRecord`] -- a registered account including its password hash
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordStore`] trait:
//!
//! - [`JsonFileStore`] -- one JSON file on disk, guarded by a single mutex
//!
//! # Design Rules
//!
//! 1. Identifiers are strictly positive and never reused.
//! 2. No two users share an email.
//! 3. At most one store operation runs at a time per store instance.
//! 4. Writes go to a temporary file that is renamed over the target.
//! 5. All I/O and decode errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod record;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use record::{Post, PostId, Sequences, Snapshot, UserId, UserRecord};
pub use traits::RecordStore;
