use crate::error::StoreResult;
use crate::record::{Post, PostId, UserRecord};

/// Durable, serialized access to users and posts.
///
/// All implementations must satisfy these invariants:
/// - Each call is atomic with respect to every other call on the same
///   instance: at most one operation runs at a time.
/// - Identifiers are strictly positive and unique within their collection.
/// - A failed call leaves the persisted state unchanged.
/// - Absence is reported as `Ok(None)`, never as a default-valued record.
pub trait RecordStore: Send + Sync {
    /// Insert a post with the next free identifier and return it.
    fn create_post(&self, body: &str) -> StoreResult<Post>;

    /// Insert a user with the next free identifier and return it.
    ///
    /// Fails with `StoreError::EmailTaken` if another user has `email`.
    fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<UserRecord>;

    /// Look up a user by exact email match.
    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// All posts, ordered by identifier.
    fn list_posts(&self) -> StoreResult<Vec<Post>>;

    /// Look up a post by identifier.
    fn get_post(&self, id: PostId) -> StoreResult<Option<Post>>;
}
