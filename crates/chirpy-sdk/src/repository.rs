use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use chirpy_auth::CredentialHasher;
use chirpy_store::{JsonFileStore, Post, PostId, RecordStore, StoreError, UserId, UserRecord};

use crate::error::{RepoError, RepoResult};

/// Longest accepted post body, counted in characters.
pub const MAX_POST_CHARS: usize = 140;

/// A user as seen outside the storage layer. Never carries the password hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
        }
    }
}

/// Domain operations over a record store.
///
/// Constructed explicitly and shared by handle; there is no global instance.
pub struct Repository {
    store: Arc<dyn RecordStore>,
    hasher: CredentialHasher,
}

impl Repository {
    /// Repository over `store` with the default password hasher.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_hasher(store, CredentialHasher::new())
    }

    pub fn with_hasher(store: Arc<dyn RecordStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    /// Open (or create) a JSON snapshot at `path` and wrap it.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let store = JsonFileStore::open(path)?;
        Ok(Self::new(Arc::new(store)))
    }

    // ---- Users ----

    /// Register a new user with a hashed password.
    pub fn register_user(&self, email: &str, password: &str) -> RepoResult<User> {
        if self.store.get_user_by_email(email)?.is_some() {
            return Err(RepoError::UserExists(email.to_string()));
        }

        let password_hash = self.hasher.hash(password)?;
        let record = self
            .store
            .create_user(email, &password_hash)
            .map_err(|e| match e {
                StoreError::EmailTaken(email) => RepoError::UserExists(email),
                other => RepoError::Store(other),
            })?;

        info!(user_id = record.id, "registered user");
        Ok(record.into())
    }

    /// Check an email/password pair and return the matching user.
    pub fn authenticate_user(&self, email: &str, password: &str) -> RepoResult<User> {
        let record = self
            .store
            .get_user_by_email(email)?
            .ok_or(RepoError::UserNotFound)?;

        if !self.hasher.verify(password, &record.password_hash)? {
            debug!(user_id = record.id, "password mismatch");
            return Err(RepoError::WrongPassword);
        }

        debug!(user_id = record.id, "authenticated user");
        Ok(record.into())
    }

    /// Look up a user by email. Absence is `Ok(None)`.
    pub fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.store.get_user_by_email(email)?.map(User::from))
    }

    // ---- Posts ----

    /// Reject bodies longer than [`MAX_POST_CHARS`] characters.
    pub fn validate_post_body(body: &str) -> RepoResult<()> {
        let chars = body.chars().count();
        if chars > MAX_POST_CHARS {
            return Err(RepoError::Validation(format!(
                "post is too long: {chars} characters (max {MAX_POST_CHARS})"
            )));
        }
        Ok(())
    }

    /// Store a new post after checking its length.
    pub fn create_post(&self, body: &str) -> RepoResult<Post> {
        Self::validate_post_body(body)?;
        let post = self.store.create_post(body)?;
        info!(post_id = post.id, "created post");
        Ok(post)
    }

    /// All posts, ordered by identifier.
    pub fn list_posts(&self) -> RepoResult<Vec<Post>> {
        Ok(self.store.list_posts()?)
    }

    /// Fetch one post; a missing id is [`RepoError::NotFound`].
    pub fn get_post(&self, id: PostId) -> RepoResult<Post> {
        self.store
            .get_post(id)?
            .ok_or(RepoError::NotFound { kind: "post", id })
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}
