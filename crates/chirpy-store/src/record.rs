use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Identifier of a [`Post`]. Always strictly positive.
pub type PostId = u64;

/// Identifier of a [`UserRecord`]. Always strictly positive.
pub type UserId = u64;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A short text record. The identifier is assigned at creation and never
/// changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub body: String,
}

/// A registered account as persisted, including its password hash.
///
/// This type never leaves the storage and credential layers; outward-facing
/// code works with a view that omits `password_hash`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    #[serde(alias = "password")]
    pub password_hash: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Last identifier issued per collection.
///
/// Kept alongside the records so that identifiers stay unique even if a
/// collection ever shrinks or an insert is rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    #[serde(default)]
    pub posts: u64,
    #[serde(default)]
    pub users: u64,
}

/// The complete persisted state: every post and every user.
///
/// Maps are keyed by identifier, which serializes as a decimal string key
/// in JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, alias = "chirps")]
    pub posts: BTreeMap<PostId, Post>,
    #[serde(default)]
    pub users: BTreeMap<UserId, UserRecord>,
    #[serde(default)]
    pub sequences: Sequences,
}

impl Snapshot {
    /// An empty snapshot, as written on first run.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode a snapshot from JSON text. Call [`Snapshot::validate`] afterwards.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Self::from_slice(text.as_bytes())
    }

    /// Decode a snapshot from raw file bytes; invalid UTF-8 is a decode error.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode the snapshot as compact JSON.
    pub fn to_json(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Check the invariants the schema alone cannot express.
    ///
    /// Every map key must equal its record's id, ids must be positive, and
    /// emails must be unique.
    pub fn validate(&self) -> StoreResult<()> {
        for (key, post) in &self.posts {
            if *key == 0 || post.id != *key {
                return Err(StoreError::Corrupt(format!(
                    "post keyed {key} has id {}",
                    post.id
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for (key, user) in &self.users {
            if *key == 0 || user.id != *key {
                return Err(StoreError::Corrupt(format!(
                    "user keyed {key} has id {}",
                    user.id
                )));
            }
            if !seen.insert(user.email.as_str()) {
                return Err(StoreError::Corrupt(format!(
                    "duplicate email {}",
                    user.email
                )));
            }
        }
        Ok(())
    }

    /// Find a user by exact email match.
    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.values().find(|u| u.email == email)
    }

    /// Insert a new post with the next identifier and return it.
    ///
    /// Fails with [`StoreError::Corrupt`] once the identifier space is used up.
    pub fn insert_post(&mut self, body: String) -> StoreResult<Post> {
        let id = Self::advance(&mut self.sequences.posts, self.posts.keys().next_back())?;
        let post = Post { id, body };
        self.posts.insert(id, post.clone());
        Ok(post)
    }

    /// Insert a new user with the next identifier and return it.
    ///
    /// Fails with [`StoreError::EmailTaken`] if the email is already in use;
    /// the snapshot is left untouched in that case.
    pub fn insert_user(&mut self, email: String, password_hash: String) -> StoreResult<UserRecord> {
        if self.user_by_email(&email).is_some() {
            return Err(StoreError::EmailTaken(email));
        }
        let id = Self::advance(&mut self.sequences.users, self.users.keys().next_back())?;
        let user = UserRecord {
            id,
            email,
            password_hash,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    // Next id is one past both the stored sequence and the largest key, so
    // files written without `sequences` still never reuse an id.
    fn advance(sequence: &mut u64, max_key: Option<&u64>) -> StoreResult<u64> {
        let floor = max_key.copied().unwrap_or(0);
        let next = (*sequence)
            .max(floor)
            .checked_add(1)
            .ok_or_else(|| StoreError::Corrupt("identifier space exhausted".into()))?;
        *sequence = next;
        Ok(next)
    }
}
