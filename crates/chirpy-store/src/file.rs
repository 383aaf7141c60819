use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::record::{Post, PostId, Snapshot, UserRecord};
use crate::traits::RecordStore;

/// Record store persisted as one JSON file.
///
/// Every operation holds a single mutex for its whole read-modify-write (or
/// read-only) sequence, so at most one operation touches the file at a time.
/// The store never calls back into itself while holding the lock.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write leaves the previous snapshot intact.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, writing an empty snapshot if no file exists.
    ///
    /// Missing parent directories are created. An existing file is left as
    /// is; it is decoded on first use.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let store = Self {
            path,
            lock: Mutex::new(()),
        };

        match fs::metadata(&store.path) {
            Ok(_) => debug!(path = %store.path.display(), "using existing snapshot"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                store.write_snapshot(&Snapshot::empty())?;
                info!(path = %store.path.display(), "created empty snapshot");
            }
            Err(e) => return Err(StoreError::io(&store.path, e)),
        }

        Ok(store)
    }

    /// Path of the backing snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full snapshot under the store lock.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        self.read_snapshot()
    }

    fn read_snapshot(&self) -> StoreResult<Snapshot> {
        let bytes = fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let snapshot = Snapshot::from_slice(&bytes).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let data = snapshot.to_json()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        tmp.write_all(&data)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        debug!(
            path = %self.path.display(),
            bytes = data.len(),
            posts = snapshot.posts.len(),
            users = snapshot.users.len(),
            "wrote snapshot"
        );
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn create_post(&self, body: &str) -> StoreResult<Post> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        let mut snapshot = self.read_snapshot()?;
        let post = snapshot.insert_post(body.to_string())?;
        self.write_snapshot(&snapshot)?;
        debug!(post_id = post.id, "created post");
        Ok(post)
    }

    fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<UserRecord> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        let mut snapshot = self.read_snapshot()?;
        let user = snapshot.insert_user(email.to_string(), password_hash.to_string())?;
        self.write_snapshot(&snapshot)?;
        debug!(user_id = user.id, "created user");
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        let snapshot = self.read_snapshot()?;
        Ok(snapshot.user_by_email(email).cloned())
    }

    fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        let snapshot = self.read_snapshot()?;
        Ok(snapshot.posts.into_values().collect())
    }

    fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        let _guard = self.lock.lock().expect("store mutex poisoned");
        let mut snapshot = self.read_snapshot()?;
        Ok(snapshot.posts.remove(&id))
    }
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn open_temp() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("database.json")).unwrap();
        (dir, store)
    }

    // -----------------------------------------------------------------------
    // Open
    // -----------------------------------------------------------------------

    #[test]
    fn open_creates_empty_snapshot() {
        let (_dir, store) = open_temp();
        assert!(store.path().exists());
        assert_eq!(store.snapshot().unwrap(), Snapshot::empty());
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("db.json");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.list_posts().unwrap().is_empty());
    }

    #[test]
    fn open_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, r#"{"posts":{"1":{"id":1,"body":"kept"}},"users":{}}"#).unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        let posts = store.list_posts().unwrap();
        assert_eq!(posts, vec![Post { id: 1, body: "kept".into() }]);
    }

    #[test]
    fn open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let err = JsonFileStore::open(blocker.join("db.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    #[test]
    fn create_and_get_post() {
        let (_dir, store) = open_temp();
        let post = store.create_post("hello world").unwrap();
        assert_eq!(post.id, 1);

        let read_back = store.get_post(post.id).unwrap().expect("should exist");
        assert_eq!(read_back, post);
    }

    #[test]
    fn get_missing_post_is_none() {
        let (_dir, store) = open_temp();
        store.create_post("only one").unwrap();
        assert!(store.get_post(2).unwrap().is_none());
        assert!(store.get_post(0).unwrap().is_none());
    }

    #[test]
    fn list_posts_returns_all() {
        let (_dir, store) = open_temp();
        for body in ["one", "two", "three"] {
            store.create_post(body).unwrap();
        }
        let posts = store.list_posts().unwrap();
        let bodies: Vec<_> = posts.iter().map(|p| p.body.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    #[test]
    fn create_and_find_user() {
        let (_dir, store) = open_temp();
        let user = store.create_user("a@example.com", "$hash").unwrap();
        assert_eq!(user.id, 1);

        let found = store.get_user_by_email("a@example.com").unwrap().expect("should exist");
        assert_eq!(found, user);
        assert!(store.get_user_by_email("b@example.com").unwrap().is_none());
    }

    #[test]
    fn create_user_rejects_duplicate_email() {
        let (_dir, store) = open_temp();
        store.create_user("a@example.com", "$hash").unwrap();
        let err = store.create_user("a@example.com", "$other").unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken(_)));
        assert_eq!(store.snapshot().unwrap().users.len(), 1);
    }

    #[test]
    fn users_and_posts_have_separate_id_spaces() {
        let (_dir, store) = open_temp();
        assert_eq!(store.create_post("p").unwrap().id, 1);
        assert_eq!(store.create_user("u@example.com", "h").unwrap().id, 1);
        assert_eq!(store.create_post("q").unwrap().id, 2);
    }

    // -----------------------------------------------------------------------
    // Persistence and failure
    // -----------------------------------------------------------------------

    #[test]
    fn reopen_reproduces_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let before = {
            let store = JsonFileStore::open(&path).unwrap();
            store.create_post("first").unwrap();
            store.create_user("a@example.com", "$hash").unwrap();
            store.create_post("second").unwrap();
            store.snapshot().unwrap()
        };

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.snapshot().unwrap(), before);
        assert_eq!(reopened.create_post("third").unwrap().id, 3);
    }

    #[test]
    fn invalid_json_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(matches!(store.list_posts(), Err(StoreError::Decode { .. })));
        assert!(matches!(store.create_post("x"), Err(StoreError::Decode { .. })));
        assert_eq!(fs::read(&path).unwrap(), b"{ not json");
    }

    #[test]
    fn invalid_utf8_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, b"{\"posts\":{\"1\":{\"id\":1,\"body\":\"\xff\xfe\"}}}").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(matches!(store.list_posts(), Err(StoreError::Decode { .. })));
    }

    #[test]
    fn exhausted_ids_leave_store_usable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let text = format!(r#"{{"posts":{{}},"users":{{}},"sequences":{{"posts":{},"users":0}}}}"#, u64::MAX);
        fs::write(&path, &text).unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(matches!(store.create_post("x"), Err(StoreError::Corrupt(_))));
        assert!(store.list_posts().unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), text);

        let user = store.create_user("a@example.com", "h").unwrap();
        assert_eq!(user.id, 1);
    }

    #[test]
    fn corrupt_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, r#"{"posts":{"1":{"id":5,"body":"x"}},"users":{}}"#).unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(matches!(store.get_post(1), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn missing_file_after_open_is_io_error() {
        let (_dir, store) = open_temp();
        fs::remove_file(store.path()).unwrap();
        assert!(matches!(store.list_posts(), Err(StoreError::Io { .. })));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (dir, store) = open_temp();
        for i in 0..5 {
            store.create_post(&format!("post {i}")).unwrap();
        }
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_creates_assign_distinct_ids() {
        let (_dir, store) = open_temp();
        let store = Arc::new(store);
        let workers = 8;
        let per_worker = 5;

        let handles: Vec<_> = (0..workers)
            .map(|w| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..per_worker)
                        .map(|i| store.create_post(&format!("w{w}-{i}")).unwrap().id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: Vec<PostId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let unique: HashSet<_> = ids.iter().copied().collect();

        assert_eq!(ids.len(), workers * per_worker);
        assert_eq!(unique.len(), ids.len());
        assert_eq!(store.list_posts().unwrap().len(), ids.len());
    }

    #[test]
    fn concurrent_duplicate_registrations_admit_one() {
        let (_dir, store) = open_temp();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.create_user("race@example.com", "$hash").is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(store.snapshot().unwrap().users.len(), 1);
    }
}
