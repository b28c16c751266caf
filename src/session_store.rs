//! Storage for the session token issued by the backend.
//!
//! The API client is handed a [`SessionStore`] at construction.  Every
//! successful login or register writes through it, and every request reads
//! from it.  The store does not interpret the token.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use directories::ProjectDirs;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::{Error, Result};
use crate::observability::SESSION_TOKEN_WRITES;

/// Key under which the token is persisted.
pub const TOKEN_KEY: &str = "token";

const SESSION_FILE_NAME: &str = "session.json";

/// Holder of the current session token.
pub trait SessionStore: Send + Sync {
    /// Returns the current token, or `None` when logged out.
    fn token(&self) -> Result<Option<String>>;

    /// Stores `token`, replacing any previous value.
    fn set_token(&self, token: &str) -> Result<()>;

    /// Removes the token.
    fn clear_token(&self) -> Result<()>;
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn token(&self) -> Result<Option<String>> {
        (**self).token()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        (**self).set_token(token)
    }

    fn clear_token(&self) -> Result<()> {
        (**self).clear_token()
    }
}

///////////////////////////////////////////// MemoryStore ////////////////////////////////////////////

/// An in-process store.  Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        // The slot holds a plain value; a panic elsewhere cannot leave it half-written.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.lock().clone())
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self.lock() = Some(token.to_string());
        SESSION_TOKEN_WRITES.click();
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        *self.lock() = None;
        Ok(())
    }
}

////////////////////////////////////////////// FileStore /////////////////////////////////////////////

/// A store persisted as a JSON object of string keys.
///
/// The token lives under [`TOKEN_KEY`]; other keys in the file are left alone.
/// A missing file reads as logged out.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    /// Creates a store backed by the file at `path`.  The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Returns the per-user default session file location.
    pub fn default_location() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("net", "rescrv", "querent").ok_or_else(|| {
            Error::io(
                "could not determine a home directory for the session file",
                io::Error::new(io::ErrorKind::NotFound, "no home directory"),
            )
        })?;
        Ok(dirs.data_dir().join(SESSION_FILE_NAME))
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(Error::io("failed to read session file", err)),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::serialization(
                "session file is not a JSON object",
                None,
            )),
            Err(err) => Err(Error::serialization(
                "failed to parse session file",
                Some(Box::new(err)),
            )),
        }
    }

    /// Entries to rewrite, and whether the file on disk was malformed.
    ///
    /// A file that does not parse is replaced rather than left to block every
    /// later write.
    fn writable_entries(&self) -> Result<(Map<String, Value>, bool)> {
        match self.read_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(err @ Error::Serialization { .. }) => {
                warn!(path = %self.path.display(), error = %err, "replacing malformed session file");
                Ok((Map::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|err| Error::io("failed to create session directory", err))?;
        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|err| Error::io("failed to create temporary session file", err))?;
        serde_json::to_writer_pretty(&mut tmp, entries).map_err(|err| {
            Error::serialization("failed to serialize session file", Some(Box::new(err)))
        })?;
        tmp.write_all(b"\n")
            .and_then(|()| tmp.flush())
            .map_err(|err| Error::io("failed to write session file", err))?;
        tmp.persist(&self.path)
            .map_err(|err| Error::io("failed to replace session file", err.error))?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn token(&self) -> Result<Option<String>> {
        let _guard = self.lock();
        let entries = self.read_entries()?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .map(String::from))
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let _guard = self.lock();
        let (mut entries, _) = self.writable_entries()?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(&entries)?;
        SESSION_TOKEN_WRITES.click();
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        let _guard = self.lock();
        let (mut entries, malformed) = self.writable_entries()?;
        if entries.remove(TOKEN_KEY).is_none() && !malformed {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_clear() {
        let store = MemoryStore::new();
        assert_eq!(store.token().unwrap(), None);

        store.set_token("abc").unwrap();
        assert_eq!(store.token().unwrap(), Some("abc".to_string()));

        store.set_token("def").unwrap();
        assert_eq!(store.token().unwrap(), Some("def".to_string()));

        store.clear_token().unwrap();
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn memory_store_clones_share_slot() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.set_token("shared").unwrap();
        assert_eq!(view.token().unwrap(), Some("shared".to_string()));
    }

    #[test]
    fn memory_store_does_not_validate() {
        let store = MemoryStore::with_token("");
        assert_eq!(store.token().unwrap(), Some(String::new()));
        store.set_token("  spaces and ☃ ").unwrap();
        assert_eq!(store.token().unwrap(), Some("  spaces and ☃ ".to_string()));
    }

    #[test]
    fn file_store_missing_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert_eq!(store.token().unwrap(), None);
        store.clear_token().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileStore::new(&path).set_token("abc").unwrap();
        let reopened = FileStore::new(&path);
        assert_eq!(reopened.token().unwrap(), Some("abc".to_string()));

        reopened.clear_token().unwrap();
        assert_eq!(FileStore::new(&path).token().unwrap(), None);
    }

    #[test]
    fn file_store_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FileStore::new(&path);
        store.set_token("abc").unwrap();
        store.clear_token().unwrap();

        let contents: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(contents, serde_json::json!({"theme": "dark"}));
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let err = FileStore::new(&path).token().unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn file_store_overwrites_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(store.token().is_err());
        store.set_token("abc").unwrap();
        assert_eq!(store.token().unwrap(), Some("abc".to_string()));
    }

    #[test]
    fn file_store_clears_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#""just a string""#).unwrap();

        let store = FileStore::new(&path);
        store.clear_token().unwrap();
        assert_eq!(store.token().unwrap(), None);
        let contents: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(contents, serde_json::json!({}));
    }

    #[test]
    fn arc_dyn_store_forwards() {
        let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
        store.set_token("abc").unwrap();
        assert_eq!(store.token().unwrap(), Some("abc".to_string()));
    }
}
