//! Persistent client-side storage for the bearer token and cached user.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::models::User;
use crate::utils::jwt::Token;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "access_token";
/// Storage key of the serialized current user.
pub const USER_KEY: &str = "current_user";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key-value storage with local-storage semantics.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// A JSON object file holding every key. Writes go through a temporary file
/// and a rename so a crash never leaves a half-written session behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the storage file. A missing, unreadable or corrupt file starts
    /// out empty rather than failing startup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt session storage");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read session storage");
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, contents).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.remove(key).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.persist(&entries)
    }
}

/// Typed access to the token and cached user. No validation happens here.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStorage>,
}

impl TokenStore {
    pub fn new(backend: impl KeyValueStorage + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    pub fn get(&self) -> Option<Token> {
        self.backend
            .get(TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .map(Token::new)
    }

    pub fn has_token(&self) -> bool {
        self.get().is_some()
    }

    pub fn set(&self, token: &Token) -> Result<(), StoreError> {
        self.backend.set(TOKEN_KEY, token.as_str())
    }

    /// The cached user. Malformed JSON reads as no user.
    pub fn user(&self) -> Option<User> {
        let raw = self.backend.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed cached user");
                None
            }
        }
    }

    pub fn set_user(&self, user: &User) -> Result<(), StoreError> {
        let json = serde_json::to_string(user)?;
        self.backend.set(USER_KEY, &json)
    }

    /// Removes both keys. Both removals are attempted even if the first one
    /// fails; the first failure is reported.
    pub fn clear(&self) -> Result<(), StoreError> {
        let token_result = self.backend.remove(TOKEN_KEY);
        let user_result = self.backend.remove(USER_KEY);
        token_result.and(user_result)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.has_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            email: "buyer@mall.test".to_string(),
            role: Role::User,
            profile: None,
            shop_id: None,
            is_active: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_memory_round_trip_and_clear() {
        let store = TokenStore::in_memory();
        assert!(store.get().is_none());

        store.set(&Token::new("abc")).unwrap();
        store.set_user(&user()).unwrap();
        assert_eq!(store.get().unwrap().as_str(), "abc");
        assert_eq!(store.user().unwrap().id, "u-1");

        store.clear().unwrap();
        assert!(store.get().is_none());
        assert!(store.user().is_none());

        // Clearing an empty store is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_malformed_user_reads_as_none() {
        let backend = MemoryStorage::default();
        backend.set(USER_KEY, "{not json").unwrap();
        let store = TokenStore::new(backend);
        assert!(store.user().is_none());
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let backend = MemoryStorage::default();
        backend.set(TOKEN_KEY, "").unwrap();
        let store = TokenStore::new(backend);
        assert!(!store.has_token());
    }

    #[test]
    fn test_file_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = TokenStore::new(FileStorage::open(&path));
        store.set(&Token::new("persisted")).unwrap();
        store.set_user(&user()).unwrap();

        let reopened = TokenStore::new(FileStorage::open(&path));
        assert_eq!(reopened.get().unwrap().as_str(), "persisted");
        assert_eq!(reopened.user().unwrap().email, "buyer@mall.test");

        reopened.clear().unwrap();
        let cleared = TokenStore::new(FileStorage::open(&path));
        assert!(cleared.get().is_none());
        assert!(cleared.user().is_none());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "this is not json").unwrap();

        let storage = FileStorage::open(&path);
        assert!(storage.get(TOKEN_KEY).is_none());
        storage.set(TOKEN_KEY, "fresh").unwrap();
        assert_eq!(FileStorage::open(&path).get(TOKEN_KEY).as_deref(), Some("fresh"));
    }

    #[test]
    fn test_removing_from_missing_file_does_not_create_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::open(&path);
        storage.remove(TOKEN_KEY).unwrap();
        assert!(!path.exists());
    }
}
