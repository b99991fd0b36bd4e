//! Session storage adapters.
//!
//! The file adapter keeps one file per key under a session directory so
//! the mirrored token can be inspected with ordinary tools.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use procura_application::ports::{SessionStorage, SessionStorageError};
use tokio::fs;

/// Stores each key as a file in a directory.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    /// Creates storage rooted at `dir`. The directory is created on first
    /// write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slots.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, SessionStorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(SessionStorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(&path, value).await?;
        tracing::debug!(path = %path.display(), "Session slot written");
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_item(&self, key: &str) -> Result<(), SessionStorageError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps slots in process memory.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        Ok(self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn remove_item(&self, key: &str) -> Result<(), SessionStorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_roundtrip_and_remove() {
        let temp = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(temp.path().join("session"));

        assert_eq!(storage.get_item("kc_token").await.unwrap(), None);

        storage.set_item("kc_token", "eyJhbGciOi.a.b").await.unwrap();
        assert_eq!(
            storage.get_item("kc_token").await.unwrap(),
            Some("eyJhbGciOi.a.b".to_string())
        );
        assert!(temp.path().join("session").join("kc_token").is_file());

        storage.remove_item("kc_token").await.unwrap();
        assert_eq!(storage.get_item("kc_token").await.unwrap(), None);
        storage.remove_item("kc_token").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(temp.path());

        for key in ["", "../escape", "a/b", "kc token"] {
            assert!(matches!(
                storage.set_item(key, "x").await,
                Err(SessionStorageError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemorySessionStorage::new();
        storage.set_item("kc_token", "t1").await.unwrap();
        storage.set_item("kc_token", "t2").await.unwrap();
        assert_eq!(storage.get_item("kc_token").await.unwrap(), Some("t2".to_string()));
        storage.remove_item("kc_token").await.unwrap();
        assert_eq!(storage.get_item("kc_token").await.unwrap(), None);
    }
}
