//! Key-value slots the watch list is persisted in.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A store of named text slots
pub trait Storage: Send + Sync + fmt::Debug {
    /// Read a slot; `None` if it was never written
    fn load(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace a slot's content
    fn save(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each slot as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slots
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

/// In-memory slots; clones share the same slots
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw content of a slot
    pub fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().unwrap().get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_missing_slot() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.load("watched").unwrap(), None);
    }

    #[test]
    fn test_file_storage_creates_dir_and_replaces() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));

        storage.save("watched", "[1]").unwrap();
        storage.save("watched", "[2]").unwrap();

        assert_eq!(storage.load("watched").unwrap().as_deref(), Some("[2]"));
        assert!(storage.path_for("watched").is_file());
        assert!(!storage.path_for("watched").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_memory_storage_clones_share_slots() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.save("watched", "[]").unwrap();
        assert_eq!(other.load("watched").unwrap().as_deref(), Some("[]"));
    }
}
