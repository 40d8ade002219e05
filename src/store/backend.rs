use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use log::warn;
use crate::error::StorageError;

/// Key-value blob persistence, the shape of browser local storage
pub trait BlobStorage {
    /// Returns the stored text, or None when nothing is stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Replaces whatever is stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Storage that lives only as long as the value itself
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl BlobStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("could not read {}: {}; treating as empty", path.display(), e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let write_err = |source| StorageError::Write { path: path.clone(), source };

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        // Write next to the target and rename so readers never see half a document
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove { path, source }),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::scratch_dir;

    #[test]
    fn memory_storage_set_get_remove() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);
        storage.set("k", "{}").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("{}"));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k"), None);
        storage.remove("k").unwrap();
    }

    #[test]
    fn file_storage_creates_dir_and_replaces_content() {
        let dir = scratch_dir("backend");
        let mut storage = FileStorage::new(&dir);

        assert_eq!(storage.get("db"), None);
        storage.set("db", r#"{"a":[]}"#).unwrap();
        storage.set("db", r#"{"b":[]}"#).unwrap();
        assert_eq!(storage.get("db").as_deref(), Some(r#"{"b":[]}"#));
        assert!(storage.path_for("db").exists());
        assert!(!dir.join(".db.json.tmp").exists());

        storage.remove("db").unwrap();
        assert_eq!(storage.get("db"), None);
        storage.remove("db").unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
