use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::BlobError;
use crate::traits::BlobStore;

/// FileStore is a BlobStore implementation backed by the local filesystem.
///
/// Keys are mapped to paths under `base_dir`:
///   key "contracts/abc123.pdf" → `{base_dir}/contracts/abc123.pdf`
///
/// Parent directories are created automatically on `put`.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new FileStore rooted at `base_dir`.
    /// The directory is created if it doesn't exist.
    pub fn open(base_dir: &Path) -> Result<Self, BlobError> {
        fs::create_dir_all(base_dir).map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Resolve a key to a filesystem path.
    ///
    /// Keys must be relative and may only contain normal components —
    /// `..`, leading `/` and drive prefixes are rejected so a key can
    /// never escape `base_dir`.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        if key.is_empty() {
            return Err(BlobError::InvalidKey("empty key".into()));
        }
        let rel = Path::new(key);
        for component in rel.components() {
            match component {
                Component::Normal(_) => {}
                _ => return Err(BlobError::InvalidKey(key.to_string())),
            }
        }
        Ok(self.base_dir.join(rel))
    }
}

impl BlobStore for FileStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BlobError::Io(e.to_string()))?;
        }
        fs::write(&path, data).map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let path = self.resolve(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        let data = fs::read(&path).map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(Some(data))
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| BlobError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, BlobError> {
        let path = self.resolve(key)?;
        Ok(path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn put_get_delete() {
        let (_dir, store) = open_store();
        assert!(!store.exists("contracts/a.pdf").unwrap());
        store.put("contracts/a.pdf", b"%PDF-1.7").unwrap();
        assert!(store.exists("contracts/a.pdf").unwrap());
        assert_eq!(store.get("contracts/a.pdf").unwrap().unwrap(), b"%PDF-1.7");
        store.delete("contracts/a.pdf").unwrap();
        assert!(store.get("contracts/a.pdf").unwrap().is_none());
    }

    #[test]
    fn rejects_traversal_keys() {
        let (_dir, store) = open_store();
        assert!(store.put("../escape.pdf", b"x").is_err());
        assert!(store.put("/abs.pdf", b"x").is_err());
        assert!(store.put("", b"x").is_err());
        assert!(store.put("a/../../b.pdf", b"x").is_err());
    }
}
