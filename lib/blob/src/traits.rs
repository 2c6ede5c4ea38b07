use crate::error::BlobError;

/// BlobStore provides storage for binary files (signed contract PDFs,
/// uploaded attachments).
///
/// Keys are path-like strings: `contracts/8f3a....pdf`. The default
/// implementation (`FileStore`) maps keys to local filesystem paths;
/// an object-storage backend can be swapped in by implementing this
/// trait.
pub trait BlobStore: Send + Sync {
    /// Store a blob. Overwrites if the key already exists.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Retrieve a blob. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Delete a blob. No-op if the key does not exist.
    fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Check whether a blob exists.
    fn exists(&self, key: &str) -> Result<bool, BlobError>;
}
