//! Blob storage for ingested files.
//!
//! Blobs are keyed by `{session}_{filename}` where `session` is the session
//! id without its `#` prefix. Writes to the same key are last-writer-wins.

use std::path::{Path, PathBuf};

use idv_core::models::session::storage_id;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

use crate::aggregate::file_url;
use crate::error::IngestError;

/// A file persisted by a [`BlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Storage key, `{session}_{filename}`.
    pub name: String,
    /// Retrieval path served to clients.
    pub path: String,
    /// Hex SHA-256 of the content.
    pub sha256: String,
    pub size: usize,
}

pub trait BlobStore: Send + Sync {
    fn put(
        &self,
        session_id: &str,
        filename: &str,
        content: &[u8],
    ) -> impl Future<Output = Result<StoredBlob, IngestError>> + Send;

    /// `Ok(None)` when no blob exists under `name`.
    fn get(&self, name: &str) -> impl Future<Output = Result<Option<Vec<u8>>, IngestError>> + Send;

    /// Delete a blob. Removing a missing blob is not an error.
    fn remove(&self, name: &str) -> impl Future<Output = Result<(), IngestError>> + Send;
}

/// Reject names that could escape the storage directory.
pub fn validate_file_name(name: &str) -> Result<(), IngestError> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(IngestError::UnsafeFileName(name.to_string()));
    }
    Ok(())
}

/// Storage key for an uploaded file.
pub fn blob_name(session_id: &str, filename: &str) -> Result<String, IngestError> {
    validate_file_name(filename)?;
    let name = format!("{}_{filename}", storage_id(session_id));
    validate_file_name(&name)?;
    Ok(name)
}

/// [`BlobStore`] writing one file per blob under a root directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open the store, creating `root` if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!(root = %root.display(), "Blob store ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        session_id: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<StoredBlob, IngestError> {
        let name = blob_name(session_id, filename)?;
        fs::write(self.root.join(&name), content).await?;

        let blob = StoredBlob {
            path: file_url(&name),
            sha256: hex::encode(Sha256::digest(content)),
            size: content.len(),
            name,
        };
        info!(blob = %blob.name, size = blob.size, sha256 = %blob.sha256, "Blob stored");
        Ok(blob)
    }

    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>, IngestError> {
        validate_file_name(name)?;
        match fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(blob = %name, "Blob not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, name: &str) -> Result<(), IngestError> {
        validate_file_name(name)?;
        match fs::remove_file(self.root.join(name)).await {
            Ok(()) => {
                info!(blob = %name, "Blob removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_name_strips_session_prefix() {
        assert_eq!(blob_name("#abc", "front.jpg").unwrap(), "abc_front.jpg");
        assert_eq!(blob_name("abc", "front.jpg").unwrap(), "abc_front.jpg");
    }

    #[test]
    fn traversal_and_separators_are_rejected() {
        for bad in ["", ".", "..", "../etc/passwd", "a/b.jpg", "a\\b.jpg", "nul\0.jpg"] {
            assert!(
                matches!(validate_file_name(bad), Err(IngestError::UnsafeFileName(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_file_name("..hidden.jpg").is_ok());
        assert!(blob_name("a/b", "x.jpg").is_err());
    }

    #[tokio::test]
    async fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        let blob = store.put("#abc", "front.jpg", b"jpeg-bytes").await.unwrap();
        assert_eq!(blob.name, "abc_front.jpg");
        assert_eq!(blob.path, "/api/files/abc_front.jpg");
        assert_eq!(blob.size, 10);
        assert_eq!(blob.sha256, hex::encode(Sha256::digest(b"jpeg-bytes")));

        let bytes = store.get("abc_front.jpg").await.unwrap().unwrap();
        assert_eq!(bytes, b"jpeg-bytes");
        assert!(store.get("abc_missing.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn same_key_is_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path().join("nested")).await.unwrap();

        store.put("s1", "doc.pdf", b"first").await.unwrap();
        store.put("#s1", "doc.pdf", b"second").await.unwrap();

        assert_eq!(store.get("s1_doc.pdf").await.unwrap().unwrap(), b"second");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        store.put("s1", "doc.pdf", b"pdf").await.unwrap();
        store.remove("s1_doc.pdf").await.unwrap();
        assert!(store.get("s1_doc.pdf").await.unwrap().is_none());
        store.remove("s1_doc.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn get_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        assert!(matches!(
            store.get("../secret").await,
            Err(IngestError::UnsafeFileName(_))
        ));
    }
}
