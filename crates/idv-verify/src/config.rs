//! Verification service configuration.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Directory backing the filesystem blob store.
    pub storage_dir: PathBuf,
    /// Vendor label for ingested records that do not name one.
    pub ingest_vendor: String,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("storage"),
            ingest_vendor: "Veriff".into(),
        }
    }
}
