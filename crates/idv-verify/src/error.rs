//! Ingestion error types.

use idv_core::error::IdvError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid JSON metadata: {0}")]
    MalformedMetadata(String),

    #[error("metadata does not match the ingestion schema: {0}")]
    InvalidMetadata(String),

    #[error("unsafe file name: {0:?}")]
    UnsafeFileName(String),

    #[error("blob I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IngestError> for IdvError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MalformedMetadata(_)
            | IngestError::InvalidMetadata(_)
            | IngestError::UnsafeFileName(_) => IdvError::Validation {
                message: err.to_string(),
            },
            IngestError::Io(e) => IdvError::BlobStore(e.to_string()),
        }
    }
}
