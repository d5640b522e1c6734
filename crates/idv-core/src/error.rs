//! Error types for the verification dashboard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdvError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Blob store error: {0}")]
    BlobStore(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type IdvResult<T> = Result<T, IdvError>;
