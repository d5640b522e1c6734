//! Database-specific error types and conversions.

use idv_core::error::IdvError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Connection pool exhausted ({max} connections in use)")]
    PoolExhausted { max: usize },

    #[error("Connection pool is shut down")]
    PoolClosed,
}

impl From<DbError> for IdvError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => IdvError::NotFound { entity, id },
            DbError::PoolExhausted { .. } | DbError::PoolClosed => {
                IdvError::ResourceUnavailable(err.to_string())
            }
            other => IdvError::Database(other.to_string()),
        }
    }
}
