//! SurrealDB implementation of [`DocumentRepository`].

use chrono::{DateTime, Utc};
use idv_core::error::IdvResult;
use idv_core::models::document::{CreateDocument, DocumentRecord};
use idv_core::models::session::storage_id;
use idv_core::repository::DocumentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DocumentRowWithId {
    record_id: String,
    session_id: String,
    doc_type: Option<String>,
    doc_data: Option<serde_json::Value>,
    photo_file: Option<String>,
    pdf_file: Option<String>,
    fetched_at: DateTime<Utc>,
    fetched_ip: Option<String>,
}

impl DocumentRowWithId {
    fn into_document(self) -> DocumentRecord {
        DocumentRecord {
            id: self.record_id,
            session_id: self.session_id,
            doc_type: self.doc_type,
            doc_data: self.doc_data.unwrap_or(serde_json::Value::Null),
            photo_file: self.photo_file,
            pdf_file: self.pdf_file,
            fetched_at: self.fetched_at,
            fetched_ip: self.fetched_ip,
        }
    }
}

/// SurrealDB implementation of the Document repository.
#[derive(Clone)]
pub struct SurrealDocumentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDocumentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DocumentRepository for SurrealDocumentRepository<C> {
    async fn create(&self, input: CreateDocument) -> IdvResult<DocumentRecord> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('documents', $id) SET \
                 session_id = $session_id, \
                 doc_type = $doc_type, \
                 doc_data = $doc_data, \
                 photo_file = $photo_file, \
                 pdf_file = $pdf_file, \
                 fetched_ip = $fetched_ip; \
                 SELECT meta::id(id) AS record_id, * FROM type::record('documents', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("session_id", storage_id(&input.session_id).to_string()))
            .bind(("doc_type", input.doc_type))
            .bind(("doc_data", input.doc_data))
            .bind(("photo_file", input.photo_file))
            .bind(("pdf_file", input.pdf_file))
            .bind(("fetched_ip", input.fetched_ip))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DocumentRowWithId> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(row.into_document())
    }

    async fn get_by_session(&self, session_id: &str) -> IdvResult<Option<DocumentRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM documents \
                 WHERE session_id = $session_id \
                 ORDER BY fetched_at DESC LIMIT 1",
            )
            .bind(("session_id", storage_id(session_id).to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(DocumentRowWithId::into_document))
    }

    async fn list(&self) -> IdvResult<Vec<DocumentRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM documents \
                 ORDER BY fetched_at DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(DocumentRowWithId::into_document)
            .collect())
    }
}
