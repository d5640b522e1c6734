//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Requests never talk to a
//! repository directly: they lease a [`StoreScope`] from a
//! [`RecordStore`], which holds one pooled connection slot for the
//! lifetime of the scope.

use std::collections::HashMap;

use crate::error::IdvResult;
use crate::models::{
    audit::{AuditEvent, CreateAuditEvent},
    document::{CreateDocument, DocumentRecord},
    session::{CreateSession, Session},
};

// ---------------------------------------------------------------------------
// Per-table repositories
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = IdvResult<Session>> + Send;
    /// `Ok(None)` when no row exists; storage faults stay in `Err`.
    fn get_by_id(&self, id: &str) -> impl Future<Output = IdvResult<Option<Session>>> + Send;
    /// All sessions, newest `created_at` first.
    fn list_newest_first(&self) -> impl Future<Output = IdvResult<Vec<Session>>> + Send;
}

pub trait DocumentRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDocument,
    ) -> impl Future<Output = IdvResult<DocumentRecord>> + Send;
    /// Most recently fetched document for the session, if any.
    fn get_by_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = IdvResult<Option<DocumentRecord>>> + Send;
    /// All documents, most recently fetched first.
    fn list(&self) -> impl Future<Output = IdvResult<Vec<DocumentRecord>>> + Send;
}

pub trait AuditLogRepository: Send + Sync {
    fn append(&self, input: CreateAuditEvent) -> impl Future<Output = IdvResult<AuditEvent>> + Send;
    /// Events for one session, ascending by `created_at`.
    fn list_for_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = IdvResult<Vec<AuditEvent>>> + Send;
}

// ---------------------------------------------------------------------------
// Joined access
// ---------------------------------------------------------------------------

/// A session row left-joined with its document row.
#[derive(Debug, Clone)]
pub struct SessionWithDocument {
    pub session: Session,
    pub document: Option<DocumentRecord>,
}

/// Session fields carried by an ingestion. `None` keeps what is stored;
/// a new session falls back to the column defaults.
#[derive(Debug, Clone, Default)]
pub struct IngestSession {
    pub id: String,
    pub candidate_name: Option<String>,
    pub candidate_email: Option<String>,
    pub candidate_phone: Option<String>,
    pub requested_docs: Option<Vec<String>>,
    pub status: Option<String>,
}

/// Writes performed together when a verification is ingested.
#[derive(Debug, Clone)]
pub struct IngestionRecord {
    pub session: IngestSession,
    pub event: CreateAuditEvent,
}

/// One leased unit of work against the record store.
///
/// Dropping the scope returns its connection slot to the pool.
pub trait StoreScope: Send + Sync {
    type Sessions: SessionRepository;
    type Documents: DocumentRepository;
    type AuditLog: AuditLogRepository;

    fn sessions(&self) -> &Self::Sessions;
    fn documents(&self) -> &Self::Documents;
    fn audit_log(&self) -> &Self::AuditLog;

    /// Merge the session into any stored row and append its audit event,
    /// atomically.
    fn record_ingestion(&self, record: IngestionRecord)
    -> impl Future<Output = IdvResult<()>> + Send;

    /// Every session joined with its document, newest session first.
    fn sessions_with_documents(
        &self,
    ) -> impl Future<Output = IdvResult<Vec<SessionWithDocument>>> + Send {
        async move {
            let sessions = self.sessions().list_newest_first().await?;

            // Documents arrive newest first; keep the first one per session.
            let mut by_session: HashMap<String, DocumentRecord> = HashMap::new();
            for document in self.documents().list().await? {
                by_session
                    .entry(document.session_id.clone())
                    .or_insert(document);
            }

            Ok(sessions
                .into_iter()
                .map(|session| {
                    let document = by_session.remove(&session.id);
                    SessionWithDocument { session, document }
                })
                .collect())
        }
    }

    /// One session joined with its document; `None` when the session is absent.
    fn session_with_document(
        &self,
        id: &str,
    ) -> impl Future<Output = IdvResult<Option<SessionWithDocument>>> + Send {
        async move {
            let Some(session) = self.sessions().get_by_id(id).await? else {
                return Ok(None);
            };
            let document = self.documents().get_by_session(&session.id).await?;
            Ok(Some(SessionWithDocument { session, document }))
        }
    }
}

/// Source of [`StoreScope`]s backed by a bounded connection pool.
pub trait RecordStore: Send + Sync {
    type Scope: StoreScope;

    /// Lease a scope. Fails fast with
    /// [`IdvError::ResourceUnavailable`](crate::error::IdvError) when the
    /// pool is exhausted or shut down.
    fn scope(&self) -> IdvResult<Self::Scope>;
}
