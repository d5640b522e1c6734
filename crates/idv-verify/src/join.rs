//! Join engine: loads a session, its document and its audit trail, and
//! applies the visibility gate.
//!
//! A session is visible only once a document with a non-empty payload
//! exists for it. Hidden sessions are dropped from listings and read as
//! not-found on direct lookup; they are never an error.

use idv_core::error::IdvResult;
use idv_core::models::audit::AuditEvent;
use idv_core::models::document::DocumentRecord;
use idv_core::models::session::{Session, storage_id};
use idv_core::repository::{AuditLogRepository, StoreScope};
use tracing::debug;

/// Rows for one visible session, ready for aggregation.
#[derive(Debug, Clone)]
pub struct JoinedSession {
    pub session: Session,
    pub document: DocumentRecord,
    /// Ascending by creation time as returned by the store.
    pub events: Vec<AuditEvent>,
}

/// All visible sessions, newest first.
pub async fn load_all<S: StoreScope>(scope: &S) -> IdvResult<Vec<JoinedSession>> {
    let rows = scope.sessions_with_documents().await?;
    let mut joined = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(document) = visible(row.document) else {
            debug!(session_id = %row.session.id, "Skipping session without document payload");
            continue;
        };
        let events = scope.audit_log().list_for_session(&row.session.id).await?;
        joined.push(JoinedSession {
            session: row.session,
            document,
            events,
        });
    }

    Ok(joined)
}

/// One visible session. Accepts ids with or without the `#` prefix.
pub async fn load_one<S: StoreScope>(scope: &S, id: &str) -> IdvResult<Option<JoinedSession>> {
    let id = storage_id(id);
    let Some(row) = scope.session_with_document(id).await? else {
        debug!(session_id = %id, "Session not found");
        return Ok(None);
    };
    let Some(document) = visible(row.document) else {
        debug!(session_id = %id, "Session has no document payload");
        return Ok(None);
    };
    let events = scope.audit_log().list_for_session(id).await?;

    Ok(Some(JoinedSession {
        session: row.session,
        document,
        events,
    }))
}

fn visible(document: Option<DocumentRecord>) -> Option<DocumentRecord> {
    document.filter(DocumentRecord::has_payload)
}
