//! Pooled record store handed to request handlers.

use idv_core::error::IdvResult;
use idv_core::models::session::storage_id;
use idv_core::repository::{IngestionRecord, RecordStore, StoreScope};
use surrealdb::engine::remote::ws::Client;
use surrealdb::{Connection, Surreal};
use tracing::{error, info};
use uuid::Uuid;

use crate::connection::{DbLease, DbManager};
use crate::error::DbError;
use crate::repository::{
    APPEND_AUDIT_EVENT, SurrealAuditLogRepository, SurrealDocumentRepository,
    SurrealSessionRepository,
};

/// Status given to sessions first created by an ingestion that names none.
const INGESTED_STATUS: &str = "not_started";

/// [`RecordStore`] over a [`DbManager`]. Cheap to clone; all clones share
/// one pool.
#[derive(Clone)]
pub struct SurrealRecordStore<C: Connection = Client> {
    manager: DbManager<C>,
}

impl<C: Connection> SurrealRecordStore<C> {
    pub fn new(manager: DbManager<C>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &DbManager<C> {
        &self.manager
    }
}

impl<C: Connection> RecordStore for SurrealRecordStore<C> {
    type Scope = SurrealScope<C>;

    fn scope(&self) -> IdvResult<SurrealScope<C>> {
        let lease = self.manager.lease()?;
        Ok(SurrealScope::new(lease))
    }
}

/// Repositories bound to one leased connection slot.
pub struct SurrealScope<C: Connection> {
    lease: DbLease<C>,
    sessions: SurrealSessionRepository<C>,
    documents: SurrealDocumentRepository<C>,
    audit_log: SurrealAuditLogRepository<C>,
}

impl<C: Connection> SurrealScope<C> {
    fn new(lease: DbLease<C>) -> Self {
        let db = lease.client().clone();
        Self {
            sessions: SurrealSessionRepository::new(db.clone()),
            documents: SurrealDocumentRepository::new(db.clone()),
            audit_log: SurrealAuditLogRepository::new(db),
            lease,
        }
    }

    fn client(&self) -> &Surreal<C> {
        self.lease.client()
    }
}

impl<C: Connection> StoreScope for SurrealScope<C> {
    type Sessions = SurrealSessionRepository<C>;
    type Documents = SurrealDocumentRepository<C>;
    type AuditLog = SurrealAuditLogRepository<C>;

    fn sessions(&self) -> &Self::Sessions {
        &self.sessions
    }

    fn documents(&self) -> &Self::Documents {
        &self.documents
    }

    fn audit_log(&self) -> &Self::AuditLog {
        &self.audit_log
    }

    async fn record_ingestion(&self, record: IngestionRecord) -> IdvResult<()> {
        let IngestionRecord { session, event } = record;
        let session_id = storage_id(&session.id).to_string();

        // Absent values keep the stored field. A failing statement cancels
        // the whole transaction.
        let query = format!(
            "BEGIN TRANSACTION; \
             UPSERT type::record('sessions', $id) SET \
                 candidate_name = $candidate_name ?? candidate_name, \
                 candidate_email = $candidate_email ?? candidate_email, \
                 candidate_phone = $candidate_phone ?? candidate_phone, \
                 requested_docs = $requested_docs ?? requested_docs ?? [], \
                 status = $status ?? status ?? '{INGESTED_STATUS}', \
                 updated_at = time::now(); \
             {APPEND_AUDIT_EVENT} \
             COMMIT TRANSACTION;"
        );

        let outcome = self
            .client()
            .query(&query)
            .bind(("id", session_id.clone()))
            .bind(("candidate_name", session.candidate_name))
            .bind(("candidate_email", session.candidate_email))
            .bind(("candidate_phone", session.candidate_phone))
            .bind(("requested_docs", session.requested_docs))
            .bind(("status", session.status))
            .bind(("event_id", Uuid::new_v4().to_string()))
            .bind(("event_session_id", session_id.clone()))
            .bind(("event", String::from(event.event)))
            .bind(("details", serde_json::Value::Object(event.details)))
            .bind(("ip_address", event.ip_address))
            .bind(("user_agent", event.user_agent))
            .bind(("event_created_at", event.created_at))
            .await
            .map_err(DbError::from)
            .and_then(|response| {
                response
                    .check()
                    .map(|_| ())
                    .map_err(|e| DbError::Query(e.to_string()))
            });

        match outcome {
            Ok(()) => {
                info!(session_id = %session_id, "Ingestion committed");
                Ok(())
            }
            Err(err) => {
                error!(
                    session_id = %session_id,
                    error = %err,
                    "Ingestion transaction rolled back"
                );
                Err(err.into())
            }
        }
    }
}
