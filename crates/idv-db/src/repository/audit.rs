//! SurrealDB implementation of [`AuditLogRepository`].

use chrono::{DateTime, Utc};
use idv_core::error::IdvResult;
use idv_core::models::audit::{AuditEvent, AuditEventKind, CreateAuditEvent};
use idv_core::models::session::storage_id;
use idv_core::repository::AuditLogRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AuditRowWithId {
    record_id: String,
    session_id: String,
    event: String,
    details: serde_json::Value,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl AuditRowWithId {
    fn into_event(self) -> AuditEvent {
        let details = match self.details {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        AuditEvent {
            id: self.record_id,
            session_id: self.session_id,
            event: AuditEventKind::from(self.event),
            details,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: self.created_at,
        }
    }
}

/// SurrealQL that appends one audit row. Shared with the ingestion
/// transaction in [`crate::store`].
pub(crate) const APPEND_AUDIT_EVENT: &str = "\
CREATE type::record('audit_log', $event_id) SET \
    session_id = $event_session_id, \
    event = $event, \
    details = $details, \
    ip_address = $ip_address, \
    user_agent = $user_agent, \
    created_at = $event_created_at;";

/// SurrealDB implementation of the audit log repository.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditEvent) -> IdvResult<AuditEvent> {
        let id_str = Uuid::new_v4().to_string();
        let query = format!(
            "{APPEND_AUDIT_EVENT} \
             SELECT meta::id(id) AS record_id, * FROM type::record('audit_log', $event_id);"
        );

        let result = self
            .db
            .query(&query)
            .bind(("event_id", id_str.clone()))
            .bind((
                "event_session_id",
                storage_id(&input.session_id).to_string(),
            ))
            .bind(("event", String::from(input.event)))
            .bind(("details", serde_json::Value::Object(input.details)))
            .bind(("ip_address", input.ip_address))
            .bind(("user_agent", input.user_agent))
            .bind(("event_created_at", input.created_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AuditRowWithId> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "audit_log".into(),
            id: id_str,
        })?;

        Ok(row.into_event())
    }

    async fn list_for_session(&self, session_id: &str) -> IdvResult<Vec<AuditEvent>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM audit_log \
                 WHERE session_id = $session_id \
                 ORDER BY created_at ASC",
            )
            .bind(("session_id", storage_id(session_id).to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(AuditRowWithId::into_event).collect())
    }
}
