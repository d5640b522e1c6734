//! SurrealDB implementation of [`SessionRepository`].

use chrono::{DateTime, Utc};
use idv_core::error::IdvResult;
use idv_core::models::session::{CreateSession, Session, storage_id};
use idv_core::repository::SessionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    candidate_name: Option<String>,
    candidate_email: Option<String>,
    candidate_phone: Option<String>,
    requested_docs: Vec<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionRowWithId {
    fn into_session(self) -> Session {
        Session {
            id: self.record_id,
            candidate_name: self.candidate_name,
            candidate_email: self.candidate_email,
            candidate_phone: self.candidate_phone,
            requested_docs: self.requested_docs,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> IdvResult<Session> {
        let id = storage_id(&input.id).to_string();

        let mut sets = vec![
            "candidate_name = $candidate_name",
            "candidate_email = $candidate_email",
            "candidate_phone = $candidate_phone",
            "requested_docs = $requested_docs",
            "status = $status",
        ];
        if input.created_at.is_some() {
            sets.push("created_at = $created_at");
            sets.push("updated_at = $created_at");
        }

        let query = format!(
            "CREATE type::record('sessions', $id) SET {}; \
             SELECT meta::id(id) AS record_id, * FROM type::record('sessions', $id);",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id.clone()))
            .bind(("candidate_name", input.candidate_name))
            .bind(("candidate_email", input.candidate_email))
            .bind(("candidate_phone", input.candidate_phone))
            .bind(("requested_docs", input.requested_docs))
            .bind(("status", input.status));
        if let Some(created_at) = input.created_at {
            builder = builder.bind(("created_at", created_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SessionRowWithId> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id.clone(),
        })?;

        Ok(row.into_session())
    }

    async fn get_by_id(&self, id: &str) -> IdvResult<Option<Session>> {
        let id = storage_id(id).to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('sessions', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(SessionRowWithId::into_session))
    }

    async fn list_newest_first(&self) -> IdvResult<Vec<Session>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM sessions \
                 ORDER BY created_at DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(SessionRowWithId::into_session).collect())
    }
}
