//! Schema definitions and migration runner for SurrealDB.
//!
//! The three tables are independent: `documents.session_id` and
//! `audit_log.session_id` are plain strings with no reference constraint.
//! Session ids are stored without the `#` display prefix.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "verification_tables",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: sessions, documents, audit_log
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Verification sessions
-- =======================================================================
DEFINE TABLE sessions SCHEMAFULL;
DEFINE FIELD candidate_name ON TABLE sessions TYPE option<string>;
DEFINE FIELD candidate_email ON TABLE sessions TYPE option<string>;
DEFINE FIELD candidate_phone ON TABLE sessions TYPE option<string>;
DEFINE FIELD requested_docs ON TABLE sessions TYPE array<string> \
    DEFAULT [];
DEFINE FIELD status ON TABLE sessions TYPE string DEFAULT 'pending';
DEFINE FIELD created_at ON TABLE sessions TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE sessions TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_sessions_created_at ON TABLE sessions \
    COLUMNS created_at;

-- =======================================================================
-- Fetched identity documents (0..1 per session by convention)
-- =======================================================================
DEFINE TABLE documents SCHEMAFULL;
DEFINE FIELD session_id ON TABLE documents TYPE string;
DEFINE FIELD doc_type ON TABLE documents TYPE option<string>;
DEFINE FIELD doc_data ON TABLE documents TYPE option<object> FLEXIBLE;
DEFINE FIELD photo_file ON TABLE documents TYPE option<string>;
DEFINE FIELD pdf_file ON TABLE documents TYPE option<string>;
DEFINE FIELD fetched_at ON TABLE documents TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD fetched_ip ON TABLE documents TYPE option<string>;
DEFINE INDEX idx_documents_session ON TABLE documents \
    COLUMNS session_id;

-- =======================================================================
-- Audit log (many per session)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL;
DEFINE FIELD session_id ON TABLE audit_log TYPE string;
DEFINE FIELD event ON TABLE audit_log TYPE string;
DEFINE FIELD details ON TABLE audit_log TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD ip_address ON TABLE audit_log TYPE option<string>;
DEFINE FIELD user_agent ON TABLE audit_log TYPE option<string>;
DEFINE FIELD created_at ON TABLE audit_log TYPE option<datetime>;
DEFINE INDEX idx_audit_log_session ON TABLE audit_log \
    COLUMNS session_id;
";

/// Run all pending migrations against the database.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(version = migration.version, "Migration applied");
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defines_all_three_tables() {
        for table in ["sessions", "documents", "audit_log"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
