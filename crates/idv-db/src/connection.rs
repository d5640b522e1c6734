//! SurrealDB connection management.
//!
//! The SurrealDB client multiplexes requests over one handle, so the pool
//! is a set of lease slots: every request holds one [`DbLease`] for its
//! whole duration and the number of concurrent leases is bounded by
//! [`DbConfig::max_connections`]. Acquisition never waits.

use std::sync::Arc;

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tracing::{debug, info, warn};

use crate::error::DbError;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
    /// Upper bound on concurrently leased connections.
    pub max_connections: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "idv".into(),
            database: "dashboard".into(),
            username: "root".into(),
            password: "root".into(),
            max_connections: 10,
        }
    }
}

/// Owns the SurrealDB client and the bounded lease pool.
#[derive(Clone)]
pub struct DbManager<C: Connection = Client> {
    db: Surreal<C>,
    permits: Arc<Semaphore>,
    max_connections: usize,
}

impl DbManager<Client> {
    /// Connect to SurrealDB using the provided configuration.
    ///
    /// Authenticates as root, selects the configured namespace and
    /// database, and returns a ready-to-use manager.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            max_connections = config.max_connections,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Successfully connected to SurrealDB");

        Ok(Self::from_client(db, config.max_connections))
    }
}

impl<C: Connection> DbManager<C> {
    /// Wrap an already-connected client (e.g. an in-memory engine).
    pub fn from_client(db: Surreal<C>, max_connections: usize) -> Self {
        let max_connections = max_connections.max(1);
        Self {
            db,
            permits: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        }
    }

    /// Lease one connection slot without waiting.
    pub fn lease(&self) -> Result<DbLease<C>, DbError> {
        match Arc::clone(&self.permits).try_acquire_owned() {
            Ok(permit) => {
                debug!(
                    available = self.permits.available_permits(),
                    "Leased database connection"
                );
                Ok(DbLease {
                    db: self.db.clone(),
                    _permit: permit,
                })
            }
            Err(TryAcquireError::NoPermits) => {
                warn!(max = self.max_connections, "Database connection pool exhausted");
                Err(DbError::PoolExhausted {
                    max: self.max_connections,
                })
            }
            Err(TryAcquireError::Closed) => Err(DbError::PoolClosed),
        }
    }

    /// Connection slots currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Stop handing out leases. Leases already held stay valid until dropped.
    pub fn shutdown(&self) {
        self.permits.close();
        info!("Database connection pool closed");
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }
}

/// A leased connection slot. Dropping it returns the slot to the pool.
pub struct DbLease<C: Connection> {
    db: Surreal<C>,
    _permit: OwnedSemaphorePermit,
}

impl<C: Connection> DbLease<C> {
    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }
}
