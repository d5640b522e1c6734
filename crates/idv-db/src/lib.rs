//! IDV Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management with a bounded lease pool ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repository implementations for the `idv-core` traits ([`repository`])
//! - The pooled record store handed to request handlers ([`SurrealRecordStore`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;
mod store;

pub use connection::{DbConfig, DbLease, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use store::{SurrealRecordStore, SurrealScope};
