//! SurrealDB repository implementations.

mod audit;
mod document;
mod session;

pub(crate) use audit::APPEND_AUDIT_EVENT;
pub use audit::SurrealAuditLogRepository;
pub use document::SurrealDocumentRepository;
pub use session::SurrealSessionRepository;
