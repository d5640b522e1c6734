//! IDV Verify: joins session, document and audit rows into dashboard
//! verifications, and ingests new verifications with their files.

pub mod aggregate;
pub mod blob;
pub mod config;
pub mod derivation;
pub mod device;
pub mod error;
pub mod ingest;
pub mod join;
pub mod service;
pub mod timeline;

pub use blob::{BlobStore, FsBlobStore, StoredBlob};
pub use config::VerifyConfig;
pub use derivation::Derivation;
pub use error::IngestError;
pub use ingest::IngestMetadata;
pub use service::{IngestReceipt, Upload, VerificationService};
