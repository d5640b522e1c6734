//! The two ways a [`VerificationDetail`] is produced.

use idv_core::error::IdvResult;
use idv_core::models::verification::VerificationDetail;

use crate::aggregate;
use crate::ingest::{self, IngestMetadata};
use crate::join::JoinedSession;

/// Derivation strategy, chosen by which data is available.
#[derive(Debug, Clone, Copy)]
pub enum Derivation<'a> {
    /// Full rule set over session, document and audit rows.
    MultiTable(&'a JoinedSession),
    /// Placeholder enrichment of ingestion metadata; no table data exists yet.
    Mock(&'a IngestMetadata),
}

impl Derivation<'_> {
    pub fn derive(self) -> IdvResult<VerificationDetail> {
        match self {
            Derivation::MultiTable(joined) => {
                aggregate::aggregate(&joined.session, &joined.document, &joined.events)
            }
            Derivation::Mock(metadata) => Ok(ingest::mock_detail(metadata)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Derivation::MultiTable(_) => "multi_table",
            Derivation::Mock(_) => "mock",
        }
    }
}
