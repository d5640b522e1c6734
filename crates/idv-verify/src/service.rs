//! Verification service: dashboard reads and ingestion orchestration.

use idv_core::error::{IdvError, IdvResult};
use idv_core::models::verification::{VerificationDetail, VerificationSummary};
use idv_core::repository::{RecordStore, StoreScope};
use tracing::{error, info, warn};

use crate::blob::{BlobStore, StoredBlob, blob_name};
use crate::config::VerifyConfig;
use crate::derivation::Derivation;
use crate::ingest::IngestMetadata;
use crate::join;

/// A file attached to an ingestion request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Acknowledgment returned by [`VerificationService::ingest`].
#[derive(Debug)]
pub struct IngestReceipt {
    /// `#`-prefixed session id.
    pub session_id: String,
    pub files: Vec<StoredBlob>,
    pub verification: VerificationDetail,
}

/// Verification service.
///
/// Generic over the record store and blob store so that this crate has
/// no dependency on the database crate.
pub struct VerificationService<S: RecordStore, B: BlobStore> {
    store: S,
    blobs: B,
    config: VerifyConfig,
}

impl<S: RecordStore, B: BlobStore> VerificationService<S, B> {
    pub fn new(store: S, blobs: B, config: VerifyConfig) -> Self {
        Self {
            store,
            blobs,
            config,
        }
    }

    /// Summaries of every visible session, newest first.
    pub async fn list(&self) -> IdvResult<Vec<VerificationSummary>> {
        let scope = self.store.scope()?;
        let joined = join::load_all(&scope)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to load verifications"))?;

        joined
            .iter()
            .map(|row| {
                Derivation::MultiTable(row)
                    .derive()
                    .map(VerificationDetail::into_summary)
            })
            .collect()
    }

    /// Full detail for one session. `Ok(None)` when the session is absent
    /// or has no document payload yet.
    pub async fn get(&self, id: &str) -> IdvResult<Option<VerificationDetail>> {
        let scope = self.store.scope()?;
        let Some(joined) = join::load_one(&scope, id)
            .await
            .inspect_err(|e| error!(session_id = %id, error = %e, "Failed to load verification"))?
        else {
            return Ok(None);
        };

        Derivation::MultiTable(&joined).derive().map(Some)
    }

    /// Like [`get`](Self::get), with absence as [`IdvError::NotFound`].
    pub async fn require(&self, id: &str) -> IdvResult<VerificationDetail> {
        self.get(id).await?.ok_or_else(|| IdvError::NotFound {
            entity: "verification".into(),
            id: id.to_string(),
        })
    }

    /// Ingest one verification: metadata is validated before any file is
    /// written, then files are stored and the session recorded. Files
    /// written by a request that fails afterwards are removed again.
    pub async fn ingest(&self, raw_metadata: &str, uploads: Vec<Upload>) -> IdvResult<IngestReceipt> {
        let mut metadata = IngestMetadata::parse(raw_metadata)?;
        metadata
            .vendor
            .get_or_insert_with(|| self.config.ingest_vendor.clone());
        let session_id = metadata.session_id();

        for upload in &uploads {
            blob_name(&session_id, &upload.filename)?;
        }

        let scope = self.store.scope()?;

        let mut files = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            match self
                .blobs
                .put(&session_id, &upload.filename, &upload.content)
                .await
            {
                Ok(blob) => files.push(blob),
                Err(e) => {
                    error!(session_id = %session_id, file = %upload.filename, error = %e, "Blob write failed");
                    self.discard(&files).await;
                    return Err(e.into());
                }
            }
        }

        let derivation = Derivation::Mock(&metadata);
        let recorded: IdvResult<VerificationDetail> = async {
            let verification = derivation.derive()?;
            scope
                .record_ingestion(metadata.ingestion_record(&files))
                .await?;
            Ok(verification)
        }
        .await;
        let verification = match recorded {
            Ok(verification) => verification,
            Err(e) => {
                self.discard(&files).await;
                return Err(e);
            }
        };

        info!(
            session_id = %session_id,
            files = files.len(),
            derivation = derivation.name(),
            "Verification ingested"
        );

        Ok(IngestReceipt {
            session_id,
            files,
            verification,
        })
    }

    /// Remove blobs written by an ingestion that did not complete. A
    /// removal failure is logged and the original error still wins.
    async fn discard(&self, files: &[StoredBlob]) {
        for blob in files {
            if let Err(e) = self.blobs.remove(&blob.name).await {
                warn!(blob = %blob.name, error = %e, "Failed to remove orphaned blob");
            }
        }
    }

    /// Raw bytes of a stored blob.
    pub async fn file(&self, name: &str) -> IdvResult<Vec<u8>> {
        self.blobs.get(name).await?.ok_or_else(|| IdvError::NotFound {
            entity: "file".into(),
            id: name.to_string(),
        })
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }
}
