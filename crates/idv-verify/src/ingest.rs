//! Ingestion metadata and the mock derivation used before any table data
//! exists for a session.

use chrono::Utc;
use idv_core::models::audit::{AuditEventKind, CreateAuditEvent};
use idv_core::models::session::{display_id, storage_id};
use idv_core::models::verification::{
    DeviceInfo, DocumentDetails, DocumentImages, FaceMatchInfo, FaceMatchStatus, LivenessInfo,
    LivenessStatus, NetworkDetails, PrivacyInfo, StepStatus, StepSummary, UserProfile,
    VerificationDetail, VerificationSummary,
};
use idv_core::repository::{IngestSession, IngestionRecord};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::aggregate::{FACE_MATCH_SCORE, LIVENESS_SCORE, split_name};
use crate::blob::StoredBlob;
use crate::error::IngestError;

/// Workflow entries that approve the document and selfie steps.
pub const WORKFLOW_ID_VERIFICATION: &str = "ID_VERIFICATION";
pub const WORKFLOW_LIVENESS: &str = "LIVENESS";

const DEFAULT_SESSION_ID: &str = "unknown";
const DEFAULT_STATUS: &str = "NOT_STARTED";
const DEFAULT_CREATED_AT: &str = "2024-01-01T00:00:00Z";
const DEFAULT_VENDOR: &str = "Veriff";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestTimestamps {
    pub created_at: Option<String>,
}

/// Metadata document posted alongside ingested files. Unknown keys are
/// ignored; every recognised key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestMetadata {
    pub session_id: Option<String>,
    #[serde(default)]
    pub user: IngestUser,
    pub document_type: Option<String>,
    #[serde(default)]
    pub workflow: Vec<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub timestamps: IngestTimestamps,
    pub vendor: Option<String>,
}

impl IngestMetadata {
    /// Parse the raw metadata text. Nothing else in the ingestion path
    /// runs until this succeeds.
    pub fn parse(raw: &str) -> Result<Self, IngestError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| IngestError::MalformedMetadata(e.to_string()))?;
        if !value.is_object() {
            return Err(IngestError::MalformedMetadata(
                "metadata must be a JSON object".into(),
            ));
        }
        serde_json::from_value(value).map_err(|e| IngestError::InvalidMetadata(e.to_string()))
    }

    /// `#`-prefixed session id.
    pub fn session_id(&self) -> String {
        let raw = self
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !storage_id(id).is_empty())
            .unwrap_or(DEFAULT_SESSION_ID);
        display_id(raw)
    }

    pub fn has_workflow(&self, step: &str) -> bool {
        self.workflow.iter().any(|w| w == step)
    }

    /// Rows written for this ingestion: the session merge and its
    /// `SESSION_INITIATED` audit event. Keys missing from the metadata
    /// leave the stored session untouched.
    pub fn ingestion_record(&self, files: &[StoredBlob]) -> IngestionRecord {
        let session_id = self.session_id();

        let mut details = serde_json::Map::new();
        details.insert("requestedDocs".into(), json!(self.workflow));
        details.insert("source".into(), json!("ingest"));
        details.insert(
            "files".into(),
            Value::Array(files.iter().map(|f| json!(f.path)).collect()),
        );

        IngestionRecord {
            session: IngestSession {
                id: storage_id(&session_id).to_string(),
                candidate_name: self.user.name.clone(),
                candidate_email: self.user.email.clone(),
                candidate_phone: self.user.phone.clone(),
                requested_docs: (!self.workflow.is_empty()).then(|| self.workflow.clone()),
                status: self.status.as_deref().map(str::to_lowercase),
            },
            event: CreateAuditEvent {
                session_id: storage_id(&session_id).to_string(),
                event: AuditEventKind::SessionInitiated,
                details,
                ip_address: None,
                user_agent: None,
                created_at: Some(Utc::now()),
            },
        }
    }
}

/// Placeholder enrichment of ingestion metadata. Only identity fields,
/// status, timestamps and the workflow-gated steps come from the input.
///
/// The name splits like the read path: first token, then the remaining
/// tokens as the last name ("Anjali Rao Sharma" gives "Rao Sharma"), not
/// only the final token.
pub fn mock_detail(metadata: &IngestMetadata) -> VerificationDetail {
    let user = &metadata.user;
    let name = user.name.clone().unwrap_or_else(|| "Unknown".into());
    let (first_name, last_name) = split_name(&name);

    VerificationDetail {
        summary: VerificationSummary {
            id: metadata.session_id(),
            user: UserProfile {
                name,
                avatar_url: Some(String::new()),
                email: user
                    .email
                    .clone()
                    .unwrap_or_else(|| "unknown@example.com".into()),
                phone: user.phone.clone(),
                country: user.country.clone().unwrap_or_else(|| "Unknown".into()),
                document_type: metadata
                    .document_type
                    .clone()
                    .unwrap_or_else(|| "Unknown".into()),
            },
            status: metadata
                .status
                .as_deref()
                .unwrap_or(DEFAULT_STATUS)
                .to_uppercase(),
            created_at: metadata
                .timestamps
                .created_at
                .clone()
                .unwrap_or_else(|| DEFAULT_CREATED_AT.into()),
            vendor: Some(
                metadata
                    .vendor
                    .clone()
                    .unwrap_or_else(|| DEFAULT_VENDOR.into()),
            ),
            steps: StepSummary {
                document: StepStatus::approved_if(metadata.has_workflow(WORKFLOW_ID_VERIFICATION)),
                selfie: StepStatus::approved_if(metadata.has_workflow(WORKFLOW_LIVENESS)),
                database: StepStatus::Approved,
                risk: StepStatus::Approved,
            },
        },
        device: DeviceInfo {
            device_type: "Mobile".into(),
            os: "iOS 17".into(),
            browser: "Mobile Safari".into(),
            ip: "49.37.170.8".into(),
            location: "Bengaluru, India".into(),
        },
        network: NetworkDetails {
            ip: "49.37.170.8".into(),
            location: "Bengaluru, Karnataka, India".into(),
            city: "Bengaluru".into(),
            country: "India".into(),
            isp: "Bharti Airtel Ltd.".into(),
            timezone: "Asia/Kolkata".into(),
            privacy: PrivacyInfo::clean(),
            distance_from_doc: 783.64,
        },
        devices: Vec::new(),
        warnings: Vec::new(),
        documents: DocumentImages {
            front: "https://placehold.co/600x400/e2e8f0/475569?text=ID+Front".into(),
            back: "https://placehold.co/600x400/e2e8f0/475569?text=ID+Back".into(),
            details: DocumentDetails {
                first_name,
                last_name,
                dob: "1995-01-01".into(),
                doc_number: "ABC12345".into(),
                expiry_date: "2030-01-01".into(),
            },
        },
        liveness: LivenessInfo {
            score: LIVENESS_SCORE,
            status: LivenessStatus::Pass,
            selfie_url: "https://placehold.co/400x400/e2e8f0/475569?text=Selfie".into(),
        },
        face_match: FaceMatchInfo {
            score: FACE_MATCH_SCORE,
            status: FaceMatchStatus::Match,
        },
        events: Vec::new(),
        webhooks: Vec::new(),
    }
}
