//! Aggregated verification view served to the dashboard.
//!
//! Never persisted: it is derived from a session, its document and its
//! audit events on every read. The summary is the list view; the detail
//! view embeds the summary and adds the per-tab sections.

use serde::{Deserialize, Serialize};

/// Coarse approval gate for one verification step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Pending,
    Approved,
}

impl StepStatus {
    pub fn approved_if(condition: bool) -> Self {
        if condition {
            StepStatus::Approved
        } else {
            StepStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepSummary {
    pub document: StepStatus,
    pub selfie: StepStatus,
    pub database: StepStatus,
    pub risk: StepStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub avatar_url: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub country: String,
    pub document_type: String,
}

/// Fields shared by the list and detail views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    /// Always `#`-prefixed.
    pub id: String,
    pub user: UserProfile,
    pub status: String,
    pub created_at: String,
    pub vendor: Option<String>,
    pub steps: StepSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub device_type: String,
    pub os: String,
    pub browser: String,
    pub ip: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivacyStatus {
    Clean,
    Risk,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyInfo {
    pub status: PrivacyStatus,
    pub vpn: bool,
    pub tor: bool,
    pub proxy: bool,
    pub data_center: bool,
}

impl PrivacyInfo {
    pub fn clean() -> Self {
        Self {
            status: PrivacyStatus::Clean,
            vpn: false,
            tor: false,
            proxy: false,
            data_center: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDetails {
    pub ip: String,
    pub location: String,
    pub city: String,
    pub country: String,
    pub isp: String,
    pub timezone: String,
    pub privacy: PrivacyInfo,
    /// Kilometres between the network location and the document address.
    pub distance_from_doc: f64,
}

/// Additional device seen during the session. No source populates these yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceItem {
    pub id: String,
    pub ip: String,
    pub platform: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub os: String,
    pub browser: String,
    pub isp: String,
    pub timezone: String,
    pub distance_match: bool,
    pub privacy: std::collections::BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetails {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub doc_number: String,
    pub expiry_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentImages {
    pub front: String,
    pub back: String,
    pub details: DocumentDetails,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LivenessStatus {
    Pass,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LivenessInfo {
    pub score: u8,
    pub status: LivenessStatus,
    pub selfie_url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaceMatchStatus {
    Match,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaceMatchInfo {
    pub score: u8,
    pub status: FaceMatchStatus,
}

/// Human-readable timeline entry derived from one audit row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub title: String,
    pub description: String,
    /// RFC 3339, empty when the audit row had no timestamp.
    pub timestamp: String,
    pub thumbnails: Vec<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookDelivery {
    pub id: String,
    pub event: String,
    pub status: u16,
    pub timestamp: String,
    pub payload: serde_json::Value,
    pub response: serde_json::Value,
}

/// Full normalized record for the detail page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationDetail {
    #[serde(flatten)]
    pub summary: VerificationSummary,
    pub device: DeviceInfo,
    pub network: NetworkDetails,
    pub devices: Vec<DeviceItem>,
    pub warnings: Vec<String>,
    pub documents: DocumentImages,
    pub liveness: LivenessInfo,
    pub face_match: FaceMatchInfo,
    pub events: Vec<TimelineEvent>,
    pub webhooks: Vec<WebhookDelivery>,
}

impl VerificationDetail {
    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn steps(&self) -> &StepSummary {
        &self.summary.steps
    }

    pub fn into_summary(self) -> VerificationSummary {
        self.summary
    }
}
