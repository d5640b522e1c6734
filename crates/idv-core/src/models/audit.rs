//! Audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind tag of an audit row. Unknown tags are kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum AuditEventKind {
    SessionInitiated,
    StatusChecked,
    DocumentFetched,
    VerificationComplete,
    Other(String),
}

impl AuditEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            AuditEventKind::SessionInitiated => "SESSION_INITIATED",
            AuditEventKind::StatusChecked => "STATUS_CHECKED",
            AuditEventKind::DocumentFetched => "DOCUMENT_FETCHED",
            AuditEventKind::VerificationComplete => "VERIFICATION_COMPLETE",
            AuditEventKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for AuditEventKind {
    fn from(tag: &str) -> Self {
        match tag {
            "SESSION_INITIATED" => AuditEventKind::SessionInitiated,
            "STATUS_CHECKED" => AuditEventKind::StatusChecked,
            "DOCUMENT_FETCHED" => AuditEventKind::DocumentFetched,
            "VERIFICATION_COMPLETE" => AuditEventKind::VerificationComplete,
            other => AuditEventKind::Other(other.to_string()),
        }
    }
}

impl From<String> for AuditEventKind {
    fn from(tag: String) -> Self {
        AuditEventKind::from(tag.as_str())
    }
}

impl From<AuditEventKind> for String {
    fn from(kind: AuditEventKind) -> Self {
        match kind {
            AuditEventKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// One timestamped action taken during a session's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEvent {
    pub id: String,
    pub session_id: String,
    pub event: AuditEventKind,
    pub details: serde_json::Map<String, serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEvent {
    pub session_id: String,
    pub event: AuditEventKind,
    pub details: serde_json::Map<String, serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_parse() {
        assert_eq!(
            AuditEventKind::from("DOCUMENT_FETCHED"),
            AuditEventKind::DocumentFetched
        );
        assert_eq!(
            AuditEventKind::from("CONSENT_GIVEN"),
            AuditEventKind::Other("CONSENT_GIVEN".into())
        );
    }

    #[test]
    fn kind_serializes_as_tag() {
        let json = serde_json::to_string(&AuditEventKind::StatusChecked).unwrap();
        assert_eq!(json, "\"STATUS_CHECKED\"");
        let kind: AuditEventKind = serde_json::from_str("\"CUSTOM\"").unwrap();
        assert_eq!(kind.as_str(), "CUSTOM");
    }
}
