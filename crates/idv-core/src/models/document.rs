//! Fetched identity-document domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document payload fetched for a session. At most one per session by
/// convention; the store does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    pub id: String,
    pub session_id: String,
    pub doc_type: Option<String>,
    /// Arbitrary structured payload (`name`, `dob`, `address`, `issuer`, ...).
    /// `Null` when the row carries no payload.
    pub doc_data: serde_json::Value,
    pub photo_file: Option<String>,
    pub pdf_file: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub fetched_ip: Option<String>,
}

impl DocumentRecord {
    /// Whether the payload holds anything. Sessions whose document fails
    /// this check are hidden from the dashboard.
    pub fn has_payload(&self) -> bool {
        match &self.doc_data {
            serde_json::Value::Null => false,
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            serde_json::Value::String(s) => !s.is_empty(),
            serde_json::Value::Array(items) => !items.is_empty(),
            serde_json::Value::Object(map) => !map.is_empty(),
        }
    }

    /// Photo blob reference: the column first, then `doc_data.photo_file`.
    pub fn photo_reference(&self) -> Option<&str> {
        self.photo_file
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| {
                self.doc_data
                    .get("photo_file")
                    .and_then(|v| v.as_str())
                    .filter(|p| !p.is_empty())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub session_id: String,
    pub doc_type: Option<String>,
    pub doc_data: Option<serde_json::Value>,
    pub photo_file: Option<String>,
    pub pdf_file: Option<String>,
    pub fetched_ip: Option<String>,
}
