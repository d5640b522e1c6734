//! Verification session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status value that unlocks the database, risk and document steps.
pub const VERIFIED_STATUS: &str = "VERIFIED";

/// Top-level record for one identity-verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Storage id, never carries the `#` display prefix.
    pub id: String,
    pub candidate_name: Option<String>,
    pub candidate_email: Option<String>,
    pub candidate_phone: Option<String>,
    pub requested_docs: Vec<String>,
    /// Free-form lifecycle status, compared case-insensitively.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Upper-cased status, `PENDING` when the stored value is blank.
    pub fn canonical_status(&self) -> String {
        let status = self.status.trim();
        if status.is_empty() {
            "PENDING".into()
        } else {
            status.to_uppercase()
        }
    }

    pub fn is_verified(&self) -> bool {
        self.canonical_status() == VERIFIED_STATUS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateSession {
    /// Accepted with or without the `#` prefix.
    pub id: String,
    pub candidate_name: Option<String>,
    pub candidate_email: Option<String>,
    pub candidate_phone: Option<String>,
    pub requested_docs: Vec<String>,
    pub status: String,
    /// `None` lets the store stamp the current time.
    pub created_at: Option<DateTime<Utc>>,
}

/// Strip the `#` display prefix so the id can be used as a storage key.
pub fn storage_id(raw: &str) -> &str {
    raw.trim_start_matches('#')
}

/// Render a session id the way the dashboard shows it: `#<id>`.
pub fn display_id(raw: &str) -> String {
    format!("#{}", storage_id(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(status: &str) -> Session {
        Session {
            id: "s1".into(),
            candidate_name: None,
            candidate_email: None,
            candidate_phone: None,
            requested_docs: vec![],
            status: status.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn ids_normalize_in_both_directions() {
        assert_eq!(storage_id("#123"), "123");
        assert_eq!(storage_id("123"), "123");
        assert_eq!(display_id("123"), "#123");
        assert_eq!(display_id("#123"), "#123");
    }

    #[test]
    fn status_is_case_insensitive() {
        assert!(session("verified").is_verified());
        assert!(session("Verified").is_verified());
        assert!(!session("pending").is_verified());
        assert_eq!(session("").canonical_status(), "PENDING");
    }
}
