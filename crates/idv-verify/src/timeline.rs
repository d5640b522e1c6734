//! Audit rows to human-readable timeline entries.

use idv_core::models::audit::{AuditEvent, AuditEventKind};
use idv_core::models::verification::TimelineEvent;
use serde_json::{Map, Value};

/// Build the timeline for one session, ascending by timestamp. Entries
/// without a timestamp come first; ties keep audit-log order.
pub fn build(session_id: &str, events: &[AuditEvent]) -> Vec<TimelineEvent> {
    let mut keyed: Vec<_> = events
        .iter()
        .map(|event| (event.created_at, to_timeline_event(session_id, event)))
        .collect();
    keyed.sort_by_key(|(created_at, _)| *created_at);
    keyed.into_iter().map(|(_, event)| event).collect()
}

fn to_timeline_event(session_id: &str, event: &AuditEvent) -> TimelineEvent {
    let (title, description) = describe(event);
    TimelineEvent {
        id: format!("evt_{session_id}_{}", event.id),
        event_type: display_kind(&event.event).to_string(),
        title,
        description,
        timestamp: event
            .created_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
        thumbnails: Vec::new(),
        metadata: merge_metadata(event),
    }
}

/// Dashboard event type for an audit kind.
pub fn display_kind(kind: &AuditEventKind) -> &str {
    match kind {
        AuditEventKind::SessionInitiated => "SESSION_START",
        AuditEventKind::StatusChecked => "DOCUMENT_FETCH",
        AuditEventKind::DocumentFetched => "DOCUMENT_RETRIEVED",
        AuditEventKind::VerificationComplete => "VERIFICATION_COMPLETE",
        AuditEventKind::Other(tag) => tag,
    }
}

fn describe(event: &AuditEvent) -> (String, String) {
    match &event.event {
        AuditEventKind::SessionInitiated => {
            let docs = event
                .details
                .get("requestedDocs")
                .and_then(Value::as_array)
                .map(|docs| docs.iter().map(value_text).collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            (
                "Session Started".into(),
                format!("Verification session initiated for {docs}"),
            )
        }
        AuditEventKind::StatusChecked => {
            let status = event
                .details
                .get("status")
                .filter(|v| !v.is_null())
                .map(value_text)
                .unwrap_or_else(|| "unknown".into());
            (
                "Status Check".into(),
                format!("Document status checked: {status}"),
            )
        }
        AuditEventKind::DocumentFetched => (
            "Document Retrieved".into(),
            "Document retrieved successfully".into(),
        ),
        other => {
            let tag = other.as_str();
            (title_case(&tag.replace('_', " ")), format!("Event: {tag}"))
        }
    }
}

/// `ip_address` and `user_agent` first, then every detail key. Details
/// overwrite the request fields on collision.
fn merge_metadata(event: &AuditEvent) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert(
        "ip_address".into(),
        event.ip_address.clone().map_or(Value::Null, Value::String),
    );
    metadata.insert(
        "user_agent".into(),
        event.user_agent.clone().map_or(Value::Null, Value::String),
    );
    for (key, value) in &event.details {
        metadata.insert(key.clone(), value.clone());
    }
    metadata
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
