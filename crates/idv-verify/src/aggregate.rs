//! Multi-table derivation: session + document + audit events into one
//! [`VerificationDetail`].
//!
//! Every rule here is deterministic and side-effect free. The caller
//! (the join engine) guarantees that the document carries a payload;
//! anything else reaching [`aggregate`] is reported as an internal error.

use idv_core::error::{IdvError, IdvResult};
use idv_core::models::audit::{AuditEvent, AuditEventKind};
use idv_core::models::document::DocumentRecord;
use idv_core::models::session::{Session, display_id, storage_id};
use idv_core::models::verification::{
    DeviceInfo, DocumentDetails, DocumentImages, FaceMatchInfo, FaceMatchStatus, LivenessInfo,
    LivenessStatus, NetworkDetails, PrivacyInfo, StepStatus, StepSummary, UserProfile,
    VerificationDetail, VerificationSummary,
};
use serde_json::{Map, Value};
use tracing::error;

use crate::{device, timeline};

const UNKNOWN: &str = "Unknown";
const DEFAULT_COUNTRY: &str = "India";
const DEFAULT_DOB: &str = "1990-01-01";
const DEFAULT_DOC_NUMBER: &str = "XXXX-XXXX-XXXX";
const DEFAULT_ISSUER: &str = "Unknown Issuer";
const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
const NO_EXPIRY: &str = "N/A";

const DOCUMENT_FRONT_PLACEHOLDER: &str =
    "https://placehold.co/600x400/e2e8f0/475569?text=Aadhaar+Front";
const DOCUMENT_BACK_PLACEHOLDER: &str =
    "https://placehold.co/600x400/e2e8f0/475569?text=Aadhaar+Back";

/// Placeholder biometric scores reported once a photo exists.
pub const LIVENESS_SCORE: u8 = 98;
pub const FACE_MATCH_SCORE: u8 = 95;

/// Retrieval path for a stored blob reference.
pub fn file_url(reference: &str) -> String {
    format!("/api/files/{reference}")
}

/// Normalize one joined session into the dashboard view.
pub fn aggregate(
    session: &Session,
    document: &DocumentRecord,
    events: &[AuditEvent],
) -> IdvResult<VerificationDetail> {
    let doc_data = match &document.doc_data {
        Value::Object(map) if !map.is_empty() => map,
        _ => {
            error!(
                session_id = %session.id,
                document_id = %document.id,
                "Document payload missing at aggregation time"
            );
            return Err(IdvError::Internal(format!(
                "document {} for session {} has no payload object",
                document.id, session.id
            )));
        }
    };

    let session_id = storage_id(&session.id);
    let address = doc_data.get("address").and_then(Value::as_object);

    let name = text(Some(doc_data), "name")
        .or_else(|| non_empty(session.candidate_name.as_deref()))
        .unwrap_or(UNKNOWN)
        .to_string();
    let email = non_empty(session.candidate_email.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{session_id}@example.com"));

    let city = text(address, "vtc")
        .or_else(|| text(address, "district"))
        .unwrap_or(UNKNOWN)
        .to_string();
    let state = text(address, "state").unwrap_or(UNKNOWN);
    let country = text(address, "country")
        .unwrap_or(DEFAULT_COUNTRY)
        .to_string();
    let location = format!("{city}, {state}, {country}");

    let doc_type = non_empty(document.doc_type.as_deref())
        .unwrap_or("unknown")
        .to_uppercase();
    let vendor = text(
        doc_data.get("issuer").and_then(Value::as_object),
        "name",
    )
    .unwrap_or(DEFAULT_ISSUER)
    .to_string();

    let photo = document.photo_reference();
    let photo_url = photo.map(file_url).unwrap_or_default();

    let status = session.canonical_status();
    let steps = derive_steps(session, photo.is_some(), events);

    let first_event = events.first();
    let profile = device::infer(first_event.and_then(|e| e.user_agent.as_deref()));
    let ip = first_event
        .and_then(|e| non_empty(e.ip_address.as_deref()))
        .or_else(|| non_empty(document.fetched_ip.as_deref()))
        .unwrap_or(UNKNOWN)
        .to_string();

    let (first_name, last_name) = split_name(&name);
    let (liveness, face_match) = biometrics(photo.is_some(), &photo_url);

    Ok(VerificationDetail {
        summary: VerificationSummary {
            id: display_id(session_id),
            user: UserProfile {
                name,
                avatar_url: Some(photo_url),
                email,
                phone: session.candidate_phone.clone(),
                country: country.clone(),
                document_type: doc_type,
            },
            status,
            created_at: session.created_at.to_rfc3339(),
            vendor: Some(vendor),
            steps,
        },
        device: DeviceInfo {
            device_type: profile.device_type.into(),
            os: profile.os.into(),
            browser: profile.browser.into(),
            ip: ip.clone(),
            location: location.clone(),
        },
        network: NetworkDetails {
            ip,
            location,
            city,
            country,
            isp: UNKNOWN.into(),
            timezone: DEFAULT_TIMEZONE.into(),
            privacy: PrivacyInfo::clean(),
            distance_from_doc: 0.0,
        },
        devices: Vec::new(),
        warnings: Vec::new(),
        documents: DocumentImages {
            front: DOCUMENT_FRONT_PLACEHOLDER.into(),
            back: DOCUMENT_BACK_PLACEHOLDER.into(),
            details: DocumentDetails {
                first_name,
                last_name,
                dob: text(Some(doc_data), "dob").unwrap_or(DEFAULT_DOB).into(),
                doc_number: text(Some(doc_data), "aadhaar_number")
                    .or_else(|| text(Some(doc_data), "document_number"))
                    .unwrap_or(DEFAULT_DOC_NUMBER)
                    .into(),
                expiry_date: NO_EXPIRY.into(),
            },
        },
        liveness,
        face_match,
        events: timeline::build(session_id, events),
        webhooks: Vec::new(),
    })
}

/// The four step gates. Each is computed on its own.
pub fn derive_steps(session: &Session, has_photo: bool, events: &[AuditEvent]) -> StepSummary {
    let verified = session.is_verified();
    let document_seen = events.iter().any(|e| {
        matches!(
            e.event,
            AuditEventKind::DocumentFetched | AuditEventKind::StatusChecked
        )
    });

    StepSummary {
        document: StepStatus::approved_if(document_seen && verified),
        selfie: StepStatus::approved_if(has_photo),
        database: StepStatus::approved_if(verified),
        risk: StepStatus::approved_if(verified),
    }
}

/// First whitespace token, then the remaining tokens joined by one space.
pub fn split_name(name: &str) -> (String, String) {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or(UNKNOWN).to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}

fn biometrics(has_photo: bool, photo_url: &str) -> (LivenessInfo, FaceMatchInfo) {
    if has_photo {
        (
            LivenessInfo {
                score: LIVENESS_SCORE,
                status: LivenessStatus::Pass,
                selfie_url: photo_url.into(),
            },
            FaceMatchInfo {
                score: FACE_MATCH_SCORE,
                status: FaceMatchStatus::Match,
            },
        )
    } else {
        (
            LivenessInfo {
                score: 0,
                status: LivenessStatus::Pending,
                selfie_url: photo_url.into(),
            },
            FaceMatchInfo {
                score: 0,
                status: FaceMatchStatus::Pending,
            },
        )
    }
}

fn text<'a>(object: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a str> {
    non_empty(object?.get(key)?.as_str())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn session(status: &str) -> Session {
        Session {
            id: "s1".into(),
            candidate_name: Some("Fallback Name".into()),
            candidate_email: None,
            candidate_phone: Some("+91-9000000000".into()),
            requested_docs: vec!["aadhaar".into()],
            status: status.into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        }
    }

    fn document(doc_data: Value, photo_file: Option<&str>) -> DocumentRecord {
        DocumentRecord {
            id: "d1".into(),
            session_id: "s1".into(),
            doc_type: Some("aadhaar".into()),
            doc_data,
            photo_file: photo_file.map(Into::into),
            pdf_file: None,
            fetched_at: Utc::now(),
            fetched_ip: Some("10.1.1.1".into()),
        }
    }

    fn audit(kind: AuditEventKind, offset_secs: i64, user_agent: Option<&str>) -> AuditEvent {
        AuditEvent {
            id: format!("a{offset_secs}"),
            session_id: "s1".into(),
            event: kind,
            details: Map::new(),
            ip_address: Some("49.1.1.1".into()),
            user_agent: user_agent.map(Into::into),
            created_at: Some(
                Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
                    + Duration::seconds(offset_secs),
            ),
        }
    }

    #[test]
    fn document_step_truth_table() {
        let fetched = vec![audit(AuditEventKind::DocumentFetched, 0, None)];
        let unrelated = vec![audit(AuditEventKind::SessionInitiated, 0, None)];

        let cases = [
            (&fetched, "verified", StepStatus::Approved),
            (&fetched, "pending", StepStatus::Pending),
            (&unrelated, "verified", StepStatus::Pending),
            (&unrelated, "pending", StepStatus::Pending),
        ];
        for (events, status, expected) in cases {
            let steps = derive_steps(&session(status), false, events);
            assert_eq!(steps.document, expected, "events={events:?} status={status}");
        }
    }

    #[test]
    fn status_checked_also_counts_as_document_seen() {
        let events = vec![audit(AuditEventKind::StatusChecked, 0, None)];
        let steps = derive_steps(&session("VERIFIED"), false, &events);
        assert_eq!(steps.document, StepStatus::Approved);
    }

    #[test]
    fn database_and_risk_follow_status_only() {
        let steps = derive_steps(&session("Verified"), false, &[]);
        assert_eq!(steps.database, StepStatus::Approved);
        assert_eq!(steps.risk, StepStatus::Approved);
        assert_eq!(steps.document, StepStatus::Pending);
        assert_eq!(steps.selfie, StepStatus::Pending);
    }

    #[test]
    fn name_splitting() {
        assert_eq!(split_name("Anjali"), ("Anjali".into(), String::new()));
        assert_eq!(
            split_name("Anjali Rao Sharma"),
            ("Anjali".into(), "Rao Sharma".into())
        );
        assert_eq!(
            split_name("  Anjali   Rao  "),
            ("Anjali".into(), "Rao".into())
        );
    }

    #[test]
    fn biometrics_follow_photo_presence() {
        let with_photo =
            aggregate(&session("pending"), &document(json!({"name": "A"}), Some("p.jpg")), &[])
                .unwrap();
        assert_eq!(with_photo.liveness.score, 98);
        assert_eq!(with_photo.liveness.status, LivenessStatus::Pass);
        assert_eq!(with_photo.face_match.score, 95);
        assert_eq!(with_photo.face_match.status, FaceMatchStatus::Match);
        assert_eq!(with_photo.liveness.selfie_url, "/api/files/p.jpg");

        let without =
            aggregate(&session("pending"), &document(json!({"name": "A"}), None), &[]).unwrap();
        assert_eq!(without.liveness.score, 0);
        assert_eq!(without.liveness.status, LivenessStatus::Pending);
        assert_eq!(without.face_match.score, 0);
        assert_eq!(without.face_match.status, FaceMatchStatus::Pending);
        assert_eq!(without.liveness.selfie_url, "");
    }

    #[test]
    fn identity_and_address_fallbacks() {
        let doc = document(
            json!({
                "address": {"district": "Pune", "state": "Maharashtra"},
                "issuer": {"name": "UIDAI"},
                "aadhaar_number": "1234-5678-9012"
            }),
            None,
        );
        let detail = aggregate(&session("pending"), &doc, &[]).unwrap();

        assert_eq!(detail.summary.user.name, "Fallback Name");
        assert_eq!(detail.summary.user.email, "s1@example.com");
        assert_eq!(detail.summary.user.document_type, "AADHAAR");
        assert_eq!(detail.summary.user.country, "India");
        assert_eq!(detail.summary.vendor.as_deref(), Some("UIDAI"));
        assert_eq!(detail.summary.status, "PENDING");
        assert_eq!(detail.network.city, "Pune");
        assert_eq!(detail.network.location, "Pune, Maharashtra, India");
        assert_eq!(detail.documents.details.doc_number, "1234-5678-9012");
        assert_eq!(detail.documents.details.dob, "1990-01-01");
        assert_eq!(detail.documents.details.first_name, "Fallback");
        assert_eq!(detail.documents.details.last_name, "Name");
    }

    #[test]
    fn vtc_beats_district() {
        let doc = document(json!({"address": {"vtc": "Hinjewadi", "district": "Pune"}}), None);
        let detail = aggregate(&session("pending"), &doc, &[]).unwrap();
        assert_eq!(detail.network.city, "Hinjewadi");
        assert_eq!(detail.network.location, "Hinjewadi, Unknown, India");
    }

    #[test]
    fn device_comes_from_first_event_only() {
        let events = vec![
            audit(
                AuditEventKind::SessionInitiated,
                0,
                Some("Mozilla/5.0 (Windows NT 10.0) Firefox/121.0"),
            ),
            audit(
                AuditEventKind::DocumentFetched,
                5,
                Some("Mozilla/5.0 (iPhone) Mobile Safari/604.1"),
            ),
        ];
        let detail =
            aggregate(&session("pending"), &document(json!({"name": "A"}), None), &events)
                .unwrap();
        assert_eq!(detail.device.device_type, "Desktop");
        assert_eq!(detail.device.os, "Windows");
        assert_eq!(detail.device.browser, "Firefox");
        assert_eq!(detail.device.ip, "49.1.1.1");
    }

    #[test]
    fn device_falls_back_without_events() {
        let detail =
            aggregate(&session("pending"), &document(json!({"name": "A"}), None), &[]).unwrap();
        assert_eq!(detail.device.device_type, "Unknown");
        assert_eq!(detail.device.os, "Unknown");
        assert_eq!(detail.device.browser, "Unknown");
        assert_eq!(detail.device.ip, "10.1.1.1");
        assert!(detail.events.is_empty());
        assert!(detail.webhooks.is_empty());
    }

    #[test]
    fn empty_payload_is_an_internal_error() {
        let err = aggregate(&session("pending"), &document(json!({}), None), &[]).unwrap_err();
        assert!(matches!(err, IdvError::Internal(_)));

        let err = aggregate(&session("pending"), &document(json!(["x"]), None), &[]).unwrap_err();
        assert!(matches!(err, IdvError::Internal(_)));
    }
}
