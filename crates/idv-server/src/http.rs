//! HTTP surface for the dashboard.
//!
//! | Method | Path                          | Result                         |
//! |--------|-------------------------------|--------------------------------|
//! | GET    | `/`                           | health check                   |
//! | GET    | `/api/verifications`          | summaries, newest first        |
//! | GET    | `/api/verifications/:id`      | one detail, 404 when hidden    |
//! | POST   | `/api/verifications/ingest`   | multipart `metadata` + `files` |
//! | GET    | `/api/files/:name`            | stored blob bytes              |

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::header::{CONTENT_TYPE, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use idv_core::error::IdvError;
use idv_core::models::verification::{VerificationDetail, VerificationSummary};
use idv_core::repository::RecordStore;
use idv_verify::{BlobStore, Upload, VerificationService};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Upper bound on one ingestion request body.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

type Shared<S, B> = State<Arc<VerificationService<S, B>>>;

pub fn router<S, B>(service: Arc<VerificationService<S, B>>, cors_origins: &[String]) -> Router
where
    S: RecordStore + 'static,
    B: BlobStore + 'static,
{
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/api/verifications", get(list_verifications::<S, B>))
        .route("/api/verifications/", get(list_verifications::<S, B>))
        .route("/api/verifications/ingest", post(ingest_verification::<S, B>))
        .route("/api/verifications/:id", get(get_verification::<S, B>))
        .route("/api/files/:name", get(get_file::<S, B>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "service": "idv-dashboard"}))
}

async fn list_verifications<S, B>(
    State(service): Shared<S, B>,
) -> Result<Json<Vec<VerificationSummary>>, ApiError>
where
    S: RecordStore + 'static,
    B: BlobStore + 'static,
{
    Ok(Json(service.list().await?))
}

async fn get_verification<S, B>(
    State(service): Shared<S, B>,
    Path(id): Path<String>,
) -> Result<Json<VerificationDetail>, ApiError>
where
    S: RecordStore + 'static,
    B: BlobStore + 'static,
{
    match service.get(&id).await? {
        Some(detail) => Ok(Json(detail)),
        None => Err(ApiError::not_found("Verification session not found")),
    }
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    message: &'static str,
    session_id: String,
}

async fn ingest_verification<S, B>(
    State(service): Shared<S, B>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError>
where
    S: RecordStore + 'static,
    B: BlobStore + 'static,
{
    let mut metadata = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(ApiError::bad_request)? {
        match field.name() {
            Some("metadata") => {
                metadata = Some(field.text().await.map_err(ApiError::bad_request)?);
            }
            Some("files") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(ApiError::bad_request)?;
                uploads.push(Upload {
                    filename,
                    content: content.to_vec(),
                });
            }
            _ => {}
        }
    }

    let Some(metadata) = metadata else {
        return Err(ApiError::bad_request("metadata field is required"));
    };

    let receipt = service.ingest(&metadata, uploads).await?;
    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            message: "Verification session created",
            session_id: receipt.session_id,
        }),
    ))
}

async fn get_file<S, B>(
    State(service): Shared<S, B>,
    Path(name): Path<String>,
) -> Result<Response, ApiError>
where
    S: RecordStore + 'static,
    B: BlobStore + 'static,
{
    let bytes = service.file(&name).await?;
    Ok(([(CONTENT_TYPE, content_type(&name))], bytes).into_response())
}

fn content_type(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Maps [`IdvError`] onto status codes with a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl ToString) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.to_string(),
        }
    }
}

impl From<IdvError> for ApiError {
    fn from(err: IdvError) -> Self {
        match err {
            IdvError::NotFound { .. } => Self::not_found(err.to_string()),
            IdvError::Validation { message } => Self::bad_request(message),
            IdvError::ResourceUnavailable(ref reason) => {
                warn!(reason = %reason, "Rejecting request, store unavailable");
                Self {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    detail: "Service temporarily unavailable".into(),
                }
            }
            other => {
                error!(error = %other, "Request failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "Internal server error".into(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"detail": self.detail}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (
                IdvError::NotFound {
                    entity: "file".into(),
                    id: "x".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                IdvError::Validation {
                    message: "bad".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                IdvError::ResourceUnavailable("pool".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (IdvError::Database("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (IdvError::Internal("bug".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn internal_details_are_not_echoed() {
        let err = ApiError::from(IdvError::Database("password=hunter2".into()));
        assert_eq!(err.detail, "Internal server error");
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type("abc_front.JPG"), "image/jpeg");
        assert_eq!(content_type("abc_doc.pdf"), "application/pdf");
        assert_eq!(content_type("abc_blob"), "application/octet-stream");
    }
}
