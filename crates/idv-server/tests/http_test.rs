//! Router tests over in-memory SurrealDB and a temporary blob directory.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use idv_core::models::document::CreateDocument;
use idv_core::models::session::CreateSession;
use idv_core::repository::{DocumentRepository, RecordStore, SessionRepository, StoreScope};
use idv_db::{DbManager, SurrealRecordStore};
use idv_verify::{FsBlobStore, VerificationService, VerifyConfig};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "idv-test-boundary";

async fn setup() -> (Router, SurrealRecordStore<Db>, TempDir) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    idv_db::run_migrations(&db).await.unwrap();
    let store = SurrealRecordStore::new(DbManager::from_client(db, 4));

    let dir = tempfile::tempdir().unwrap();
    let blobs = FsBlobStore::open(dir.path()).await.unwrap();
    let service = Arc::new(VerificationService::new(
        store.clone(),
        blobs,
        VerifyConfig::default(),
    ));
    let router = idv_server::http::router(service, &["http://localhost:3001".to_string()]);
    (router, store, dir)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn multipart(metadata: Option<&str>, files: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(metadata) = metadata {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"metadata\"\r\n\r\n{metadata}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, content) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/api/verifications/ingest")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn seed_visible(store: &SurrealRecordStore<Db>, id: &str) {
    let scope = store.scope().unwrap();
    scope
        .sessions()
        .create(CreateSession {
            id: id.into(),
            status: "verified".into(),
            ..CreateSession::default()
        })
        .await
        .unwrap();
    scope
        .documents()
        .create(CreateDocument {
            session_id: id.into(),
            doc_type: Some("aadhaar".into()),
            doc_data: Some(json!({"name": "Anjali Rao"})),
            photo_file: Some("p.jpg".into()),
            pdf_file: None,
            fetched_ip: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn health_check() {
    let (router, _store, _dir) = setup().await;
    let (status, body) = get_json(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn list_and_detail_use_camel_case() {
    let (router, store, _dir) = setup().await;
    seed_visible(&store, "s1").await;

    let (status, list) = get_json(&router, "/api/verifications").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], "#s1");
    assert_eq!(list[0]["user"]["documentType"], "AADHAAR");
    assert!(list[0].get("device").is_none(), "summary omits detail fields");

    let (status, detail) = get_json(&router, "/api/verifications/%23s1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["id"], "#s1");
    assert_eq!(detail["steps"]["selfie"], "APPROVED");
    assert_eq!(detail["faceMatch"]["score"], 95);
    assert_eq!(detail["webhooks"], json!([]));
}

#[tokio::test]
async fn hidden_session_is_404() {
    let (router, _store, _dir) = setup().await;
    let (status, body) = get_json(&router, "/api/verifications/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Verification session not found");
}

#[tokio::test]
async fn ingest_then_fetch_file() {
    let (router, _store, _dir) = setup().await;

    let request = multipart(
        Some(r#"{"session_id":"abc","workflow":["LIVENESS"]}"#),
        &[("selfie.png", b"png-bytes")],
    );
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["session_id"], "#abc");

    let request = Request::get("/api/files/abc_selfie.png")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"png-bytes");
}

#[tokio::test]
async fn ingest_rejects_bad_metadata_without_writing() {
    let (router, _store, dir) = setup().await;

    let (status, _) = send(&router, multipart(Some("not json"), &[("a.jpg", b"x")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, multipart(None, &[("a.jpg", b"x")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_file_is_404() {
    let (router, _store, _dir) = setup().await;
    let (status, _) = get_json(&router, "/api/files/nope.jpg").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
