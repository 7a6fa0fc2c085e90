//! End-to-end HTTP tests against the gateway router
//!
//! Each test builds a fresh router over a temp-dir-backed store at a low
//! difficulty and drives it with `tower::ServiceExt::oneshot`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

use factchain::api::{build_router, AppState, RateLimiter};
use factchain::attachments::AttachmentStore;
use factchain::config::LedgerConfig;
use factchain::crypto::Keypair;
use factchain::ledger::Fact;
use factchain::mining::MinerPool;
use factchain::storage::ChainStore;
use factchain::validation::FactValidator;

fn test_app(dir: &tempfile::TempDir) -> (Router, Arc<AppState>) {
    let config = Arc::new(LedgerConfig {
        difficulty: 2,
        attachment_dir: dir.path().join("multimedia"),
        db_path: dir.path().join("db"),
        ..LedgerConfig::default()
    });
    let chain = Arc::new(ChainStore::new(config.clone(), None));
    chain.ensure_genesis().unwrap();

    let state = Arc::new(AppState {
        validator: FactValidator::new(config.clone()),
        miner_pool: MinerPool::new(config.mining_workers, Duration::from_secs(30)),
        limiter: RateLimiter::new(),
        submit_lock: Mutex::new(()),
        attachments: Arc::new(AttachmentStore::new(config.clone(), None)),
        chain,
        config,
    });
    (build_router(state.clone()), state)
}

fn fact_body(keypair: &Keypair, content: &str, domain: &str) -> Body {
    let fact = Fact {
        content: content.to_string(),
        domain: domain.to_string(),
        creator: "@api_test".to_string(),
        stake: 1.0,
        metadata: BTreeMap::new(),
        signature: keypair.sign(content.as_bytes()),
        public_key: keypair.public_key(),
    };
    Body::from(serde_json::to_vec(&fact).unwrap())
}

async fn submit(app: &Router, keypair: &Keypair, content: &str, domain: &str) -> (StatusCode, Value) {
    let request = Request::post("/facts/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .body(fact_body(keypair, content, domain))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn multipart_request(uri: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "factchain-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_submit_seals_block_with_pow_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir);
    let keypair = Keypair::generate();

    let (status, body) = submit(&app, &keypair, "Water boils at 100C", "general").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["blockIndex"], 1);
    assert!(body["blockHash"].as_str().unwrap().starts_with("00"));
    assert!(body["nonce"].is_u64());
    assert_eq!(state.chain.len(), 2);
}

#[tokio::test]
async fn test_duplicate_submission_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir);
    let keypair = Keypair::generate();

    let (status, _) = submit(&app, &keypair, "Water boils at 100C", "general").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = submit(&app, &keypair, "Water boils at 100C", "general").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "DuplicateFact");
    assert_eq!(state.chain.len(), 2);
}

#[tokio::test]
async fn test_submit_rejects_bad_signature() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = test_app(&dir);
    let keypair = Keypair::generate();

    // Sign one content, submit another
    let fact = Fact {
        content: "The signed and sent contents differ".to_string(),
        domain: "general".to_string(),
        creator: "@api_test".to_string(),
        stake: 1.0,
        metadata: BTreeMap::new(),
        signature: keypair.sign(b"something else entirely"),
        public_key: keypair.public_key(),
    };
    let request = Request::post("/facts/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&fact).unwrap()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["errorKind"], "InvalidSignature");
}

#[tokio::test]
async fn test_submit_rejects_unknown_domain() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = test_app(&dir);
    let keypair = Keypair::generate();

    let (status, body) = submit(&app, &keypair, "Content in a domain nobody allows", "astrology").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "InvalidDomain");
}

#[tokio::test]
async fn test_validate_reports_chain_state() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir);
    let keypair = Keypair::generate();

    submit(&app, &keypair, "Light travels at 299792458 m/s", "education").await;

    let (status, body) = get(&app, "/validate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["blockCount"], 2);
    assert_eq!(
        body["latestHash"].as_str().unwrap(),
        state.chain.latest().unwrap().hash.to_hex()
    );
}

#[tokio::test]
async fn test_upload_joins_attachment_without_mutating_block() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir);
    let keypair = Keypair::generate();

    submit(&app, &keypair, "An evidenced fact with a document", "legal").await;
    let sealed_hash = state.chain.get(1).unwrap().hash;

    let response = app
        .clone()
        .oneshot(multipart_request("/facts/1/multimedia", "evidence.pdf", b"0123456789"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["size"], 10);
    assert_eq!(body["type"], ".pdf");
    let content_hash = body["contentHash"].as_str().unwrap().to_string();

    // The block view carries the attachment; the sealed hash is unchanged
    let (status, block) = get(&app, "/facts/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(block["hash"].as_str().unwrap(), sealed_hash.to_hex());
    assert_eq!(block["attachments"][0]["contentHash"], content_hash.as_str());
    assert_eq!(state.chain.get(1).unwrap().hash, sealed_hash);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = test_app(&dir);
    let keypair = Keypair::generate();

    submit(&app, &keypair, "A fact someone tries to attach a binary to", "general").await;

    let response = app
        .oneshot(multipart_request("/facts/1/multimedia", "payload.exe", b"MZ"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["errorKind"], "UnsupportedType");
}

#[tokio::test]
async fn test_upload_to_missing_block_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = test_app(&dir);

    let response = app
        .oneshot(multipart_request("/facts/42/multimedia", "note.txt", b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["errorKind"], "BlockNotFound");
}

#[tokio::test]
async fn test_get_missing_block_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = test_app(&dir);

    let (status, body) = get(&app, "/facts/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorKind"], "NotFound");
}

#[tokio::test]
async fn test_chain_slice_respects_limit() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = test_app(&dir);
    let keypair = Keypair::generate();

    submit(&app, &keypair, "First distinct fact for the slice", "general").await;
    submit(&app, &keypair, "Second distinct fact for the slice", "general").await;

    let (status, body) = get(&app, "/chain?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 3);
    assert_eq!(body["blocks"][0]["index"], 1);
    assert_eq!(body["blocks"][1]["index"], 2);
}

#[tokio::test]
async fn test_read_rate_limit_returns_429() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir);

    // Reads share one tier; without connect info every request counts
    // against the same fallback client.
    for _ in 0..state.config.read_per_minute {
        let (status, _) = get(&app, "/validate").await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = get(&app, "/validate").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["errorKind"], "RateLimited");
}

#[tokio::test]
async fn test_health_is_never_rate_limited() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir);

    for _ in 0..(state.config.read_per_minute + 5) {
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["persistence"], "degraded");
        assert_eq!(body["blocks"], 1);
    }
}
