//! Stub Immich server on an ephemeral port.
//!
//! Implements just enough of `/api`: `POST /assets` with SHA-1 content
//! deduplication, `GET /server/ping` and `GET /users/me`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sha1::{Digest, Sha1};

pub const TEST_API_KEY: &str = "test-api-key";

/// What the stub saw for one upload request.
#[derive(Debug, Clone, Default)]
pub struct ReceivedUpload {
    pub fields: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub byte_length: usize,
}

#[derive(Clone, Default)]
struct StubState {
    assets_by_checksum: Arc<Mutex<HashMap<String, String>>>,
    received: Arc<Mutex<Vec<ReceivedUpload>>>,
    requests: Arc<AtomicU32>,
}

pub struct StubImmich {
    pub base_url: String,
    state: StubState,
}

impl StubImmich {
    /// Upload requests received, including rejected ones.
    pub fn requests(&self) -> u32 {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<ReceivedUpload> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn asset_count(&self) -> usize {
        self.state.assets_by_checksum.lock().unwrap().len()
    }
}

pub async fn spawn_stub_immich() -> StubImmich {
    let state = StubState::default();
    let app = Router::new()
        .route("/api/assets", post(upload_asset))
        .route("/api/server/ping", get(ping))
        .route("/api/users/me", get(current_user))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubImmich {
        base_url: format!("http://{}/api", addr),
        state,
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == TEST_API_KEY)
        .unwrap_or(false)
}

async fn upload_asset(
    State(state): State<StubState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let mut received = ReceivedUpload::default();
    for name in ["x-immich-checksum", "x-photorelay-original-metadata"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            received.headers.insert(name.to_string(), value.to_string());
        }
    }

    let mut checksum = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "assetData" {
            received.file_name = field.file_name().map(str::to_string);
            received.content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.unwrap();
            received.byte_length = data.len();
            checksum = Some(hex::encode(Sha1::digest(&data)));
        } else {
            let value = field.text().await.unwrap();
            received.fields.insert(name, value);
        }
    }
    state.received.lock().unwrap().push(received);

    // The body is drained first so the client never sees a reset mid-upload.
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key" })),
        );
    }

    let Some(checksum) = checksum else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "assetData is required" })),
        );
    };

    let mut assets = state.assets_by_checksum.lock().unwrap();
    if let Some(existing) = assets.get(&checksum) {
        return (
            StatusCode::OK,
            Json(json!({ "id": existing, "status": "duplicate" })),
        );
    }
    let id = format!("a{}", assets.len() + 1);
    assets.insert(checksum, id.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "status": "created" })),
    )
}

async fn ping() -> Json<Value> {
    Json(json!({ "res": "pong" }))
}

async fn current_user(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({ "id": "u1", "name": "Test User", "email": "test@example.com", "isAdmin": true })),
    )
}
