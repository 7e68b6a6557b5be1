//! In-process stand-ins for the four paste services, served by axum on an
//! ephemeral localhost port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use binclient::ServiceConfig;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

pub const IVANBIN_CREATED_AT: &str = "Tue, 3 Jun 2008 11:05:30 GMT";
pub const IVANBIN_EXPIRES_AT: &str = "Sat, 14 Jun 2008 11:05:30 GMT";
pub const SOURCEBIN_CREATED: &str = "2019-10-12T16:20:00.000Z";

#[derive(Clone, Debug)]
pub struct StoredPaste {
    pub body: String,
    pub language: Option<String>,
    pub expire: Option<String>,
}

/// One recorded create request.
#[derive(Clone, Debug)]
pub struct Upload {
    pub path: &'static str,
    pub headers: HeaderMap,
}

#[derive(Clone, Default)]
pub struct Backend {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    pastes: Mutex<HashMap<String, StoredPaste>>,
    uploads: Mutex<Vec<Upload>>,
    next_id: AtomicUsize,
    retrievals: AtomicUsize,
}

impl Backend {
    fn store(&self, path: &'static str, headers: HeaderMap, paste: StoredPaste) -> String {
        let id = format!("p{}", self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        self.inner.uploads.lock().unwrap().push(Upload { path, headers });
        self.inner.pastes.lock().unwrap().insert(id.clone(), paste);
        id
    }

    fn fetch(&self, id: &str) -> Option<StoredPaste> {
        self.inner.retrievals.fetch_add(1, Ordering::SeqCst);
        self.inner.pastes.lock().unwrap().get(id).cloned()
    }

    pub fn paste(&self, id: &str) -> Option<StoredPaste> {
        self.inner.pastes.lock().unwrap().get(id).cloned()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.inner.uploads.lock().unwrap().clone()
    }

    pub fn retrievals(&self) -> usize {
        self.inner.retrievals.load(Ordering::SeqCst)
    }
}

fn plain(body: String) -> StoredPaste {
    StoredPaste {
        body,
        language: None,
        expire: None,
    }
}

/// All four services on one router; their paths do not overlap.
pub fn router(backend: Backend) -> Router {
    Router::new()
        .route("/documents", post(haste_create))
        .route("/raw/:id", get(haste_raw))
        .route("/paste/new", post(ghostbin_create))
        .route("/paste/:name", get(ghostbin_get))
        .route("/api/create", post(ivanbin_create))
        .route("/api/info/:id", get(ivanbin_info))
        .route("/api/bin", post(sourcebin_create))
        .route("/api/bin/:id", get(sourcebin_get))
        .with_state(backend)
}

/// Answers every request with `status`.
pub fn status_only(status: StatusCode) -> Router {
    Router::new().fallback(move || async move { (status, "nope") })
}

async fn haste_create(
    State(backend): State<Backend>,
    headers: HeaderMap,
    body: String,
) -> Json<serde_json::Value> {
    let key = backend.store("/documents", headers, plain(body));
    Json(json!({ "key": key }))
}

async fn haste_raw(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    match backend.fetch(&id) {
        Some(paste) => paste.body.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn ghostbin_create(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Form(mut fields): Form<HashMap<String, String>>,
) -> Response {
    let Some(text) = fields.remove("text") else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let paste = StoredPaste {
        body: text,
        language: fields.remove("lang"),
        expire: fields.remove("expire"),
    };
    let id = backend.store("/paste/new", headers, paste);
    Redirect::to(&format!("/paste/{id}")).into_response()
}

async fn ghostbin_get(State(backend): State<Backend>, Path(name): Path<String>) -> Response {
    let Some(id) = name.strip_suffix(".json") else {
        return format!("<html><body>paste {name}</body></html>").into_response();
    };
    match backend.fetch(id) {
        Some(paste) => {
            let language = paste.language.unwrap_or_default();
            Json(json!({
                "id": id,
                "body": paste.body,
                "expiration": paste.expire.unwrap_or_default(),
                "encrypted": false,
                "language": { "name": language.to_uppercase(), "id": language },
            }))
            .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn ivanbin_create(
    State(backend): State<Backend>,
    headers: HeaderMap,
    body: String,
) -> Json<serde_json::Value> {
    let id = backend.store("/api/create", headers, plain(body));
    Json(json!({ "binId": id }))
}

async fn ivanbin_info(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    match backend.fetch(&id) {
        Some(paste) => Json(json!({
            "binId": id,
            "body": paste.body,
            "createdAt": IVANBIN_CREATED_AT,
            "expiresAt": IVANBIN_EXPIRES_AT,
        }))
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn sourcebin_create(
    State(backend): State<Backend>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    let key = backend.store("/api/bin", headers, plain(body));
    (StatusCode::CREATED, Json(json!({ "key": key })))
}

async fn sourcebin_get(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    match backend.fetch(&id) {
        Some(paste) => Json(json!({
            "key": id,
            "code": paste.body,
            "created": SOURCEBIN_CREATED,
        }))
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A server on its own runtime, for tests that block the calling thread.
pub struct MockServer {
    pub addr: SocketAddr,
    _runtime: Runtime,
}

impl MockServer {
    pub fn start(router: Router) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("build server runtime");
        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        runtime.spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        MockServer {
            addr,
            _runtime: runtime,
        }
    }

    pub fn config(&self) -> ServiceConfig {
        config(self.addr)
    }
}

/// Serves `router` on the current runtime.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}

pub fn config(addr: SocketAddr) -> ServiceConfig {
    ServiceConfig::new(&format!("http://{addr}/")).expect("valid mock base url")
}
