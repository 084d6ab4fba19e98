//! In-process mock of the Storage API.
//!
//! Records every request it receives and answers from a table of canned
//! responses keyed by method and path. Unmatched requests get a 404 in the
//! service's error format.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use supa_storage::StorageClient;

pub const API_KEY: &str = "test-key";
pub const ACCESS_TOKEN: &str = "test-token";

/// A request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    path: String,
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
}

#[derive(Clone, Default)]
struct Shared {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    routes: Arc<Mutex<Vec<Route>>>,
}

pub struct MockStorage {
    addr: SocketAddr,
    shared: Shared,
}

impl MockStorage {
    pub async fn start() -> Self {
        let shared = Shared::default();
        let app = Router::new().fallback(handle).with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock storage");
        let addr = listener.local_addr().expect("mock storage address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock storage server");
        });

        Self { addr, shared }
    }

    /// Storage service root served by this mock.
    pub fn url(&self) -> String {
        format!("http://{}/storage/v1", self.addr)
    }

    pub fn client(&self) -> StorageClient {
        StorageClient::with_access_token(&self.url(), API_KEY, ACCESS_TOKEN)
            .expect("Failed to create StorageClient")
    }

    /// Answer `method path` (path relative to the storage root) with JSON.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.add_route(
            method,
            path,
            status,
            "application/json",
            Bytes::from(body.to_string()),
        );
    }

    /// Answer `method path` with raw bytes.
    pub fn respond_bytes(&self, method: Method, path: &str, status: u16, body: &'static [u8]) {
        self.add_route(
            method,
            path,
            status,
            "application/octet-stream",
            Bytes::from_static(body),
        );
    }

    fn add_route(
        &self,
        method: Method,
        path: &str,
        status: u16,
        content_type: &'static str,
        body: Bytes,
    ) {
        self.shared.routes.lock().unwrap().push(Route {
            method,
            path: format!("/storage/v1{}", path),
            status: StatusCode::from_u16(status).expect("valid status"),
            content_type,
            body,
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request was recorded")
    }

    pub fn request_count(&self) -> usize {
        self.shared.requests.lock().unwrap().len()
    }
}

async fn handle(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    shared.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        headers,
        body,
    });

    let route = shared
        .routes
        .lock()
        .unwrap()
        .iter()
        .find(|r| r.method == method && r.path == path)
        .cloned();

    match route {
        Some(route) => (
            route.status,
            [(header::CONTENT_TYPE, route.content_type)],
            route.body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            json!({
                "statusCode": "404",
                "error": "not_found",
                "message": format!("No mock route for {} {}", method, path),
            })
            .to_string(),
        )
            .into_response(),
    }
}

/// A bucket as the service returns it.
pub fn bucket_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "owner": "owner-1",
        "public": false,
        "created_at": "2024-01-01T00:00:00.000Z",
        "updated_at": "2024-01-02T12:00:00.000Z"
    })
}

/// A file as the service returns it.
pub fn file_json(name: &str) -> Value {
    json!({
        "name": name,
        "bucket_id": "photos-id",
        "owner": "owner-1",
        "id": format!("id-{}", name),
        "created_at": "2024-01-01T00:00:00+00:00",
        "updated_at": "2024-01-01T00:00:00+00:00",
        "last_accessed_at": "2024-01-03T00:00:00+00:00",
        "metadata": {"size": 5, "mimetype": "text/plain"}
    })
}
