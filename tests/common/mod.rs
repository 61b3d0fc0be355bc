// Shared fixtures: a mock speech service and WAV writers.
//
// The mock mimics the session protocol closely enough to check status codes,
// cookie affinity and credential embedding. Every request is recorded.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path as UrlPath, RawQuery, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use speech_session::config::ServiceConfig;
use speech_session::{Credentials, SessionClient};

pub const USERNAME: &str = "mock_username";
pub const PASSWORD: &str = "mock_password";
/// `Basic base64("mock_username:mock_password")`
pub const BASIC_AUTH: &str = "Basic bW9ja191c2VybmFtZTptb2NrX3Bhc3N3b3Jk";

pub const SESSION_ID: &str = "e6cf2a9b8d0f4b38a0b51f6c3e1d7a42";
pub const AFFINITY_COOKIE: &str = "SESSIONID=affinity-42";

pub const HELLO_WORLD: &str = r#"{
    "result_index": 0,
    "results": [
        {"final": true, "alternatives": [{"transcript": "ignored, no confidence"}]},
        {"final": true, "alternatives": [{"confidence": 0.93, "transcript": "hello world"}]}
    ]
}"#;

/// How the mock answers each endpoint.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub create_status: u16,
    /// Raw body for a failed create; defaults to a structured error.
    pub create_error_body: Option<&'static str>,
    pub status_code: u16,
    pub state: &'static str,
    pub recognize_status: u16,
    pub recognize_body: String,
    pub observe_status: u16,
    pub delete_status: u16,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            create_status: 201,
            create_error_body: None,
            status_code: 200,
            state: "initialized",
            recognize_status: 200,
            recognize_body: HELLO_WORLD.to_string(),
            observe_status: 200,
            delete_status: 204,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub cookie: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

struct Mock {
    base_url: String,
    config: MockConfig,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Mock {
    fn record(&self, method: Method, path: String, query: Option<String>, headers: &HeaderMap, body: Bytes) {
        let get = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path,
            query,
            cookie: get(header::COOKIE),
            authorization: get(header::AUTHORIZATION),
            content_type: get(header::CONTENT_TYPE),
            body,
        });
    }

    fn session_uri(&self) -> String {
        format!("{}/v1/sessions/{}", self.base_url, SESSION_ID)
    }
}

pub struct MockService {
    pub base_url: String,
    mock: Arc<Mock>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockService {
    pub async fn start(config: MockConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let mock = Arc::new(Mock {
            base_url: base_url.clone(),
            config,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/sessions", post(create_session))
            .route("/v1/sessions/:id", axum::routing::delete(delete_session))
            .route("/v1/sessions/:id/recognize", get(poll_status).post(recognize))
            .route("/v1/sessions/:id/observe_result", get(observe_result))
            .with_state(Arc::clone(&mock));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .ok();
        });

        Self {
            base_url,
            mock,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            url: self.base_url.clone(),
            request_timeout_secs: 10,
            ..ServiceConfig::default()
        }
    }

    pub fn client(&self) -> SessionClient {
        SessionClient::new(self.service_config(), credentials())
    }

    pub fn session_uri(&self) -> String {
        self.mock.session_uri()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.mock.requests.lock().unwrap().clone()
    }

    /// `"METHOD /path"` for every request so far.
    pub fn lines(&self) -> Vec<String> {
        self.requests().iter().map(RecordedRequest::line).collect()
    }

    pub fn deleted(&self) -> bool {
        self.requests().iter().any(|r| r.method == Method::DELETE)
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
    }
}

pub fn credentials() -> Credentials {
    Credentials::new(USERNAME, PASSWORD).unwrap()
}

fn service_error(status: u16, error: &str, description: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap();
    (
        status,
        Json(json!({"error": error, "code": status.as_u16(), "code_description": description})),
    )
        .into_response()
}

fn has_affinity(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookie| cookie.contains(AFFINITY_COOKIE))
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(BASIC_AUTH)
}

async fn create_session(
    State(mock): State<Arc<Mock>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(Method::POST, "/v1/sessions".to_string(), query, &headers, body);

    if !is_authorized(&headers) {
        return service_error(401, "Not Authorized", "Unauthorized");
    }

    let status = mock.config.create_status;
    if status != 201 {
        if let Some(raw) = mock.config.create_error_body {
            return (StatusCode::from_u16(status).unwrap(), raw).into_response();
        }
        return service_error(status, "Model not found", "Not Found");
    }

    let session_uri = mock.session_uri();
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, format!("{}; Path=/", AFFINITY_COOKIE))],
        Json(json!({
            "session_id": SESSION_ID,
            "new_session_uri": session_uri,
            "recognize": format!("{}/recognize", session_uri),
            "observe_result": format!("{}/observe_result", session_uri),
        })),
    )
        .into_response()
}

async fn poll_status(
    State(mock): State<Arc<Mock>>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/v1/sessions/{}/recognize", id);
    mock.record(Method::GET, path, None, &headers, Bytes::new());

    if !has_affinity(&headers) {
        return service_error(400, "Session does not exist", "Bad Request");
    }
    if mock.config.status_code != 200 {
        return service_error(mock.config.status_code, "Session busy", "Conflict");
    }

    let session_uri = mock.session_uri();
    Json(json!({
        "session": {
            "state": mock.config.state,
            "model": "pt-BR_BroadbandModel",
            "recognize": format!("{}/recognize", session_uri),
            "observe_result": format!("{}/observe_result", session_uri),
        }
    }))
    .into_response()
}

async fn recognize(
    State(mock): State<Arc<Mock>>,
    UrlPath(id): UrlPath<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("/v1/sessions/{}/recognize", id);
    mock.record(Method::POST, path, query, &headers, body);

    if !has_affinity(&headers) {
        return service_error(400, "Session does not exist", "Bad Request");
    }
    if mock.config.recognize_status != 200 {
        return service_error(
            mock.config.recognize_status,
            "Unable to transcode data stream audio/wav -> audio/x-float-array",
            "Bad Request",
        );
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        mock.config.recognize_body.clone(),
    )
        .into_response()
}

async fn observe_result(
    State(mock): State<Arc<Mock>>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/v1/sessions/{}/observe_result", id);
    mock.record(Method::GET, path, None, &headers, Bytes::new());

    if !is_authorized(&headers) {
        return service_error(401, "Not Authorized", "Unauthorized");
    }
    if mock.config.observe_status != 200 {
        return service_error(mock.config.observe_status, "No results yet", "Not Found");
    }

    Json(json!({"results": []})).into_response()
}

async fn delete_session(
    State(mock): State<Arc<Mock>>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/v1/sessions/{}", id);
    mock.record(Method::DELETE, path, None, &headers, Bytes::new());

    if !is_authorized(&headers) {
        return service_error(401, "Not Authorized", "Unauthorized");
    }

    match mock.config.delete_status {
        204 => StatusCode::NO_CONTENT.into_response(),
        other => service_error(other, "Session still in use", "Session not deleted"),
    }
}

/// Writes a short 16kHz mono WAV file.
pub fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..1600 {
        writer.write_sample(((i % 100) * 100) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Writes bytes that sniff as MP3 (ID3 tag) but are not WAV.
pub fn write_mp3(path: &Path) {
    let mut bytes = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    bytes.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
    bytes.extend(std::iter::repeat(0u8).take(256));
    std::fs::write(path, bytes).unwrap();
}
