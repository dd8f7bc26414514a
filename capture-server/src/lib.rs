//! In-process HTTP test double that records what it receives.
//!
//! # Design
//! The server answers every route through one fallback handler: it reduces
//! the incoming request to a [`CapturedRequest`], appends it to a shared
//! recorder, and replies with whatever [`CannedReply`] is currently
//! configured. Tests hold a [`CaptureHandle`] clone to configure replies
//! and read back captured traffic while the server runs on its own
//! runtime thread.
//!
//! The recorder uses `std::sync::RwLock` rather than tokio's so the
//! (synchronous) test thread can query it directly; every critical
//! section is a short push or clone.

use std::io;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

use http_asserts::CapturedRequest;

/// The response the double sends back to every request.
#[derive(Debug, Clone)]
pub struct CannedReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Default for CannedReply {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Recorder {
    requests: Vec<CapturedRequest>,
    reply: CannedReply,
}

/// Cloneable handle to a capture server: configure the reply, serve, and
/// read back recorded requests.
#[derive(Debug, Clone, Default)]
pub struct CaptureHandle {
    state: Arc<RwLock<Recorder>>,
}

impl CaptureHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router that captures every request regardless of method or path.
    pub fn router(&self) -> Router {
        Router::new().fallback(capture).with_state(self.clone())
    }

    /// Serve the capture router on `listener` until the task is dropped.
    pub async fn run(&self, listener: TcpListener) -> Result<(), io::Error> {
        axum::serve(listener, self.router()).await
    }

    /// Replace the reply sent to subsequent requests.
    pub fn set_reply(&self, reply: CannedReply) {
        self.write().reply = reply;
    }

    /// All requests captured so far, in arrival order.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.read().requests.clone()
    }

    /// The most recently captured request, if any.
    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.read().requests.last().cloned()
    }

    /// Drop captured traffic and restore the default reply.
    pub fn reset(&self) {
        let mut recorder = self.write();
        recorder.requests.clear();
        recorder.reply = CannedReply::default();
    }

    fn record(&self, captured: CapturedRequest) -> CannedReply {
        let mut recorder = self.write();
        recorder.requests.push(captured);
        recorder.reply.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Recorder> {
        self.state.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Recorder> {
        self.state.write().unwrap_or_else(|err| err.into_inner())
    }
}

async fn capture(State(handle): State<CaptureHandle>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let captured = CapturedRequest {
        method: parts.method.as_str().to_string(),
        uri: parts.uri.to_string(),
        // http::Version's Debug output is the wire text ("HTTP/1.1").
        version: format!("{:?}", parts.version),
        headers: parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: body.to_vec(),
    };

    let reply = handle.record(captured);

    let mut builder = Response::builder().status(reply.status);
    for (name, value) in &reply.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    match builder.body(Body::from(reply.body)) {
        Ok(response) => response,
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invalid canned reply").into_response(),
    }
}
