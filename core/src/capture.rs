//! Captured test-double messages.
//!
//! # Design
//! `CapturedRequest` / `CapturedResponse` are the records an in-process
//! test server or client stand-in produces: stringly method and version
//! (whatever the stand-in saw), raw byte bodies, headers in received
//! order. Each converts to the canonical message type through one
//! `to_message` adapter, so the comparison core never grows a second code
//! path for captured traffic.

use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A request recorded by a test-double server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    pub method: String,
    pub uri: String,
    pub version: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// Reduce the captured record to the canonical request shape.
    ///
    /// The method token is canonicalized and the raw body validated as
    /// UTF-8; either failing is reported as `Malformed`, never coerced.
    pub fn to_message(&self) -> Result<HttpRequest, MatchError> {
        Ok(HttpRequest {
            method: HttpMethod::parse(&self.method)?,
            path: self.uri.clone(),
            version: self.version.clone(),
            headers: self.headers.clone(),
            body: body_text(&self.body)?,
        })
    }
}

/// A response recorded by a test-double client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub status: u16,
    #[serde(default)]
    pub reason: String,
    pub version: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Vec<u8>,
}

impl CapturedResponse {
    /// Reduce the captured record to the canonical response shape.
    pub fn to_message(&self) -> Result<HttpResponse, MatchError> {
        Ok(HttpResponse {
            status: self.status,
            reason: self.reason.clone(),
            version: self.version.clone(),
            headers: self.headers.clone(),
            body: body_text(&self.body)?,
        })
    }
}

/// Empty captured bodies mean "no body"; anything else must be UTF-8.
fn body_text(bytes: &[u8]) -> Result<Option<String>, MatchError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    String::from_utf8(bytes.to_vec())
        .map(Some)
        .map_err(|_| MatchError::Malformed {
            detail: "captured body is not valid UTF-8".to_string(),
        })
}
