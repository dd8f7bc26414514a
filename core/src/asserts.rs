//! Expectation builders and the shared comparison core.
//!
//! # Design
//! An expectation is built once per assertion call: constructor for the
//! mandatory fields (method + path, or status), chained setters for the
//! optional ones. Each `check_*` entry point adapts its observed shape to
//! the canonical message type and delegates to one `check` body, so
//! structured, raw-string, and captured comparisons cannot drift apart.
//!
//! Header verification is always subset-match: every expected pair must be
//! present with an exact value, extra actual headers (`Host`,
//! `Content-Length`, backend defaults) never fail a test.

use std::borrow::Cow;

use serde::Deserialize;

use crate::capture::{CapturedRequest, CapturedResponse};
use crate::error::MatchError;
use crate::http::{header_value, HttpMethod, HttpRequest, HttpResponse};
use crate::parse::{parse_request, parse_response};

/// Percent-encode only the `#` character, as backends that refuse `#` in a
/// request target do.
pub fn percent_encode_pound(s: &str) -> String {
    s.replace('#', "%23")
}

/// Normalize an expected request target before comparison.
///
/// With the `pound-encoding` feature enabled the backend under test
/// percent-encodes `#` on its own, so the expected path gets the same
/// treatment here. Applied uniformly to every path comparison.
fn normalize_target(path: &str) -> Cow<'_, str> {
    if cfg!(feature = "pound-encoding") {
        Cow::Owned(percent_encode_pound(path))
    } else {
        Cow::Borrowed(path)
    }
}

/// Subset-match primitive shared by every comparison path.
///
/// Every expected pair must exist in `actual` (names case-insensitive,
/// values exact). A name may occur several times in the actual set
/// (`Set-Cookie`); the expected pair matches if any occurrence carries its
/// value. Fails with the first expected header that is absent or matches
/// no occurrence; extra actual headers are never a failure.
pub fn headers_contain(
    actual: &[(String, String)],
    expected: &[(String, String)],
) -> Result<(), MatchError> {
    for (name, want) in expected {
        let mut occurrences = actual
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str());

        match occurrences.next() {
            None => {
                return Err(MatchError::MissingHeader { name: name.clone() });
            }
            Some(first) => {
                if first != want && !occurrences.any(|v| v == want) {
                    return Err(MatchError::mismatch(
                        format!("header `{name}`"),
                        want,
                        first,
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Compare optional expected body against the actual one, byte-exact.
///
/// An absent body and an empty body are the same thing: a captured message
/// with zero body bytes carries `None`.
fn check_body(expected: &str, actual: Option<&str>) -> Result<(), MatchError> {
    let actual = actual.unwrap_or("");
    if actual != expected {
        return Err(MatchError::mismatch("body", expected, actual));
    }
    Ok(())
}

fn check_version(expected: &str, actual: &str) -> Result<(), MatchError> {
    if actual != expected {
        return Err(MatchError::mismatch("version", expected, actual));
    }
    Ok(())
}

fn check_content_type(
    expected: &str,
    headers: &[(String, String)],
) -> Result<(), MatchError> {
    match header_value(headers, "Content-Type") {
        None => Err(MatchError::MissingHeader {
            name: "Content-Type".to_string(),
        }),
        Some(got) if got != expected => {
            Err(MatchError::mismatch("content-type", expected, got))
        }
        Some(_) => Ok(()),
    }
}

/// The shape a test expects an observed request to have.
///
/// Method and path are always verified; the optional fields only when set.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestExpectation {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl RequestExpectation {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            version: None,
            headers: Vec::new(),
            body: None,
            content_type: None,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, N, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(pairs.into_iter().map(|(n, v)| (n.into(), v.into())));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Verify a structured request against this expectation.
    pub fn check(&self, actual: &HttpRequest) -> Result<(), MatchError> {
        if actual.method != self.method {
            return Err(MatchError::mismatch("method", self.method, actual.method));
        }
        let want_path = normalize_target(&self.path);
        if actual.path != want_path.as_ref() {
            return Err(MatchError::mismatch("path", want_path, &actual.path));
        }
        if let Some(version) = &self.version {
            check_version(version, &actual.version)?;
        }
        headers_contain(&actual.headers, &self.headers)?;
        if let Some(content_type) = &self.content_type {
            check_content_type(content_type, &actual.headers)?;
        }
        if let Some(body) = &self.body {
            check_body(body, actual.body.as_deref())?;
        }
        Ok(())
    }

    /// Parse raw HTTP/1.x request text, then verify it.
    pub fn check_raw(&self, raw: &str) -> Result<(), MatchError> {
        self.check(&parse_request(raw)?)
    }

    /// Reduce a captured test-double request, then verify it.
    pub fn check_captured(&self, captured: &CapturedRequest) -> Result<(), MatchError> {
        self.check(&captured.to_message()?)
    }
}

/// The shape a test expects an observed response to have.
///
/// Status is always verified; reason, version, headers, content type, and
/// body only when set.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseExpectation {
    pub status: u16,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl ResponseExpectation {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            reason: None,
            version: None,
            headers: Vec::new(),
            body: None,
            content_type: None,
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, N, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(pairs.into_iter().map(|(n, v)| (n.into(), v.into())));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Verify a structured response against this expectation.
    pub fn check(&self, actual: &HttpResponse) -> Result<(), MatchError> {
        if actual.status != self.status {
            return Err(MatchError::mismatch("status", self.status, actual.status));
        }
        if let Some(reason) = &self.reason {
            if &actual.reason != reason {
                return Err(MatchError::mismatch("reason", reason, &actual.reason));
            }
        }
        if let Some(version) = &self.version {
            check_version(version, &actual.version)?;
        }
        headers_contain(&actual.headers, &self.headers)?;
        if let Some(content_type) = &self.content_type {
            check_content_type(content_type, &actual.headers)?;
        }
        if let Some(body) = &self.body {
            check_body(body, actual.body.as_deref())?;
        }
        Ok(())
    }

    /// Parse raw HTTP/1.x response text, then verify it.
    pub fn check_raw(&self, raw: &str) -> Result<(), MatchError> {
        self.check(&parse_response(raw)?)
    }

    /// Reduce a captured test-double response, then verify it.
    pub fn check_captured(&self, captured: &CapturedResponse) -> Result<(), MatchError> {
        self.check(&captured.to_message()?)
    }
}
