//! Plain-data HTTP message types shared by every comparison path.
//!
//! # Design
//! Every observed shape — a structured message built by the library under
//! test, a raw HTTP/1.x string, or a captured test-double record — is
//! reduced to `HttpRequest` / `HttpResponse` before any field is compared.
//! The comparison core in `asserts` therefore exists exactly once.
//!
//! All fields use owned types (`String`, `Vec`) so messages can be built
//! anywhere (tests, fixture files, the capture server) without lifetime
//! concerns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// HTTP method as a canonical enumeration.
///
/// Methods are always compared as this enum, never as raw strings, so
/// `"Get"` vs `"GET"` drift in an observed message cannot slip through a
/// string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl HttpMethod {
    /// Canonicalize a method token from wire text or a captured record.
    ///
    /// Matching is case-insensitive; an unknown token is `Malformed`
    /// rather than being carried along as a string.
    pub fn parse(token: &str) -> Result<Self, MatchError> {
        let method = match token {
            t if t.eq_ignore_ascii_case("GET") => HttpMethod::Get,
            t if t.eq_ignore_ascii_case("POST") => HttpMethod::Post,
            t if t.eq_ignore_ascii_case("PUT") => HttpMethod::Put,
            t if t.eq_ignore_ascii_case("DELETE") => HttpMethod::Delete,
            t if t.eq_ignore_ascii_case("HEAD") => HttpMethod::Head,
            t if t.eq_ignore_ascii_case("OPTIONS") => HttpMethod::Options,
            t if t.eq_ignore_ascii_case("PATCH") => HttpMethod::Patch,
            other => {
                return Err(MatchError::Malformed {
                    detail: format!("unknown HTTP method `{other}`"),
                })
            }
        };
        Ok(method)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request reduced to plain data.
///
/// `path` is the origin-form target (`/items?page=2`), `version` the
/// protocol version text (`HTTP/1.1`). Headers keep their received order;
/// lookup is case-insensitive via [`header_value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub version: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Option<String>,
}

/// An HTTP response reduced to plain data.
///
/// `reason` may be empty; many structured sources do not carry a reason
/// phrase, and the comparator only checks it when a test asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    #[serde(default)]
    pub reason: String,
    pub version: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Look up a header by case-insensitive name, returning the first match.
pub fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
