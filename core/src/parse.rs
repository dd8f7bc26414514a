//! Raw HTTP/1.x text decomposition.
//!
//! # Design
//! These functions consume already-materialized strings (a request a test
//! client captured off a socket, a response a test typed out by hand) and
//! split them with the standard line-and-header-block grammar: one start
//! line, `\r\n`-terminated header lines until a blank line, everything
//! after the blank line as the body. This is an in-memory decomposer for
//! assertions, not a streaming network parser — no chunked decoding, no
//! continuation lines.

use crate::error::MatchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Parse raw HTTP/1.x request text into an [`HttpRequest`].
///
/// The request line must carry exactly `method target version`. A message
/// without a blank line separating headers from body has no body.
pub fn parse_request(raw: &str) -> Result<HttpRequest, MatchError> {
    let (start_line, headers, body) = split_message(raw)?;

    let mut parts = start_line.split(' ');
    let (method, path, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(p), Some(v), None) => (m, p, v),
        _ => {
            return Err(MatchError::Malformed {
                detail: format!("bad request line `{start_line}`"),
            })
        }
    };

    Ok(HttpRequest {
        method: HttpMethod::parse(method)?,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    })
}

/// Parse raw HTTP/1.x response text into an [`HttpResponse`].
///
/// The reason phrase is everything after the status code and may be empty
/// or contain spaces (`HTTP/1.1 404 Not Found`).
pub fn parse_response(raw: &str) -> Result<HttpResponse, MatchError> {
    let (start_line, headers, body) = split_message(raw)?;

    let mut parts = start_line.splitn(3, ' ');
    let (version, status) = match (parts.next(), parts.next()) {
        (Some(v), Some(s)) if !v.is_empty() && !s.is_empty() => (v, s),
        _ => {
            return Err(MatchError::Malformed {
                detail: format!("bad status line `{start_line}`"),
            })
        }
    };
    let reason = parts.next().unwrap_or("");

    let status: u16 = status.parse().map_err(|_| MatchError::Malformed {
        detail: format!("non-numeric status code `{status}`"),
    })?;

    Ok(HttpResponse {
        status,
        reason: reason.to_string(),
        version: version.to_string(),
        headers,
        body,
    })
}

/// Split a message into start line, header pairs, and optional body.
fn split_message(
    raw: &str,
) -> Result<(&str, Vec<(String, String)>, Option<String>), MatchError> {
    // The head ends at the first blank line; absent one, the whole input
    // is head and the message has no body.
    let (head, body) = match raw.split_once("\r\n\r\n") {
        Some((head, rest)) => (head, Some(rest.to_string())),
        None => (raw.trim_end_matches("\r\n"), None),
    };

    let mut lines = head.split("\r\n");
    let start_line = lines.next().filter(|l| !l.is_empty()).ok_or_else(|| {
        MatchError::Malformed {
            detail: "empty message".to_string(),
        }
    })?;

    let mut headers = Vec::new();
    for line in lines {
        let (name, value) = line.split_once(':').ok_or_else(|| MatchError::Malformed {
            detail: format!("header line without colon: `{line}`"),
        })?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok((start_line, headers, body))
}
