//! Verification against live captured traffic.
//!
//! # Design
//! Starts the capture server on a random port, drives it with ureq over
//! real HTTP, and asserts the captured requests and received responses
//! with the expectation API. Real clients add headers the test never set
//! (`host`, `content-length`, ...), so these runs prove the subset rule
//! against genuine wire traffic.

use capture_server::{CannedReply, CaptureHandle};
use http_asserts::{
    assert_fails_with, CanonicalErrorCode, HttpMethod, HttpResponse, MatchError,
    RequestExpectation, ResponseExpectation,
};

/// Start the capture server on a random port; returns the address and the
/// handle for reading captured traffic.
fn start_server() -> (std::net::SocketAddr, CaptureHandle) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let handle = CaptureHandle::new();
    let server = handle.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            server.run(listener).await
        })
        .unwrap();
    });

    (addr, handle)
}

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Reduce a ureq response to the canonical plain-data shape.
fn to_message(mut response: ureq::http::Response<ureq::Body>) -> HttpResponse {
    let status = response.status().as_u16();
    let version = format!("{:?}", response.version());
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        reason: String::new(),
        version,
        headers,
        body: Some(body),
    }
}

#[test]
fn captured_requests_match_expectations() {
    let (addr, handle) = start_server();
    let agent = agent();

    // A bare GET; the client adds host/accept headers on its own, which
    // the subset rule must tolerate.
    agent
        .get(&format!("http://{addr}/foo"))
        .call()
        .expect("HTTP transport error");

    let captured = handle.last_request().unwrap();
    RequestExpectation::new(HttpMethod::Get, "/foo")
        .version("HTTP/1.1")
        .check_captured(&captured)
        .unwrap();

    // A POST with a body and declared content type.
    agent
        .post(&format!("http://{addr}/submit"))
        .content_type("text/plain")
        .send("hello".as_bytes())
        .expect("HTTP transport error");

    let captured = handle.last_request().unwrap();
    RequestExpectation::new(HttpMethod::Post, "/submit")
        .content_type("text/plain")
        .body("hello")
        .check_captured(&captured)
        .unwrap();

    // Wrong expectations name the differing field.
    let err = RequestExpectation::new(HttpMethod::Post, "/other")
        .check_captured(&captured)
        .unwrap_err();
    assert_eq!(
        err,
        MatchError::Mismatch {
            field: "path".to_string(),
            expected: "/other".to_string(),
            actual: "/submit".to_string(),
        }
    );
}

#[test]
fn responses_match_expectations() {
    let (addr, handle) = start_server();
    handle.set_reply(CannedReply {
        status: 404,
        headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
        body: b"no such item".to_vec(),
    });

    let response = agent()
        .get(&format!("http://{addr}/missing"))
        .call()
        .expect("HTTP transport error");
    let message = to_message(response);

    ResponseExpectation::new(404)
        .header("Content-Type", "text/plain")
        .body("no such item")
        .check(&message)
        .unwrap();

    // The server adds content-length and date; only the expected subset
    // is verified.
    let err = ResponseExpectation::new(200).check(&message).unwrap_err();
    assert!(matches!(err, MatchError::Mismatch { ref field, .. } if field == "status"));
}

#[test]
fn refused_connection_carries_the_canonical_code() {
    // Bind, note the port, and drop the listener so connecting is refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = std::net::TcpStream::connect(addr);
    assert_fails_with(result, CanonicalErrorCode::ConnectionRefused).unwrap();
}

#[test]
fn successful_operation_fails_the_failure_assertion() {
    let (addr, _handle) = start_server();

    let result = std::net::TcpStream::connect(addr);
    let err = assert_fails_with(result, CanonicalErrorCode::ConnectionRefused).unwrap_err();
    assert_eq!(
        err,
        MatchError::ExpectedFailureNotRaised {
            expected: CanonicalErrorCode::ConnectionRefused
        }
    );
}
