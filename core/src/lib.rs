//! HTTP message verification for test suites.
//!
//! # Overview
//! Asserts that an observed HTTP request or response — a structured
//! in-memory message, a raw HTTP/1.x string, or a record captured by an
//! in-process test double — matches an expected shape: method, target
//! path, version, status, reason phrase, a header subset, and body
//! content. Separately, asserts that a fallible operation failed with a
//! specific platform-normalized error code.
//!
//! # Design
//! - Every observed shape is reduced to the plain-data `HttpRequest` /
//!   `HttpResponse` types before comparison, so the comparison core exists
//!   exactly once (`asserts`).
//! - Entry points return `Result<(), MatchError>`: pass is `Ok(())`, fail
//!   names the first differing field with expected and actual values.
//!   There is no boolean-returning variant.
//! - Header verification is subset-match throughout: extra actual headers
//!   never fail a test.
//! - Every comparison is a pure, synchronous computation over
//!   already-materialized inputs; nothing here touches the network.
//! - Error-code assertions normalize native codes per target at compile
//!   time (`failure`).

pub mod asserts;
pub mod capture;
pub mod error;
pub mod failure;
pub mod http;
pub mod parse;

pub use asserts::{headers_contain, percent_encode_pound, RequestExpectation, ResponseExpectation};
pub use capture::{CapturedRequest, CapturedResponse};
pub use error::MatchError;
pub use failure::{
    assert_fails_with, assert_fails_with_strategy, CanonicalErrorCode, CheckStrategy,
};
pub use http::{header_value, HttpMethod, HttpRequest, HttpResponse};
pub use parse::{parse_request, parse_response};
