//! HTTP response building module
//!
//! Builders for each status the gateway emits. Security headers are attached
//! afterwards by the router so every builder here stays policy-free.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::ops::RangeInclusive;

use super::cache::Validators;

pub type HttpResponse = Response<Full<Bytes>>;

const ALLOW: &str = "GET, HEAD, OPTIONS";

/// Body for HEAD requests: headers describe `data`, payload is empty
fn head_aware(data: Bytes, is_head: bool) -> Full<Bytes> {
    if is_head {
        Full::new(Bytes::new())
    } else {
        Full::new(data)
    }
}

/// Build 200 response for a served file
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    validators: &Validators,
    cache_control: &str,
    is_head: bool,
) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", data.len())
        .header("Accept-Ranges", "bytes")
        .header("ETag", &validators.etag)
        .header("Cache-Control", cache_control);
    if let Some(last_modified) = validators.last_modified_header() {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder
        .body(head_aware(data, is_head))
        .unwrap_or_else(|e| fallback("200", &e))
}

/// Build 206 Partial Content response; `data` is the selected slice
///
/// Carries the same caching headers as the full 200 response.
pub fn build_partial_response(
    data: Bytes,
    content_type: &str,
    validators: &Validators,
    cache_control: &str,
    range: &RangeInclusive<usize>,
    total_size: usize,
    is_head: bool,
) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header("Content-Type", content_type)
        .header("Content-Length", data.len())
        .header(
            "Content-Range",
            format!("bytes {}-{}/{total_size}", range.start(), range.end()),
        )
        .header("Accept-Ranges", "bytes")
        .header("ETag", &validators.etag)
        .header("Cache-Control", cache_control);
    if let Some(last_modified) = validators.last_modified_header() {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder
        .body(head_aware(data, is_head))
        .unwrap_or_else(|e| fallback("206", &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators, cache_control: &str) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", &validators.etag)
        .header("Cache-Control", cache_control);
    if let Some(last_modified) = validators.last_modified_header() {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("304", &e))
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> HttpResponse {
    let body = Bytes::from_static(b"Range Not Satisfiable");
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", body.len())
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("416", &e))
}

/// Build 404 response around an already rendered error page
pub fn build_404_response(page: Bytes, is_head: bool) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", page.len())
        .header("Cache-Control", "no-cache")
        .body(head_aware(page, is_head))
        .unwrap_or_else(|e| fallback("404", &e))
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    let body = Bytes::from_static(b"405 Method Not Allowed");
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", body.len())
        .header("Allow", ALLOW)
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("405", &e))
}

/// Build OPTIONS response
pub fn build_options_response() -> HttpResponse {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOW)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("OPTIONS", &e))
}

/// Build permanent redirect response
pub fn build_redirect_response(location: &str, status: StatusCode) -> HttpResponse {
    let body = Bytes::from(format!("Redirecting to {location}"));
    Response::builder()
        .status(status)
        .header("Location", location)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", body.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("redirect", &e))
}

/// Log a builder failure and substitute an empty response
fn fallback(status: &str, error: &hyper::http::Error) -> HttpResponse {
    tracing::error!(status, %error, "failed to build response");
    Response::new(Full::new(Bytes::new()))
}
