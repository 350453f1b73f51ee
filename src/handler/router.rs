//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: HTTPS enforcement, method
//! validation, route dispatch, then security header injection on whatever
//! response came out.

use hyper::{Method, Request};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::not_found::not_found;
use super::static_files;
use crate::config::AppState;
use crate::http::{self, HttpResponse, HttpsDecision};
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub range: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    fn from_request<B>(req: &'a Request<B>) -> Self {
        let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());
        Self {
            path: req.uri().path(),
            is_head: req.method() == Method::HEAD,
            if_none_match: header("if-none-match"),
            if_modified_since: header("if-modified-since"),
            range: header("range"),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();

    // Request bodies are never read; keep only the head
    let (parts, _) = req.into_parts();
    let head = Request::from_parts(parts, ());

    let mut response = route_request(&head, &state).await;
    state.security.apply(response.headers_mut());

    if state.access_log {
        let entry = AccessLogEntry::from_exchange(&head, &response, peer_addr, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch a request to exactly one outcome
async fn route_request(req: &Request<()>, state: &AppState) -> HttpResponse {
    let ctx = RequestContext::from_request(req);

    // 1. HTTPS enforcement runs before routing, for every method
    if state.hosted {
        match http::check_https(req) {
            HttpsDecision::Secure => {}
            HttpsDecision::Redirect { location, status } => {
                return http::build_redirect_response(&location, status);
            }
            HttpsDecision::Unroutable => {
                tracing::warn!("plain HTTP request without a usable Host header");
                return not_found(&state.site, ctx.is_head).await;
            }
        }
    }

    // 2. Check HTTP method
    match *req.method() {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => return http::build_options_response(),
        ref other => {
            tracing::warn!(method = %other, "method not allowed");
            return http::build_405_response();
        }
    }

    // 3. Index or file
    if ctx.path == "/" {
        static_files::serve_index(&ctx, &state.site).await
    } else {
        static_files::serve_path(&ctx, &state.site).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::config_with_root;
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use hyper::StatusCode;
    use tempfile::TempDir;

    const EXPECTED_CSP: &str = "default-src 'none'; style-src 'self' 'unsafe-inline'; \
        script-src 'self' *.cloudflare.com *.googletagmanager.com *.google-analytics.com \
        'unsafe-inline' 'unsafe-eval'; form-action 'self'; base-uri 'self'; img-src *; \
        frame-src ghbtns.com; frame-ancestors 'none'; object-src 'none'";

    const INDEX: &str = "<html><body>cheatsheet</body></html>";
    const NOT_FOUND_PAGE: &str = "<html><body>nothing here</body></html>";

    fn site() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
        std::fs::write(dir.path().join("404.html"), NOT_FOUND_PAGE).unwrap();
        std::fs::create_dir_all(dir.path().join("_static/css")).unwrap();
        std::fs::write(dir.path().join("_static/css/theme.css"), "body{}").unwrap();
        std::fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G', 0, 1, 2]).unwrap();
        dir
    }

    fn state(dir: &TempDir, hosted: bool) -> Arc<AppState> {
        let mut cfg = config_with_root(dir.path());
        cfg.logging.access_log = false;
        Arc::new(AppState::new(cfg, hosted).unwrap())
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder()
            .uri(uri)
            .header("host", "cheats.example.com")
            .body(())
            .unwrap()
    }

    async fn send(req: Request<()>, state: &Arc<AppState>) -> (StatusCode, hyper::HeaderMap, Bytes) {
        let peer = "127.0.0.1:40000".parse().unwrap();
        let resp = handle_request(req, Arc::clone(state), peer).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    fn assert_security_headers(headers: &hyper::HeaderMap) {
        assert_eq!(headers["content-security-policy"], EXPECTED_CSP);
        assert_eq!(headers["feature-policy"], "geolocation 'none'");
        assert_eq!(headers["permissions-policy"], "geolocation=()");
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let dir = site();
        let state = state(&dir, false);

        let (status, headers, body) = send(get("/"), &state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/html; charset=utf-8");
        assert_eq!(body, INDEX);
        assert_security_headers(&headers);

        let (_, _, direct) = send(get("/index.html"), &state).await;
        assert_eq!(body, direct);
    }

    #[tokio::test]
    async fn test_nested_file_byte_identical() {
        let dir = site();
        let state = state(&dir, false);

        let (status, headers, body) = send(get("/_static/css/theme.css?v=2"), &state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/css; charset=utf-8");
        assert_eq!(body, "body{}");

        let (status, headers, body) = send(get("/logo.png"), &state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "image/png");
        assert_eq!(body.as_ref(), std::fs::read(dir.path().join("logo.png")).unwrap());
    }

    #[tokio::test]
    async fn test_missing_path_is_404_with_headers() {
        let dir = site();
        let state = state(&dir, false);

        let (status, headers, body) = send(get("/nope.html"), &state).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, NOT_FOUND_PAGE);
        assert_security_headers(&headers);
    }

    #[tokio::test]
    async fn test_directory_and_traversal_are_404() {
        let dir = site();
        let state = state(&dir, false);

        for uri in [
            "/_static",
            "/_static/",
            "/../../etc/passwd",
            "/%2e%2e/%2e%2e/etc/passwd",
            "/_static/..%2f..%2fetc%2fpasswd",
            "/a%00b",
            "/index.html/",
            "//index.html",
            "/_static//css/theme.css",
            "/index.html%2f",
        ] {
            let (status, headers, body) = send(get(uri), &state).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "uri {uri}");
            assert_eq!(body, NOT_FOUND_PAGE, "uri {uri}");
            assert_security_headers(&headers);
        }
    }

    #[tokio::test]
    async fn test_missing_index_is_404() {
        let dir = site();
        std::fs::remove_file(dir.path().join("index.html")).unwrap();
        let state = state(&dir, false);

        let (status, _, body) = send(get("/"), &state).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, NOT_FOUND_PAGE);
    }

    #[tokio::test]
    async fn test_conditional_get() {
        let dir = site();
        let state = state(&dir, false);

        let (_, headers, _) = send(get("/index.html"), &state).await;
        let etag = headers["etag"].to_str().unwrap().to_string();
        assert!(headers.contains_key("last-modified"));
        assert_eq!(headers["cache-control"], "no-cache");

        let mut req = get("/index.html");
        req.headers_mut().insert("if-none-match", etag.parse().unwrap());
        let (status, headers, body) = send(req, &state).await;
        assert_eq!(status, StatusCode::NOT_MODIFIED);
        assert!(body.is_empty());
        assert_security_headers(&headers);
    }

    #[tokio::test]
    async fn test_range_request() {
        let dir = site();
        let state = state(&dir, false);

        let mut req = get("/index.html");
        req.headers_mut().insert("range", "bytes=0-5".parse().unwrap());
        let (status, headers, body) = send(req, &state).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(body, &INDEX[..6]);
        assert_eq!(
            headers["content-range"],
            format!("bytes 0-5/{}", INDEX.len()).as_str()
        );
        assert_eq!(headers["cache-control"], "no-cache");
        assert!(headers.contains_key("last-modified"));
        assert!(headers.contains_key("etag"));

        let mut req = get("/index.html");
        req.headers_mut().insert("range", "bytes=9999-".parse().unwrap());
        let (status, headers, _) = send(req, &state).await;
        assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
        assert_security_headers(&headers);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let dir = site();
        let state = state(&dir, false);

        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/index.html")
            .body(())
            .unwrap();
        let (status, headers, body) = send(req, &state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers["content-length"],
            INDEX.len().to_string().as_str()
        );
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_other_methods() {
        let dir = site();
        let state = state(&dir, false);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/index.html")
            .body(())
            .unwrap();
        let (status, headers, _) = send(req, &state).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_security_headers(&headers);

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .body(())
            .unwrap();
        let (status, headers, _) = send(req, &state).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(headers["allow"], "GET, HEAD, OPTIONS");
    }

    #[tokio::test]
    async fn test_hosted_redirects_plain_http() {
        let dir = site();
        let state = state(&dir, true);

        let (status, headers, _) = send(get("/_static/css/theme.css?v=2"), &state).await;
        assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            headers["location"],
            "https://cheats.example.com/_static/css/theme.css?v=2"
        );
        assert_security_headers(&headers);
        assert_eq!(headers["strict-transport-security"], "max-age=31536000");
    }

    #[tokio::test]
    async fn test_hosted_serves_forwarded_https() {
        let dir = site();
        let state = state(&dir, true);

        let mut req = get("/");
        req.headers_mut()
            .insert("x-forwarded-proto", "https".parse().unwrap());
        let (status, headers, body) = send(req, &state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, INDEX);
        assert!(headers.contains_key("strict-transport-security"));
    }

    #[tokio::test]
    async fn test_not_hosted_never_redirects() {
        let dir = site();
        let state = state(&dir, false);

        let (status, headers, _) = send(get("/"), &state).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!headers.contains_key("location"));
        assert!(!headers.contains_key("strict-transport-security"));
    }
}
