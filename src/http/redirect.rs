//! HTTP to HTTPS redirect for hosted mode
//!
//! The gateway never terminates TLS itself; behind a platform router the
//! original scheme arrives in `X-Forwarded-Proto`.

use hyper::{Method, Request, StatusCode};

/// What hosted mode should do with a request
#[derive(Debug, PartialEq, Eq)]
pub enum HttpsDecision {
    /// Already HTTPS, serve normally
    Secure,
    /// Redirect to this absolute URL with this status
    Redirect { location: String, status: StatusCode },
    /// Plain HTTP but no usable Host to redirect to
    Unroutable,
}

/// Decide whether a request must be upgraded to HTTPS
pub fn check_https<B>(req: &Request<B>) -> HttpsDecision {
    if is_secure(req) {
        return HttpsDecision::Secure;
    }

    let Some(host) = request_host(req) else {
        return HttpsDecision::Unroutable;
    };

    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or("/", hyper::http::uri::PathAndQuery::as_str);

    HttpsDecision::Redirect {
        location: format!("https://{host}{path_and_query}"),
        status: redirect_status(req.method()),
    }
}

/// 301 for safe methods, 308 otherwise so clients keep the method and body
pub fn redirect_status(method: &Method) -> StatusCode {
    match *method {
        Method::GET | Method::HEAD => StatusCode::MOVED_PERMANENTLY,
        _ => StatusCode::PERMANENT_REDIRECT,
    }
}

fn is_secure<B>(req: &Request<B>) -> bool {
    if req.uri().scheme_str() == Some("https") {
        return true;
    }
    req.headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

fn request_host<B>(req: &Request<B>) -> Option<String> {
    let host = req
        .headers()
        .get(hyper::header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(hyper::http::uri::Authority::as_str))?;

    // The Host header is attacker-controlled and ends up in Location
    let authority: hyper::http::uri::Authority = host.parse().ok()?;
    if authority.as_str().contains('@') {
        return None;
    }
    // Drop any explicit plain-HTTP port
    match authority.port_u16() {
        Some(80) | None => Some(authority.host().to_string()),
        Some(port) => Some(format!("{}:{port}", authority.host())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str, host: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(h) = host {
            builder = builder.header("host", h);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_get_redirects_permanently() {
        let req = request(Method::GET, "/css/site.css?v=3", Some("cheats.example.com"));
        assert_eq!(
            check_https(&req),
            HttpsDecision::Redirect {
                location: "https://cheats.example.com/css/site.css?v=3".to_string(),
                status: StatusCode::MOVED_PERMANENTLY,
            }
        );
    }

    #[test]
    fn test_post_uses_308() {
        let req = request(Method::POST, "/", Some("cheats.example.com"));
        match check_https(&req) {
            HttpsDecision::Redirect { status, .. } => {
                assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
            }
            other => panic!("Expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_forwarded_https_is_secure() {
        let mut req = request(Method::GET, "/", Some("cheats.example.com"));
        req.headers_mut()
            .insert("x-forwarded-proto", "https, http".parse().unwrap());
        assert_eq!(check_https(&req), HttpsDecision::Secure);
    }

    #[test]
    fn test_forwarded_http_redirects() {
        let mut req = request(Method::GET, "/", Some("cheats.example.com"));
        req.headers_mut()
            .insert("x-forwarded-proto", "http".parse().unwrap());
        assert!(matches!(check_https(&req), HttpsDecision::Redirect { .. }));
    }

    #[test]
    fn test_port_handling() {
        let req = request(Method::GET, "/a", Some("cheats.example.com:80"));
        assert!(matches!(
            check_https(&req),
            HttpsDecision::Redirect { ref location, .. } if location == "https://cheats.example.com/a"
        ));

        let req = request(Method::GET, "/a", Some("localhost:5000"));
        assert!(matches!(
            check_https(&req),
            HttpsDecision::Redirect { ref location, .. } if location == "https://localhost:5000/a"
        ));
    }

    #[test]
    fn test_missing_or_bad_host() {
        let req = request(Method::GET, "/", None);
        assert_eq!(check_https(&req), HttpsDecision::Unroutable);

        let req = request(Method::GET, "/", Some("evil.com/path"));
        assert_eq!(check_https(&req), HttpsDecision::Unroutable);

        let req = request(Method::GET, "/", Some("user@evil.com"));
        assert_eq!(check_https(&req), HttpsDecision::Unroutable);
    }
}
