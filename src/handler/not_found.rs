//! Not-found outcome
//!
//! The one place every miss ends up: missing files, directories, traversal
//! attempts, unreadable files and malformed paths.

use hyper::body::Bytes;

use crate::config::SiteRoot;
use crate::http::{self, HttpResponse};

/// Served when the site's own error page is missing or unreadable
const BUILTIN_NOT_FOUND_PAGE: &str = "<!DOCTYPE html>
<html>
<head><meta charset=\"utf-8\"><title>404 Not Found</title></head>
<body>
<h1>Not Found</h1>
<p>The requested page does not exist.</p>
<p><a href=\"/\">Back to the cheatsheet</a></p>
</body>
</html>
";

/// Build the 404 response from the site's error page
pub async fn not_found(site: &SiteRoot, is_head: bool) -> HttpResponse {
    http::build_404_response(load_page(site).await, is_head)
}

async fn load_page(site: &SiteRoot) -> Bytes {
    let path = site.path().join(&site.not_found_page);
    match tokio::fs::read(&path).await {
        Ok(page) => Bytes::from(page),
        Err(e) => {
            tracing::debug!(page = %site.not_found_page, error = %e, "using built-in 404 page");
            Bytes::from_static(BUILTIN_NOT_FOUND_PAGE.as_bytes())
        }
    }
}
