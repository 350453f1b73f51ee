//! Static file serving module
//!
//! Reads a resolved file and builds the 200/206/304/416 response for it.

use hyper::body::Bytes;
use std::path::Path;

use super::not_found::not_found;
use super::resolve::{resolve_file, sanitize};
use super::router::RequestContext;
use crate::config::SiteRoot;
use crate::http::cache::Validators;
use crate::http::{self, mime, response, HttpResponse, RangeParseResult};

/// A file read from the document root
struct LoadedFile {
    content: Bytes,
    content_type: &'static str,
    validators: Validators,
}

/// Serve the index document for `/`
pub async fn serve_index(ctx: &RequestContext<'_>, site: &SiteRoot) -> HttpResponse {
    serve_relative(ctx, site, Path::new(&site.index_file)).await
}

/// Serve an arbitrary request path
pub async fn serve_path(ctx: &RequestContext<'_>, site: &SiteRoot) -> HttpResponse {
    match sanitize(ctx.path) {
        Ok(relative) => serve_relative(ctx, site, &relative).await,
        Err(reason) => {
            tracing::warn!(path = ctx.path, ?reason, "rejected request path");
            not_found(site, ctx.is_head).await
        }
    }
}

async fn serve_relative(
    ctx: &RequestContext<'_>,
    site: &SiteRoot,
    relative: &Path,
) -> HttpResponse {
    match load_file(site.path(), relative).await {
        Some(file) => build_static_file_response(ctx, &file, &site.cache_control),
        None => not_found(site, ctx.is_head).await,
    }
}

async fn load_file(root: &Path, relative: &Path) -> Option<LoadedFile> {
    let path = resolve_file(root, relative).await?;

    let content = match tokio::fs::read(&path).await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(file = %relative.display(), error = %e, "failed to read file");
            return None;
        }
    };
    let modified = tokio::fs::metadata(&path)
        .await
        .ok()
        .and_then(|m| m.modified().ok());

    Some(LoadedFile {
        validators: Validators::new(&content, modified),
        content_type: mime::content_type_for(&path),
        content: Bytes::from(content),
    })
}

/// Build static file response with validators and Range support
fn build_static_file_response(
    ctx: &RequestContext<'_>,
    file: &LoadedFile,
    cache_control: &str,
) -> HttpResponse {
    if file
        .validators
        .is_not_modified(ctx.if_none_match, ctx.if_modified_since)
    {
        return http::build_304_response(&file.validators, cache_control);
    }

    let total_size = file.content.len();
    match http::parse_range_header(ctx.range, total_size) {
        RangeParseResult::Valid(range) => response::build_partial_response(
            file.content.slice(range.clone()),
            file.content_type,
            &file.validators,
            cache_control,
            &range,
            total_size,
            ctx.is_head,
        ),
        RangeParseResult::NotSatisfiable => http::build_416_response(total_size),
        RangeParseResult::None => response::build_file_response(
            file.content.clone(),
            file.content_type,
            &file.validators,
            cache_control,
            ctx.is_head,
        ),
    }
}
