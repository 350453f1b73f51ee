//! Request path resolution
//!
//! Maps a raw request path onto a regular file under the document root.
//! Every rejection is reported as `None`; callers turn that into the
//! not-found outcome without learning why.

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

/// Why a path was refused, for server-side logging only
#[derive(Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Percent-decoding did not yield UTF-8
    Encoding,
    /// NUL byte, backslash, drive prefix or similar
    IllegalCharacter,
    /// A `..` segment, before or after decoding
    Traversal,
    /// Decoded to nothing (the root itself)
    Empty,
    /// Doubled or trailing slash; a file is never addressed with one
    EmptySegment,
}

/// Decode and normalize a request path into safe relative segments
///
/// `.` segments are dropped. Empty segments after the leading `/` are
/// refused, so a file has exactly one URL; anything that could step outside
/// the root is refused outright instead of being clamped.
pub fn sanitize(raw_path: &str) -> Result<PathBuf, Rejection> {
    let decoded = percent_decode_str(raw_path)
        .decode_utf8()
        .map_err(|_| Rejection::Encoding)?;

    if decoded.contains(['\0', '\\']) {
        return Err(Rejection::IllegalCharacter);
    }

    let rest = decoded.strip_prefix('/').unwrap_or(&decoded);
    if rest.is_empty() {
        return Err(Rejection::Empty);
    }

    let mut relative = PathBuf::new();
    for segment in rest.split('/') {
        match segment {
            "" => return Err(Rejection::EmptySegment),
            "." => {}
            ".." => return Err(Rejection::Traversal),
            s => {
                // A lone segment must stay a plain file name on every platform
                let mut components = Path::new(s).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => relative.push(s),
                    _ => return Err(Rejection::IllegalCharacter),
                }
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(Rejection::Empty);
    }
    Ok(relative)
}

/// Resolve a sanitized relative path to a regular file inside `root`
///
/// `root` must already be canonical. Symlinks are followed, but the target
/// must still live under `root`.
pub async fn resolve_file(root: &Path, relative: &Path) -> Option<PathBuf> {
    let candidate = root.join(relative);
    let canonical = tokio::fs::canonicalize(&candidate).await.ok()?;

    if !canonical.starts_with(root) {
        tracing::warn!(
            requested = %relative.display(),
            "path escapes document root via symlink"
        );
        return None;
    }

    let metadata = tokio::fs::metadata(&canonical).await.ok()?;
    metadata.is_file().then_some(canonical)
}
