//! HTTP Range request module
//!
//! Single byte-range requests (RFC 9110 §14). Multi-range requests are served
//! as the full representation.

use std::ops::RangeInclusive;

/// Outcome of interpreting a `Range` header against a representation size
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// No Range header, unsupported unit, multiple ranges, or malformed: send 200
    None,
    /// Satisfiable range, inclusive byte positions
    Valid(RangeInclusive<usize>),
    /// Syntactically valid but outside the representation: send 416
    NotSatisfiable,
}

/// Parse a `Range` header value for a representation of `file_size` bytes
pub fn parse_range_header(header: Option<&str>, file_size: usize) -> RangeParseResult {
    let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };
    if spec.contains(',') {
        return RangeParseResult::None;
    }
    let Some((first, last)) = spec.trim().split_once('-') else {
        return RangeParseResult::None;
    };

    match (first.trim(), last.trim()) {
        // bytes=-N: the final N bytes
        ("", suffix) => {
            let Ok(len) = suffix.parse::<usize>() else {
                return RangeParseResult::None;
            };
            if len == 0 || file_size == 0 {
                return RangeParseResult::NotSatisfiable;
            }
            RangeParseResult::Valid(file_size.saturating_sub(len)..=file_size - 1)
        }
        (start, end) => {
            let Ok(start) = start.parse::<usize>() else {
                return RangeParseResult::None;
            };
            let end = if end.is_empty() {
                usize::MAX
            } else {
                match end.parse::<usize>() {
                    Ok(e) => e,
                    Err(_) => return RangeParseResult::None,
                }
            };
            if end < start {
                return RangeParseResult::None;
            }
            if start >= file_size {
                return RangeParseResult::NotSatisfiable;
            }
            RangeParseResult::Valid(start..=end.min(file_size - 1))
        }
    }
}
