//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! gateway's routing decisions.

pub mod cache;
pub mod mime;
pub mod range;
pub mod redirect;
pub mod response;
pub mod security;

// Re-export commonly used types
pub use range::{parse_range_header, RangeParseResult};
pub use redirect::{check_https, HttpsDecision};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_416_response,
    build_options_response, build_redirect_response, HttpResponse,
};
pub use security::SecurityHeaders;
