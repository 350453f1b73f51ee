//! Request handler module
//!
//! The static asset gateway: path resolution, file serving and the shared
//! not-found outcome.

pub mod not_found;
pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
