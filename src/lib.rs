//! Static documentation server for the cheatsheet site.
//!
//! Serves a pre-built document root over HTTP with a custom 404 page,
//! fixed security headers on every response, and HTTPS enforcement when
//! running on a hosting platform.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
