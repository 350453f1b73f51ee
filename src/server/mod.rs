// Server module entry point
// Listener setup, connection handling, the accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod serve;
pub mod signal;

pub use listener::create_listener;
pub use serve::run_server;
pub use signal::shutdown_signal;
