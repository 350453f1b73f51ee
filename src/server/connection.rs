// Connection handling module
// Accepts a single TCP connection and serves it with the gateway

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppState;
use crate::handler;

/// Accept and process a connection, enforcing the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
/// * `graceful` - Shutdown watcher the connection registers with
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    graceful: &GracefulShutdown,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!(
                active = prev_count,
                max = max_conn,
                %peer_addr,
                "max connections reached, connection rejected"
            );
            drop(stream);
            return;
        }
    }

    tracing::trace!(%peer_addr, "connection accepted");
    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
        graceful,
    );
}

/// Serve one connection in a spawned task.
///
/// The connection is bounded by the configured request timeout and is
/// registered with `graceful` so shutdown waits for it to finish.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
    graceful: &GracefulShutdown,
) {
    let io = TokioIo::new(stream);
    let timeout_duration = Duration::from_secs(state.config.performance.request_timeout);

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(state.config.performance.keep_alive)
        .timer(TokioTimer::new())
        .header_read_timeout(timeout_duration);

    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
    );
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::debug!(%peer_addr, error = %err, "connection error");
            }
            Err(_) => {
                tracing::warn!(
                    %peer_addr,
                    timeout_secs = timeout_duration.as_secs(),
                    "connection timed out"
                );
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
