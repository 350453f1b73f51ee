// Server loop module
// Accepts connections until the shutdown future resolves, then drains

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;

/// Run the accept loop until `shutdown` resolves.
///
/// In-flight connections get `performance.shutdown_timeout` seconds to
/// finish before the loop returns.
pub async fn run_server<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            &graceful,
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to accept connection");
                    }
                }
            }

            () = &mut shutdown => {
                tracing::info!("shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    // Stop accepting before draining
    drop(listener);

    let drain_timeout = Duration::from_secs(state.config.performance.shutdown_timeout);
    if tokio::time::timeout(drain_timeout, graceful.shutdown())
        .await
        .is_err()
    {
        tracing::warn!(
            timeout_secs = drain_timeout.as_secs(),
            "timed out waiting for connections to close"
        );
    } else {
        tracing::info!("all connections closed");
    }
}
