// Server loop module
// Accepts connections until shutdown, then waits for in-flight requests

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long shutdown waits for open connections to finish
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` resolves
///
/// After shutdown the listener is closed immediately; connections already
/// accepted get up to [`SHUTDOWN_GRACE`] to complete.
pub async fn start_server_loop<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    drain_connections(&state).await;
    Ok(())
}

/// Wait for the connection count to reach zero, bounded by the grace period
async fn drain_connections(state: &AppState) {
    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;

    while state.connection_count() > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }

    logger::log_shutdown_complete(state.connection_count());
}
