// Server loop module
// Accepts connections until the shutdown signal fires

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::logger;
use crate::state::AppState;

/// Run the accept loop until `shutdown` is notified.
///
/// Every accepted connection is handed to [`accept_connection`], which
/// enforces the connection ceiling and spawns a task per connection.
/// Accept errors are logged and the loop keeps going; transient
/// conditions like EMFILE resolve themselves once connections close.
///
/// Returning stops new accepts only. Tasks already serving connections
/// run to completion on the runtime and are cut off when the process
/// exits.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_shutdown();
                break;
            }
        }
    }
}
