// Connection handling module
// Accepts and serves a single TCP connection on its own task

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::SockRef;
use tokio::net::TcpStream;

use crate::handler;
use crate::logger;
use crate::share::Activity;
use crate::state::AppState;

/// Accept a connection, enforce the connection ceiling, and hand it to
/// its own task.
///
/// The counter is incremented before the limit check so two racing
/// accepts cannot both slip under the ceiling; a rejected connection
/// rolls the counter back and is dropped without a response.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);
    let limit = state.config.server.max_connections;
    if prev_count >= limit {
        conn_counter.fetch_sub(1, Ordering::SeqCst);
        logger::log_connection_limit(&peer_addr, limit);
        drop(stream);
        return;
    }

    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    tune_socket(&stream, state.config.transfer.socket_buffer_bytes());

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Apply per-connection socket options.
///
/// Failures are logged and otherwise ignored: the connection still
/// works with kernel default buffers.
fn tune_socket(stream: &TcpStream, buffer_size: usize) {
    if let Err(err) = stream.set_nodelay(true) {
        logger::log_warning(&format!("Failed to set TCP_NODELAY: {err}"));
    }
    if buffer_size > 0 {
        let sock = SockRef::from(stream);
        if let Err(err) = sock.set_send_buffer_size(buffer_size) {
            logger::log_warning(&format!("Failed to set SO_SNDBUF to {buffer_size}: {err}"));
        }
        if let Err(err) = sock.set_recv_buffer_size(buffer_size) {
            logger::log_warning(&format!("Failed to set SO_RCVBUF to {buffer_size}: {err}"));
        }
    }
}

/// Serve a single connection in a spawned task.
///
/// Each connection carries its own [`Activity`] gauge. Requests and
/// streamed body chunks touch it; a watchdog closes the connection once
/// it stays untouched past the configured idle timeout. A download that
/// keeps moving bytes stays alive indefinitely.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let activity = Arc::new(Activity::new());
        let idle_timeout = Duration::from_secs(state.config.server.idle_timeout_secs);

        let service = {
            let state = Arc::clone(&state);
            let activity = Arc::clone(&activity);
            service_fn(move |req| {
                let state = Arc::clone(&state);
                let activity = Arc::clone(&activity);
                async move { handler::handle_request(req, peer_addr, &state, &activity).await }
            })
        };

        let conn = http1::Builder::new()
            .keep_alive(true)
            .serve_connection(io, service);

        if idle_timeout.is_zero() {
            if let Err(err) = conn.await {
                logger::log_transfer_aborted(&peer_addr, &err);
            }
        } else {
            tokio::pin!(conn);
            // Check often enough that an idle connection overstays by a
            // fraction of the timeout at most.
            let mut ticker = tokio::time::interval((idle_timeout / 4).max(Duration::from_secs(1)));
            loop {
                tokio::select! {
                    result = conn.as_mut() => {
                        if let Err(err) = result {
                            logger::log_transfer_aborted(&peer_addr, &err);
                        }
                        break;
                    }
                    _ = ticker.tick() => {
                        let idle = activity.idle_for();
                        if idle > idle_timeout {
                            logger::log_idle_close(&peer_addr, idle);
                            break;
                        }
                    }
                }
            }
            // Dropping the pinned connection closes the socket and, with
            // it, any file handle still attached to a streaming body.
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::share::ShareRoot;
    use std::sync::atomic::AtomicUsize;
    use tokio::io::AsyncWriteExt;

    async fn state_with_limit(max_connections: usize) -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.server.max_connections = max_connections;
        config.logging.access_log = false;
        let root = ShareRoot::new(dir.path()).unwrap();
        (dir, Arc::new(AppState::new(config, root)))
    }

    #[tokio::test]
    async fn test_ceiling_rejects_and_rolls_back() {
        let (_dir, state) = state_with_limit(0).await;
        let counter = Arc::new(AtomicUsize::new(0));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (stream, peer_addr) = listener.accept().await.unwrap();

        accept_connection(stream, peer_addr, &state, &counter);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        drop(client);
    }

    #[tokio::test]
    async fn test_counter_tracks_connection_lifetime() {
        let (_dir, state) = state_with_limit(10).await;
        let counter = Arc::new(AtomicUsize::new(0));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (stream, peer_addr) = listener.accept().await.unwrap();

        accept_connection(stream, peer_addr, &state, &counter);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        client.shutdown().await.unwrap();
        drop(client);
        for _ in 0..50 {
            if counter.load(Ordering::SeqCst) == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
