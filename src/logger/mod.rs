//! Logger module
//!
//! Logging utilities for the file-sharing server:
//! - startup banner with reachable URLs
//! - access logging with multiple formats
//! - connection lifecycle, transfer aborts, tunnel events
//! - file-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. Before (or without)
/// initialization everything falls back to stdout/stderr.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Startup banner: what is shared, how it is tuned, where to reach it.
pub fn log_startup(addr: &SocketAddr, config: &Config, lan_ip: Option<IpAddr>) {
    let chunk = crate::share::format_size(config.transfer.chunk_size_bytes() as u64);
    write_info("======================================");
    write_info(&format!("quickserve {} ready", env!("CARGO_PKG_VERSION")));
    write_info(&format!(
        "Sharing: {} (preset: {}, chunk {chunk})",
        config.share.root, config.transfer.preset
    ));
    if addr.ip().is_unspecified() {
        write_info(&format!("Local:   http://127.0.0.1:{}/", addr.port()));
        if let Some(ip) = lan_ip {
            write_info(&format!("Network: http://{ip}:{}/", addr.port()));
        }
    } else {
        write_info(&format!("Serving: http://{addr}/"));
    }
    write_info(&format!(
        "Workers: {}, max connections: {}, idle timeout: {}s",
        config.server.workers, config.server.max_connections, config.server.idle_timeout_secs
    ));
    write_info("======================================\n");
}

pub fn log_shutdown() {
    write_info("\n[Shutdown] Stopping, no longer accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

/// Connection turned away at the configured ceiling.
pub fn log_connection_limit(peer_addr: &SocketAddr, limit: usize) {
    write_error(&format!(
        "[WARN] Rejecting {peer_addr}: connection limit {limit} reached"
    ));
}

/// Watchdog closed a connection that stopped making progress.
pub fn log_idle_close(peer_addr: &SocketAddr, idle: Duration) {
    write_info(&format!(
        "[Connection] Closing {peer_addr}: idle for {}s",
        idle.as_secs()
    ));
}

/// A streaming transfer died mid-flight; the connection is abandoned.
pub fn log_transfer_aborted(peer_addr: &SocketAddr, err: &impl std::fmt::Display) {
    write_info(&format!("[Transfer] Aborted for {peer_addr}: {err}"));
}

/// Request path failed resolution; logged server-side only, the response
/// body never echoes it.
pub fn log_blocked_path(peer_addr: &SocketAddr, raw_path: &str) {
    write_error(&format!(
        "[WARN] Blocked unsafe path from {peer_addr}: {raw_path}"
    ));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

/// Public URL reported by the tunnel subprocess.
pub fn log_tunnel_url(url: &str) {
    write_info("======================================");
    write_info(&format!("Public URL: {url}"));
    write_info("======================================");
}

pub fn log_tunnel_warning(message: &str) {
    write_error(&format!("[Tunnel] {message}"));
}

pub fn log_tunnel_started(command: &str) {
    write_info(&format!("[Tunnel] Started: {command}"));
}
