// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub share: ShareConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tunnel: TunnelConfig,
}

/// Listener and connection handling
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Tokio worker threads; 0 uses the runtime default
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Ceiling on concurrently served connections; extra accepts are
    /// turned away
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Close a connection after this long without progress; 0 disables
    /// the watchdog
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

/// What is being shared
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShareConfig {
    /// Directory tree exposed for download
    #[serde(default = "default_root")]
    pub root: String,
    /// Create the root at startup when it does not exist yet
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,
}

/// Throughput tuning
///
/// The preset picks chunk and socket buffer sizes; `custom` uses the
/// explicit byte fields.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TransferConfig {
    /// One of `maximum`, `balanced`, `conservative`, `custom`
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Read chunk per poll, bytes (preset `custom` only)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// SO_SNDBUF/SO_RCVBUF per connection, bytes (preset `custom` only)
    #[serde(default = "default_socket_buffer")]
    pub socket_buffer: usize,
}

impl TransferConfig {
    /// Effective chunk size after preset resolution.
    #[must_use]
    pub fn chunk_size_bytes(&self) -> usize {
        match self.preset.as_str() {
            "maximum" => 8 * 1024 * 1024,
            "balanced" => 4 * 1024 * 1024,
            "conservative" => 1024 * 1024,
            _ => self.chunk_size,
        }
    }

    /// Effective per-connection socket buffer size after preset resolution.
    #[must_use]
    pub fn socket_buffer_bytes(&self) -> usize {
        match self.preset.as_str() {
            "maximum" => 4 * 1024 * 1024,
            "balanced" => 2 * 1024 * 1024,
            "conservative" => 512 * 1024,
            _ => self.socket_buffer,
        }
    }
}

/// HTTP response behavior
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Cache-Control max-age for file responses, seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u32,
    /// Send `Content-Disposition: attachment` on file downloads
    #[serde(default = "default_attachment_disposition")]
    pub attachment_disposition: bool,
    /// Requests carrying a body beyond this are answered 413
    #[serde(default = "default_max_body_size")]
    pub max_body_size: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Emit one line per request
    #[serde(default = "default_access_log")]
    pub access_log: bool,
    /// Access log format (combined, common, json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Public-URL tunnel subprocess
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TunnelConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Tunnel binary to spawn
    #[serde(default = "default_tunnel_command")]
    pub command: String,
    /// Arguments appended after the generated `tunnel --url ...` set
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Substring a scraped URL must contain to count as the public URL
    #[serde(default = "default_tunnel_url_pattern")]
    pub url_pattern: String,
    /// Output lines to inspect before giving up
    #[serde(default = "default_tunnel_attempts")]
    pub attempts: u32,
}

#[allow(clippy::missing_const_for_fn)]
fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_port() -> u16 {
    8000
}

#[allow(clippy::missing_const_for_fn)]
fn default_workers() -> usize {
    4
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_connections() -> usize {
    1000
}

#[allow(clippy::missing_const_for_fn)]
fn default_idle_timeout() -> u64 {
    120
}

#[allow(clippy::missing_const_for_fn)]
fn default_root() -> String {
    "./shared".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_create_if_missing() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_preset() -> String {
    "balanced".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_chunk_size() -> usize {
    4 * 1024 * 1024
}

#[allow(clippy::missing_const_for_fn)]
fn default_socket_buffer() -> usize {
    2 * 1024 * 1024
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_ttl() -> u32 {
    3600
}

#[allow(clippy::missing_const_for_fn)]
fn default_attachment_disposition() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_body_size() -> u64 {
    1_048_576
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_tunnel_command() -> String {
    "cloudflared".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_tunnel_url_pattern() -> String {
    "trycloudflare.com".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_tunnel_attempts() -> u32 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            max_connections: default_max_connections(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            create_if_missing: default_create_if_missing(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            chunk_size: default_chunk_size(),
            socket_buffer: default_socket_buffer(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            attachment_disposition: default_attachment_disposition(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log: default_access_log(),
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_tunnel_command(),
            extra_args: Vec::new(),
            url_pattern: default_tunnel_url_pattern(),
            attempts: default_tunnel_attempts(),
        }
    }
}
