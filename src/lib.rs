//! HTTP file-sharing server built for large, resumable downloads.
//!
//! Point it at a directory and everything below that directory becomes
//! downloadable over HTTP: byte-range resume, chunked streaming with
//! bounded memory per connection, directory listings in HTML or JSON,
//! and an optional tunnel subprocess that publishes the server under a
//! public URL.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod share;
pub mod state;
pub mod tunnel;
