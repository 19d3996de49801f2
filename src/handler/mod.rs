//! Request handler module
//!
//! Responsible for request routing dispatch and business logic processing:
//! file downloads with range support and directory listings.

pub mod download;
pub mod listing;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
