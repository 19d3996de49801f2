//! Shared-directory domain
//!
//! Everything that touches the share root: request-path resolution,
//! directory listings, and chunked file streaming.

pub mod index;
pub mod root;
pub mod stream;

// Re-export commonly used types
pub use index::{format_size, list_dir, EntryKind, FileEntry, Listing};
pub use root::{ResolvedTarget, ShareRoot, TargetKind};
pub use stream::{Activity, FileRangeBody};
