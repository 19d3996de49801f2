//! Directory listing
//!
//! Enumerates the immediate children of one directory, lazily (no
//! recursion), producing an ordered entry sequence plus aggregate totals
//! computed in the same pass.

use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Kind of a directory child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Lowercase wire name for the JSON listing.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Bare name, no path separators.
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes; 0 for directories.
    pub size: u64,
    /// Modification time when the filesystem reports one.
    pub modified: Option<SystemTime>,
}

/// Ordered children of a directory plus aggregates.
#[derive(Debug, Default)]
pub struct Listing {
    /// Entries sorted case-insensitively by name, ties broken by raw name.
    pub entries: Vec<FileEntry>,
    pub file_count: u64,
    pub dir_count: u64,
    /// Sum of file sizes; directories contribute nothing.
    pub total_bytes: u64,
    /// Children skipped because their metadata was unreadable.
    pub skipped: u64,
}

/// List the immediate children of `dir`.
///
/// Symlinks are followed so a linked directory browses like any other;
/// entries whose metadata cannot be read (broken links, races with
/// deletion) are counted in [`Listing::skipped`] rather than failing the
/// whole listing.
pub async fn list_dir(dir: &Path) -> io::Result<Listing> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut listing = Listing::default();

    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Ok(meta) = tokio::fs::metadata(entry.path()).await else {
            listing.skipped += 1;
            continue;
        };

        let (kind, size) = if meta.is_dir() {
            listing.dir_count += 1;
            (EntryKind::Directory, 0)
        } else {
            listing.file_count += 1;
            listing.total_bytes += meta.len();
            (EntryKind::File, meta.len())
        };

        listing.entries.push(FileEntry {
            name,
            kind,
            size,
            modified: meta.modified().ok(),
        });
    }

    listing
        .entries
        .sort_by_cached_key(|e| (e.name.to_lowercase(), e.name.clone()));
    Ok(listing)
}

/// Human-readable byte count for listing pages and the startup banner.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
