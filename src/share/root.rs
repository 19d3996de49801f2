//! Share root path resolution
//!
//! Turns untrusted request paths into filesystem paths proven to live
//! inside the shared directory. Rejection happens in two stages: a pure
//! component check before any filesystem access, then a canonicalization
//! check that also catches symlinks pointing out of the root.

use crate::error::ServeError;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Kind of target a request path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Empty path or trailing slash: a directory listing.
    Directory,
    /// Anything else: a file download.
    File,
}

/// The directory tree being shared, canonicalized once at startup.
#[derive(Debug, Clone)]
pub struct ShareRoot {
    canonical: PathBuf,
}

/// A request path resolved to a confirmed location inside the root.
#[derive(Debug)]
pub struct ResolvedTarget {
    /// Canonical filesystem path.
    pub path: PathBuf,
    /// What the request asked for; whether the filesystem agrees is the
    /// caller's concern.
    pub kind: TargetKind,
    /// Decoded root-relative path, `""` for the root itself.
    pub relative: String,
}

impl ShareRoot {
    /// Open a share root. The path must exist and canonicalize.
    pub fn new(path: &Path) -> io::Result<Self> {
        let canonical = std::fs::canonicalize(path)?;
        Ok(Self { canonical })
    }

    /// Canonical path of the shared directory.
    #[must_use]
    pub fn canonical_path(&self) -> &Path {
        &self.canonical
    }

    /// Resolve a raw request path to a location inside the root.
    ///
    /// Steps, in order: strip query/fragment, percent-decode (invalid
    /// UTF-8 rejects), walk components rejecting `..` and prefixes before
    /// touching the filesystem, join onto the root, canonicalize, confirm
    /// the result never left the root.
    pub async fn resolve(&self, raw_path: &str) -> Result<ResolvedTarget, ServeError> {
        let path_part = match raw_path.find(['?', '#']) {
            Some(i) => &raw_path[..i],
            None => raw_path,
        };

        let decoded = percent_decode_str(path_part)
            .decode_utf8()
            .map_err(|_| ServeError::PathRejected)?;

        let kind = if decoded.is_empty() || decoded.ends_with('/') {
            TargetKind::Directory
        } else {
            TargetKind::File
        };

        let trimmed = decoded.trim_matches('/');
        let mut clean = PathBuf::new();
        for component in Path::new(trimmed).components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(segment) => clean.push(segment),
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(ServeError::PathRejected)
                }
            }
        }

        let candidate = self.canonical.join(&clean);
        let real = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(ServeError::from_fs)?;
        if !real.starts_with(&self.canonical) {
            return Err(ServeError::PathRejected);
        }

        Ok(ResolvedTarget {
            path: real,
            kind,
            relative: clean.to_string_lossy().into_owned(),
        })
    }
}
