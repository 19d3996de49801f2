//! HTTP Range request parsing module
//!
//! Single-range `bytes=` parsing for resumable downloads, RFC 7233 shaped.
//! Ranges are resolved against the file size at parse time, so a satisfied
//! range always carries concrete inclusive offsets.

/// A satisfied byte range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset to serve.
    pub start: u64,
    /// Last byte offset to serve, inclusive. Always `< file_size`.
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes the range covers.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Inclusive ranges are never empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Outcome of checking the Range header against a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDecision {
    /// Serve the whole file with 200. Covers an absent header, a non-bytes
    /// unit, malformed input, and multi-range lists.
    Whole,
    /// Serve the given slice with 206.
    Partial(ByteRange),
    /// Range named a region outside the file; answer 416 with
    /// `Content-Range: bytes */size`.
    Unsatisfiable,
}

/// Decide how to serve a file of `file_size` bytes given its Range header.
///
/// Supported forms:
/// - `bytes=start-end` - specific slice, `end` clamped to the last byte
/// - `bytes=start-` - from `start` to end of file
/// - `bytes=-suffix` - last `suffix` bytes
///
/// Comma-separated lists fall back to [`RangeDecision::Whole`]; multipart
/// responses are deliberately not produced. An empty file ignores the
/// header entirely, since no range into it can be satisfied.
///
/// # Examples
/// ```
/// use quickserve::http::range::{decide_range, ByteRange, RangeDecision};
///
/// let d = decide_range(Some("bytes=0-99"), 1000);
/// assert_eq!(d, RangeDecision::Partial(ByteRange { start: 0, end: 99 }));
///
/// let d = decide_range(None, 1000);
/// assert_eq!(d, RangeDecision::Whole);
///
/// let d = decide_range(Some("bytes=2000-"), 1000);
/// assert_eq!(d, RangeDecision::Unsatisfiable);
/// ```
#[must_use]
pub fn decide_range(range_header: Option<&str>, file_size: u64) -> RangeDecision {
    let Some(header) = range_header else {
        return RangeDecision::Whole;
    };

    // A zero-length file has no satisfiable range; serve it whole (empty).
    if file_size == 0 {
        return RangeDecision::Whole;
    }

    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeDecision::Whole; // Not bytes unit, ignore
    };

    // Single range only; lists fall back to the full file.
    if spec.contains(',') {
        return RangeDecision::Whole;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeDecision::Whole;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix range: "-500" means last 500 bytes
    if start_str.is_empty() {
        return decide_suffix(end_str, file_size);
    }

    decide_bounded(start_str, end_str, file_size)
}

/// Suffix form, e.g. `-500`.
fn decide_suffix(suffix_str: &str, file_size: u64) -> RangeDecision {
    let Ok(suffix) = suffix_str.parse::<u64>() else {
        return RangeDecision::Whole;
    };

    if suffix == 0 {
        return RangeDecision::Unsatisfiable;
    }

    // A suffix longer than the file is the whole file as a range.
    let start = file_size.saturating_sub(suffix);
    RangeDecision::Partial(ByteRange {
        start,
        end: file_size - 1,
    })
}

/// Bounded or open-ended form, e.g. `0-99` or `100-`.
fn decide_bounded(start_str: &str, end_str: &str, file_size: u64) -> RangeDecision {
    let Ok(start) = start_str.parse::<u64>() else {
        return RangeDecision::Whole;
    };

    // Start beyond the last byte is not satisfiable
    if start >= file_size {
        return RangeDecision::Unsatisfiable;
    }

    let end = if end_str.is_empty() {
        file_size - 1
    } else {
        let Ok(e) = end_str.parse::<u64>() else {
            return RangeDecision::Whole;
        };
        // Clamp end to the last byte
        e.min(file_size - 1)
    };

    if start > end {
        return RangeDecision::Unsatisfiable;
    }

    RangeDecision::Partial(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header() {
        assert_eq!(decide_range(None, 100), RangeDecision::Whole);
    }

    #[test]
    fn test_bounded_range() {
        match decide_range(Some("bytes=0-9"), 100) {
            RangeDecision::Partial(r) => {
                assert_eq!(r.start, 0);
                assert_eq!(r.end, 9);
                assert_eq!(r.len(), 10);
            }
            other => panic!("expected Partial, got {other:?}"),
        }
    }

    #[test]
    fn test_open_range() {
        match decide_range(Some("bytes=50-"), 100) {
            RangeDecision::Partial(r) => {
                assert_eq!(r.start, 50);
                assert_eq!(r.end, 99);
                assert_eq!(r.len(), 50);
            }
            other => panic!("expected Partial, got {other:?}"),
        }
    }

    #[test]
    fn test_suffix_range() {
        match decide_range(Some("bytes=-20"), 100) {
            RangeDecision::Partial(r) => {
                assert_eq!(r.start, 80);
                assert_eq!(r.end, 99);
            }
            other => panic!("expected Partial, got {other:?}"),
        }
    }

    #[test]
    fn test_suffix_longer_than_file() {
        match decide_range(Some("bytes=-500"), 100) {
            RangeDecision::Partial(r) => {
                assert_eq!(r.start, 0);
                assert_eq!(r.end, 99);
                assert_eq!(r.len(), 100);
            }
            other => panic!("expected Partial, got {other:?}"),
        }
    }

    #[test]
    fn test_end_clamped_to_file() {
        match decide_range(Some("bytes=90-1000"), 100) {
            RangeDecision::Partial(r) => {
                assert_eq!(r.start, 90);
                assert_eq!(r.end, 99);
            }
            other => panic!("expected Partial, got {other:?}"),
        }
    }

    #[test]
    fn test_not_satisfiable() {
        assert_eq!(
            decide_range(Some("bytes=200-"), 100),
            RangeDecision::Unsatisfiable
        );
        assert_eq!(
            decide_range(Some("bytes=100-"), 100),
            RangeDecision::Unsatisfiable
        );
        assert_eq!(
            decide_range(Some("bytes=-0"), 100),
            RangeDecision::Unsatisfiable
        );
        // Inverted bounds
        assert_eq!(
            decide_range(Some("bytes=9-3"), 100),
            RangeDecision::Unsatisfiable
        );
    }

    #[test]
    fn test_malformed_falls_back_to_whole() {
        assert_eq!(decide_range(Some("bytes=a-b"), 100), RangeDecision::Whole);
        assert_eq!(decide_range(Some("bytes="), 100), RangeDecision::Whole);
        assert_eq!(decide_range(Some("lines=0-9"), 100), RangeDecision::Whole);
    }

    #[test]
    fn test_multi_range_falls_back_to_whole() {
        assert_eq!(
            decide_range(Some("bytes=0-9,20-29"), 100),
            RangeDecision::Whole
        );
    }

    #[test]
    fn test_empty_file_ignores_range() {
        assert_eq!(decide_range(Some("bytes=0-"), 0), RangeDecision::Whole);
        assert_eq!(decide_range(Some("bytes=-5"), 0), RangeDecision::Whole);
    }

    #[test]
    fn test_single_byte_file() {
        match decide_range(Some("bytes=0-0"), 1) {
            RangeDecision::Partial(r) => assert_eq!(r.len(), 1),
            other => panic!("expected Partial, got {other:?}"),
        }
    }
}
