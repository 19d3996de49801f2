//! MIME type detection module
//!
//! Returns the Content-Type for a file extension. Unknown extensions fall
//! back to `application/octet-stream`, which also makes browsers download
//! rather than render.

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use quickserve::http::mime::content_type_for;
/// assert_eq!(content_type_for(Some("mkv")), "video/x-matroska");
/// assert_eq!(content_type_for(Some("zip")), "application/zip");
/// assert_eq!(content_type_for(None), "application/octet-stream");
/// ```
#[must_use]
pub fn content_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        // Text & documents
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("txt" | "md" | "log") => "text/plain; charset=utf-8",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("rtf") => "application/rtf",
        Some("epub") => "application/epub+zip",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }

        // Code & data
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",

        // Archives & compressed
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("bz2") => "application/x-bzip2",
        Some("xz") => "application/x-xz",
        Some("zst") => "application/zstd",
        Some("7z") => "application/x-7z-compressed",
        Some("rar") => "application/vnd.rar",

        // Disk images & packages
        Some("iso") => "application/x-iso9660-image",
        Some("dmg") => "application/x-apple-diskimage",
        Some("apk") => "application/vnd.android.package-archive",
        Some("deb") => "application/vnd.debian.binary-package",
        Some("rpm") => "application/x-rpm",
        Some("jar") => "application/java-archive",
        Some("exe" | "msi") => "application/x-msdownload",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",

        // Video
        Some("mp4" | "m4v") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("ts") => "video/mp2t",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("ogg" | "oga") => "audio/ogg",
        Some("opus") => "audio/opus",

        // Default
        _ => "application/octet-stream",
    }
}
