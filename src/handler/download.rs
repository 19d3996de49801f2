//! File download responses
//!
//! Opens the resolved file, decides full against partial delivery from
//! the Range header, and wires the chunked streaming body into the
//! response. The open file handle moves into the body; HEAD responses
//! drop it once metadata has been read.

use crate::config::Config;
use crate::error::ServeError;
use crate::http::headers::{attachment_disposition, http_date, CachePolicy};
use crate::http::response::{
    build_file_response, build_partial_response, empty_body, FileHeaders, ResponseBody,
};
use crate::http::{decide_range, mime, RangeDecision};
use crate::share::{Activity, FileRangeBody, ResolvedTarget};
use http_body_util::BodyExt;
use hyper::Response;
use std::sync::Arc;
use tokio::fs::File;

/// Serve one resolved file target.
pub async fn serve_file(
    target: &ResolvedTarget,
    range_header: Option<&str>,
    is_head: bool,
    config: &Config,
    activity: &Arc<Activity>,
) -> Result<Response<ResponseBody>, ServeError> {
    let file = File::open(&target.path).await.map_err(ServeError::from_fs)?;
    let meta = file.metadata().await.map_err(ServeError::from_fs)?;
    if meta.is_dir() {
        // The path raced into a directory between resolve and open.
        return Err(ServeError::NotFound);
    }

    let size = meta.len();
    let (start, length, range) = match decide_range(range_header, size) {
        RangeDecision::Whole => (0, size, None),
        RangeDecision::Partial(r) => (r.start, r.len(), Some(r)),
        RangeDecision::Unsatisfiable => return Err(ServeError::RangeNotSatisfiable { size }),
    };

    let extension = target
        .path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(str::to_lowercase);
    let content_type = mime::content_type_for(extension.as_deref());

    let file_name = target
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let headers = FileHeaders {
        content_type,
        cache_control: CachePolicy::Public(config.http.cache_ttl_secs).to_header_value(),
        last_modified: meta.modified().ok().map(http_date),
        disposition: config
            .http
            .attachment_disposition
            .then(|| attachment_disposition(&file_name)),
    };

    let body = if is_head {
        empty_body()
    } else {
        let chunk_size = config.transfer.chunk_size_bytes();
        FileRangeBody::open(file, start, length, chunk_size, Arc::clone(activity))
            .await?
            .boxed()
    };

    Ok(match range {
        Some(r) => build_partial_response(body, r.start, r.end, size, &headers),
        None => build_file_response(body, length, &headers),
    })
}
