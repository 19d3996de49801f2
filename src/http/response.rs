//! HTTP response building module
//!
//! Builders for the various status responses, all over one boxed body
//! type so fixed pages and streamed files travel through the same
//! `Response` type.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;
use std::io;

use crate::error::ServeError;
use crate::logger;

/// Body type every handler returns.
pub type ResponseBody = BoxBody<Bytes, io::Error>;

/// Box a fixed payload into the unified body type.
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Empty boxed body, for HEAD responses and 204s.
#[must_use]
pub fn empty_body() -> ResponseBody {
    full_body(Bytes::new())
}

/// Header values shared by full and partial file responses.
#[derive(Debug)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub cache_control: String,
    pub last_modified: Option<String>,
    pub disposition: Option<String>,
}

/// Build 403 Forbidden response
#[must_use]
pub fn build_403_response() -> Response<ResponseBody> {
    Response::builder()
        .status(403)
        .header("Content-Type", "text/plain")
        .body(full_body("403 Forbidden"))
        .unwrap_or_else(|e| {
            log_build_error("403", &e);
            Response::new(full_body("403 Forbidden"))
        })
}

/// Build 404 Not Found response
#[must_use]
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(full_body("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full_body("404 Not Found"))
        })
}

/// Build 405 Method Not Allowed response
#[must_use]
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(full_body("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full_body("405 Method Not Allowed"))
        })
}

/// Build OPTIONS response
#[must_use]
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(empty_body())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(empty_body())
        })
}

/// Build 413 Payload Too Large response
#[must_use]
pub fn build_413_response() -> Response<ResponseBody> {
    Response::builder()
        .status(413)
        .header("Content-Type", "text/plain")
        .body(full_body("413 Payload Too Large"))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(full_body("413 Payload Too Large"))
        })
}

/// Build 416 Range Not Satisfiable response
#[must_use]
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(full_body("416 Range Not Satisfiable"))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(full_body("416 Range Not Satisfiable"))
        })
}

/// Build 500 Internal Server Error response; detail stays in the log.
#[must_use]
pub fn build_500_response() -> Response<ResponseBody> {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain")
        .body(full_body("500 Internal Server Error"))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(full_body("500 Internal Server Error"))
        })
}

/// Build 301 redirect response
#[must_use]
pub fn build_redirect_response(target: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(301)
        .header("Location", target)
        .header("Content-Type", "text/plain")
        .body(full_body("Moved Permanently"))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(full_body("Moved Permanently"))
        })
}

/// Build generic HTML response
#[must_use]
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(content)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty_body())
        })
}

/// Build JSON response
#[must_use]
pub fn build_json_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(content)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            Response::new(empty_body())
        })
}

/// Build 200 response around a prepared file body
#[must_use]
pub fn build_file_response(
    body: ResponseBody,
    length: u64,
    headers: &FileHeaders<'_>,
) -> Response<ResponseBody> {
    file_builder(200, length, headers)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(empty_body())
        })
}

/// Build 206 Partial Content response around a prepared file body
#[must_use]
pub fn build_partial_response(
    body: ResponseBody,
    start: u64,
    end: u64,
    total_size: u64,
    headers: &FileHeaders<'_>,
) -> Response<ResponseBody> {
    file_builder(206, end - start + 1, headers)
        .header("Content-Range", format!("bytes {start}-{end}/{total_size}"))
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(empty_body())
        })
}

/// Common header set of the file-serving responses.
fn file_builder(
    status: u16,
    length: u64,
    headers: &FileHeaders<'_>,
) -> hyper::http::response::Builder {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", headers.content_type)
        .header("Content-Length", length)
        .header("Accept-Ranges", "bytes")
        .header("Cache-Control", headers.cache_control.as_str());
    if let Some(last_modified) = &headers.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }
    if let Some(disposition) = &headers.disposition {
        builder = builder.header("Content-Disposition", disposition);
    }
    builder
}

/// Map a request error to its response.
#[must_use]
pub fn error_response_for(err: &ServeError) -> Response<ResponseBody> {
    match err {
        ServeError::PathRejected | ServeError::Forbidden => build_403_response(),
        ServeError::NotFound => build_404_response(),
        ServeError::RangeNotSatisfiable { size } => build_416_response(*size),
        ServeError::Io(e) => {
            logger::log_error(&format!("Unexpected I/O failure: {e}"));
            build_500_response()
        }
    }
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
