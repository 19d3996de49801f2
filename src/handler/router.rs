//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation, path resolution, and dispatching to the download or
//! listing handler.

use crate::error::ServeError;
use crate::handler::{download, listing};
use crate::http::response::{
    build_405_response, build_413_response, build_html_response, build_json_response,
    build_options_response, build_redirect_response, error_response_for, ResponseBody,
};
use crate::logger::{self, AccessLogEntry};
use crate::share::{self, Activity, TargetKind};
use crate::state::AppState;
use hyper::body::Body as _;
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const SERVER_HEADER: &str = concat!("quickserve/", env!("CARGO_PKG_VERSION"));

/// Request context for the download/listing handlers
struct RequestContext<'a> {
    path: &'a str,
    is_head: bool,
    range_header: Option<String>,
    wants_json: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    activity: &Arc<Activity>,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    activity.touch();

    let method = req.method().clone();
    let uri = req.uri().clone();
    let http_version = version_label(req.version());

    let mut response = match check_http_method(req.method()) {
        Some(resp) => resp,
        None => match check_body_size(&req, state.config.http.max_body_size) {
            Some(resp) => resp,
            None => {
                let ctx = RequestContext {
                    path: uri.path(),
                    is_head: method == Method::HEAD,
                    range_header: header_str(&req, "range"),
                    wants_json: header_str(&req, "accept")
                        .is_some_and(|v| v.contains("application/json")),
                };
                dispatch(&ctx, &peer_addr, state, activity).await
            }
        },
    };

    response
        .headers_mut()
        .insert("Server", HeaderValue::from_static(SERVER_HEADER));

    if state.config.logging.access_log {
        let entry = AccessLogEntry {
            remote_addr: peer_addr.ip().to_string(),
            time: chrono::Local::now(),
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(ToString::to_string),
            http_version: http_version.to_string(),
            status: response.status().as_u16(),
            body_bytes: response.body().size_hint().exact().unwrap_or(0),
            referer: header_str(&req, "referer"),
            user_agent: header_str(&req, "user-agent"),
            request_time_us: started.elapsed().as_micros().try_into().unwrap_or(u64::MAX),
        };
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve the request path and route to the matching handler.
async fn dispatch(
    ctx: &RequestContext<'_>,
    peer_addr: &SocketAddr,
    state: &Arc<AppState>,
    activity: &Arc<Activity>,
) -> Response<ResponseBody> {
    let target = match state.root.resolve(ctx.path).await {
        Ok(target) => target,
        Err(err) => {
            if matches!(err, ServeError::PathRejected) {
                logger::log_blocked_path(peer_addr, ctx.path);
            }
            return error_response_for(&err);
        }
    };

    let meta = match tokio::fs::metadata(&target.path).await {
        Ok(meta) => meta,
        Err(err) => return error_response_for(&ServeError::from_fs(err)),
    };

    match (target.kind, meta.is_dir()) {
        (TargetKind::Directory, true) => serve_listing(&target.path, &target.relative, ctx).await,
        (TargetKind::File, false) => {
            let result = download::serve_file(
                &target,
                ctx.range_header.as_deref(),
                ctx.is_head,
                &state.config,
                activity,
            )
            .await;
            result.unwrap_or_else(|err| error_response_for(&err))
        }
        // Directory requested without the trailing slash: redirect so
        // relative links inside the listing resolve correctly.
        (TargetKind::File, true) => build_redirect_response(&format!("{}/", ctx.path)),
        // Trailing slash on a regular file never matches anything.
        (TargetKind::Directory, false) => error_response_for(&ServeError::NotFound),
    }
}

async fn serve_listing(
    dir: &std::path::Path,
    relative: &str,
    ctx: &RequestContext<'_>,
) -> Response<ResponseBody> {
    let listing = match share::list_dir(dir).await {
        Ok(listing) => listing,
        Err(err) => return error_response_for(&ServeError::from_fs(err)),
    };

    if listing.skipped > 0 {
        logger::log_warning(&format!(
            "Listing /{relative}: skipped {} unreadable entries",
            listing.skipped
        ));
    }

    if ctx.wants_json {
        build_json_response(listing::render_json(relative, &listing), ctx.is_head)
    } else {
        build_html_response(listing::render_html(relative, &listing), ctx.is_head)
    }
}

/// Check HTTP method and return the response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<ResponseBody>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn header_str(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        _ => "1.1",
    }
}
