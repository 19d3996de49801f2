//! End-to-end tests over real TCP connections.
//!
//! Each test starts the full accept loop on an ephemeral port with a
//! fresh fixture directory, then speaks raw HTTP/1.1 over a
//! `TcpStream`. `Connection: close` makes `read_to_end` wait for the
//! complete response.

use std::net::SocketAddr;
use std::sync::Arc;

use quickserve::config::Config;
use quickserve::server;
use quickserve::share::ShareRoot;
use quickserve::state::AppState;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Notify;

const PAYLOAD_LEN: usize = 10_000;

fn payload_pattern() -> Vec<u8> {
    (0..PAYLOAD_LEN).map(|i| (i % 251) as u8).collect()
}

struct TestServer {
    addr: SocketAddr,
    root_dir: tempfile::TempDir,
    _shutdown: Arc<Notify>,
}

async fn start_server(tweak: impl FnOnce(&mut Config)) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("payload.bin"), payload_pattern()).unwrap();
    std::fs::write(dir.path().join("hello.txt"), b"hello world\n").unwrap();
    std::fs::write(dir.path().join("a b.txt"), b"ab").unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/manual.pdf"), b"%PDF-1.4 fake manual").unwrap();

    let mut config = Config::default();
    config.logging.access_log = false;
    config.server.idle_timeout_secs = 0;
    // Small chunks so even the fixture payload streams in many polls.
    config.transfer.preset = "custom".to_string();
    config.transfer.chunk_size = 1024;
    config.transfer.socket_buffer = 0;
    tweak(&mut config);

    let root = ShareRoot::new(dir.path()).unwrap();
    let state = Arc::new(AppState::new(config, root));

    let listener = server::create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Notify::new());
    tokio::spawn(server::start_server_loop(
        listener,
        state,
        Arc::clone(&shutdown),
    ));

    TestServer {
        addr,
        root_dir: dir,
        _shutdown: shutdown,
    }
}

struct RawResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RawResponse {
    fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

async fn send_raw(addr: SocketAddr, request: &str) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    parse_response(&raw)
}

async fn get(addr: SocketAddr, path: &str, extra_headers: &str) -> RawResponse {
    let request =
        format!("GET {path} HTTP/1.1\r\nHost: test\r\nConnection: close\r\n{extra_headers}\r\n");
    send_raw(addr, &request).await
}

fn parse_response(raw: &[u8]) -> RawResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("incomplete response head");
    let head = std::str::from_utf8(&raw[..split]).unwrap();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.lines();
    let status_line = lines.next().unwrap();
    let status: u16 = status_line
        .split_whitespace()
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();
    let headers = lines
        .map(|line| {
            let (name, value) = line.split_once(':').unwrap();
            (name.trim().to_ascii_lowercase(), value.trim().to_string())
        })
        .collect();

    RawResponse {
        status,
        headers,
        body,
    }
}

#[tokio::test]
async fn test_full_download_is_byte_exact() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/payload.bin", "").await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Length"), Some("10000"));
    assert_eq!(resp.header("Accept-Ranges"), Some("bytes"));
    assert_eq!(resp.header("Content-Type"), Some("application/octet-stream"));
    assert_eq!(resp.header("Cache-Control"), Some("public, max-age=3600"));
    assert_eq!(
        resp.header("Content-Disposition"),
        Some("attachment; filename=\"payload.bin\"")
    );
    assert!(resp
        .header("Server")
        .is_some_and(|v| v.starts_with("quickserve/")));
    assert!(resp.header("Last-Modified").is_some());
    assert_eq!(resp.body, payload_pattern());
}

#[tokio::test]
async fn test_range_request_resumes_midfile() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/payload.bin", "Range: bytes=2500-4999\r\n").await;

    assert_eq!(resp.status, 206);
    assert_eq!(resp.header("Content-Range"), Some("bytes 2500-4999/10000"));
    assert_eq!(resp.header("Content-Length"), Some("2500"));
    assert_eq!(resp.body, &payload_pattern()[2500..5000]);
}

#[tokio::test]
async fn test_open_ended_and_suffix_ranges() {
    let server = start_server(|_| {}).await;

    let resp = get(server.addr, "/payload.bin", "Range: bytes=9900-\r\n").await;
    assert_eq!(resp.status, 206);
    assert_eq!(resp.header("Content-Range"), Some("bytes 9900-9999/10000"));
    assert_eq!(resp.body, &payload_pattern()[9900..]);

    let resp = get(server.addr, "/payload.bin", "Range: bytes=-100\r\n").await;
    assert_eq!(resp.status, 206);
    assert_eq!(resp.header("Content-Range"), Some("bytes 9900-9999/10000"));
    assert_eq!(resp.body, &payload_pattern()[9900..]);
}

#[tokio::test]
async fn test_range_past_end_gets_416() {
    let server = start_server(|_| {}).await;

    let resp = get(server.addr, "/payload.bin", "Range: bytes=10000-\r\n").await;
    assert_eq!(resp.status, 416);
    assert_eq!(resp.header("Content-Range"), Some("bytes */10000"));

    let resp = get(server.addr, "/payload.bin", "Range: bytes=99999-100000\r\n").await;
    assert_eq!(resp.status, 416);
}

#[tokio::test]
async fn test_multi_range_falls_back_to_full() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/payload.bin", "Range: bytes=0-1,5-6\r\n").await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, payload_pattern());
}

#[tokio::test]
async fn test_malformed_range_serves_full() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/payload.bin", "Range: bytes=abc-def\r\n").await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Length"), Some("10000"));
}

#[tokio::test]
async fn test_traversal_rejected_without_echo() {
    let server = start_server(|_| {}).await;

    let resp = get(server.addr, "/../../etc/passwd", "").await;
    assert_eq!(resp.status, 403);
    let body = String::from_utf8_lossy(&resp.body).into_owned();
    assert!(!body.contains("passwd"));
    assert!(!body.contains("etc"));

    let resp = get(server.addr, "/%2e%2e%2f%2e%2e%2fetc/passwd", "").await;
    assert_eq!(resp.status, 403);
}

#[tokio::test]
async fn test_unknown_file_is_404() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/nope.bin", "").await;
    assert_eq!(resp.status, 404);
}

#[tokio::test]
async fn test_listing_html() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/", "").await;

    assert_eq!(resp.status, 200);
    assert!(resp
        .header("Content-Type")
        .is_some_and(|v| v.starts_with("text/html")));
    // Listings reflect the directory live, no caching
    assert_eq!(resp.header("Cache-Control"), None);

    let html = String::from_utf8(resp.body).unwrap();
    assert!(html.contains("payload.bin"));
    assert!(html.contains("hello.txt"));
    assert!(html.contains("href=\"docs/\""));
    assert!(html.contains("href=\"a%20b.txt\""));
    assert!(html.contains("3 file(s), 1 folder(s)"));
}

#[tokio::test]
async fn test_listing_json() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/", "Accept: application/json\r\n").await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Type"), Some("application/json"));

    let doc: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
    assert_eq!(doc["path"], "/");
    assert_eq!(doc["file_count"], 3);
    assert_eq!(doc["dir_count"], 1);
    assert_eq!(doc["total_bytes"], 10_014);

    let entries = doc["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 4);
    // Case-insensitive name ordering puts "a b.txt" first, "docs" second
    assert_eq!(entries[0]["name"], "a b.txt");
    assert_eq!(entries[1]["name"], "docs");
    assert_eq!(entries[1]["kind"], "directory");
}

#[tokio::test]
async fn test_head_returns_headers_without_body() {
    let server = start_server(|_| {}).await;
    let request = "HEAD /payload.bin HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n";
    let resp = send_raw(server.addr, request).await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Length"), Some("10000"));
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_directory_without_slash_redirects() {
    let server = start_server(|_| {}).await;

    let resp = get(server.addr, "/docs", "").await;
    assert_eq!(resp.status, 301);
    assert_eq!(resp.header("Location"), Some("/docs/"));

    let resp = get(server.addr, "/docs/", "").await;
    assert_eq!(resp.status, 200);
    assert!(String::from_utf8(resp.body).unwrap().contains("manual.pdf"));
}

#[tokio::test]
async fn test_trailing_slash_on_file_is_404() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/hello.txt/", "").await;
    assert_eq!(resp.status, 404);
}

#[tokio::test]
async fn test_query_string_is_ignored() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/hello.txt?download=1", "").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"hello world\n");
}

#[tokio::test]
async fn test_encoded_name_resolves() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/a%20b.txt", "").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"ab");
}

#[tokio::test]
async fn test_pdf_content_type() {
    let server = start_server(|_| {}).await;
    let resp = get(server.addr, "/docs/manual.pdf", "").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Type"), Some("application/pdf"));
}

#[tokio::test]
async fn test_method_not_allowed_and_options() {
    let server = start_server(|_| {}).await;

    let resp = send_raw(
        server.addr,
        "DELETE /payload.bin HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert_eq!(resp.status, 405);
    assert_eq!(resp.header("Allow"), Some("GET, HEAD, OPTIONS"));

    let resp = send_raw(
        server.addr,
        "OPTIONS / HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert_eq!(resp.status, 204);
    assert_eq!(resp.header("Allow"), Some("GET, HEAD, OPTIONS"));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let server = start_server(|c| c.http.max_body_size = 16).await;
    let resp = get(server.addr, "/hello.txt", "Content-Length: 999999\r\n").await;
    assert_eq!(resp.status, 413);
}

#[tokio::test]
async fn test_concurrent_downloads_stay_isolated() {
    let server = start_server(|_| {}).await;
    let expected = payload_pattern();

    let fetch = |addr| async move { get(addr, "/payload.bin", "").await };
    let (a, b, c, d) = tokio::join!(
        fetch(server.addr),
        fetch(server.addr),
        fetch(server.addr),
        fetch(server.addr)
    );

    for resp in [a, b, c, d] {
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, expected);
    }
}

#[tokio::test]
async fn test_idle_connection_closed_by_watchdog() {
    let server = start_server(|c| c.server.idle_timeout_secs = 1).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    // Never send a request; the watchdog should drop the connection.
    let mut buf = Vec::new();
    let read = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        stream.read_to_end(&mut buf),
    )
    .await;
    assert!(matches!(read, Ok(Ok(0))));
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_child_skipped_in_listing() {
    let server = start_server(|_| {}).await;
    std::os::unix::fs::symlink(
        server.root_dir.path().join("missing-target"),
        server.root_dir.path().join("ghost"),
    )
    .unwrap();

    let resp = get(server.addr, "/", "Accept: application/json\r\n").await;
    assert_eq!(resp.status, 200);
    let doc: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
    let names: Vec<&str> = doc["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert!(!names.contains(&"ghost"));
    assert!(names.contains(&"payload.bin"));
}

#[tokio::test]
async fn test_connection_ceiling_turns_extra_accepts_away() {
    let server = start_server(|c| c.server.max_connections = 1).await;

    // Hold one connection open mid-request so the slot stays taken.
    let mut held = TcpStream::connect(server.addr).await.unwrap();
    held.write_all(b"GET /payload.bin HTTP/1.1\r\nHost: t\r\n")
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    // The next connection must be dropped without a response.
    let mut rejected = TcpStream::connect(server.addr).await.unwrap();
    rejected
        .write_all(b"GET /hello.txt HTTP/1.1\r\nHost: t\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut buf = Vec::new();
    let n = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        rejected.read_to_end(&mut buf),
    )
    .await;
    assert!(matches!(n, Ok(Ok(0))), "expected silent close, got {n:?}");
    drop(held);
}
