//! End-to-end request/response scenarios over a real socket.

use file_echo_server::http::{Encoding, Request, RequestLimits, Response, StatusCode};

mod common;

use common::{gunzip, request, start_server, test_config};

#[tokio::test]
async fn test_root() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_server(test_config(dir.path())).await;

    let res = request(server.addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    assert_eq!(res.status_line, "HTTP/1.1 200 OK");
    assert_eq!(res.content_length(), 0);
    assert!(res.body.is_empty());

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_echo_plain() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_server(test_config(dir.path())).await;

    let res = request(server.addr, b"GET /echo/abc HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    assert_eq!(res.status_line, "HTTP/1.1 200 OK");
    assert_eq!(res.header("Content-Type"), Some("text/plain"));
    assert_eq!(res.header("Content-Length"), Some("3"));
    assert!(res.header("Content-Encoding").is_none());
    assert_eq!(res.body, b"abc");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_echo_gzip() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_server(test_config(dir.path())).await;

    let res = request(
        server.addr,
        b"GET /echo/abc HTTP/1.1\r\nAccept-Encoding: invalid-encoding-1, gzip, invalid-encoding-2\r\n\r\n",
    )
    .await;
    assert_eq!(res.status_line, "HTTP/1.1 200 OK");
    assert_eq!(res.header_all("Content-Encoding"), vec!["gzip"]);
    assert_eq!(res.content_length(), res.body.len());
    assert_eq!(gunzip(&res.body), b"abc");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_unsupported_encoding_is_not_echoed() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_server(test_config(dir.path())).await;

    let res = request(
        server.addr,
        b"GET /echo/abc HTTP/1.1\r\nAccept-Encoding: deflate, br\r\n\r\n",
    )
    .await;
    assert!(res.header("Content-Encoding").is_none());
    assert_eq!(res.body, b"abc");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_user_agent() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_server(test_config(dir.path())).await;

    let res = request(
        server.addr,
        b"GET /user-agent HTTP/1.1\r\nHost: localhost\r\nUser-Agent: foobar/1.2.3\r\n\r\n",
    )
    .await;
    assert_eq!(res.status_line, "HTTP/1.1 200 OK");
    assert_eq!(res.header("Content-Type"), Some("text/plain"));
    assert_eq!(res.body, b"foobar/1.2.3");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_server(test_config(dir.path())).await;

    let res = request(server.addr, b"GET /files/missing.txt HTTP/1.1\r\n\r\n").await;
    assert_eq!(res.status_line, "HTTP/1.1 404 Not Found");
    assert_eq!(res.content_length(), res.body.len());

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_upload_then_download() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_server(test_config(dir.path())).await;

    let res = request(
        server.addr,
        b"POST /files/new.txt HTTP/1.1\r\nContent-Type: application/octet-stream\r\nContent-Length: 5\r\n\r\nhello",
    )
    .await;
    assert_eq!(res.status_line, "HTTP/1.1 201 Created");

    let res = request(server.addr, b"GET /files/new.txt HTTP/1.1\r\n\r\n").await;
    assert_eq!(res.status_line, "HTTP/1.1 200 OK");
    assert_eq!(res.header("Content-Type"), Some("application/octet-stream"));
    assert_eq!(res.content_length(), 5);
    assert_eq!(res.body, b"hello");

    let res = request(
        server.addr,
        b"GET /files/new.txt HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n",
    )
    .await;
    assert_eq!(res.header("Content-Encoding"), Some("gzip"));
    assert_eq!(res.content_length(), res.body.len());
    assert_eq!(gunzip(&res.body), b"hello");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_files_method_not_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_server(test_config(dir.path())).await;

    let res = request(server.addr, b"DELETE /files/new.txt HTTP/1.1\r\n\r\n").await;
    assert_eq!(res.status_line, "HTTP/1.1 405 Method Not Allowed");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_path_traversal_is_rejected() {
    let outer = tempfile::tempdir().unwrap();
    let served = outer.path().join("served");
    std::fs::create_dir(&served).unwrap();
    std::fs::write(outer.path().join("secret.txt"), b"secret").unwrap();
    let server = start_server(test_config(&served)).await;

    let res = request(server.addr, b"GET /files/../secret.txt HTTP/1.1\r\n\r\n").await;
    assert_eq!(res.status_line, "HTTP/1.1 404 Not Found");
    assert_ne!(res.body, b"secret");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_response_reparses_to_same_fields() {
    let encoded = Response::new(StatusCode::Ok, "application/json", "{\"a\":1}")
        .with_encodings(&[Encoding::Gzip])
        .encode(flate2::Compression::default())
        .unwrap();
    let wire = encoded.clone().into_bytes();

    // Reading the response back through the request parser recovers the
    // header fields and exactly Content-Length body bytes.
    let mut reader = &wire[..];
    let parsed = Request::read_from(&mut reader, RequestLimits::default()).await.unwrap();
    assert_eq!(parsed.headers.content_type, "application/json");
    assert_eq!(parsed.headers.content_length, encoded.content_length());
    assert_eq!(parsed.body, encoded.body());
    assert_eq!(gunzip(&parsed.body), b"{\"a\":1}");
    assert!(reader.is_empty());
}
