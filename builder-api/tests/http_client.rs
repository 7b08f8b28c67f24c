//! `BuilderApiClient` against a one-shot in-process HTTP responder.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use builder_api::{ApiError, AvailabilityChecker, BuilderApiClient, OriginApi};
use builder_core::OriginName;

/// Accept exactly one connection, capture the request, answer with
/// `status` and `body`. Returns the base URL and a handle yielding the raw
/// request text.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read line");
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().expect("content length");
            }
            let end = line == "\r\n" || line.is_empty();
            request.push_str(&line);
            if end {
                break;
            }
        }
        let mut payload = vec![0u8; content_length];
        reader.read_exact(&mut payload).expect("read body");
        request.push_str(&String::from_utf8_lossy(&payload));

        let mut stream = stream;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().expect("flush");
        request
    });
    (format!("http://{addr}/v1"), handle)
}

fn client(base: &str) -> BuilderApiClient {
    BuilderApiClient::new(base, Some("tok123".into()), Duration::from_secs(5))
}

#[tokio::test]
async fn not_found_means_available() {
    let (base, server) = serve_once("404 Not Found", "");
    let available = client(&base)
        .check_availability("core")
        .await
        .expect("check");
    assert!(available);

    let request = server.join().expect("server");
    assert!(request.starts_with("GET /v1/depot/origins/core "), "{request}");
    assert!(request.contains("Bearer tok123"), "{request}");
}

#[tokio::test]
async fn ok_means_taken() {
    let (base, server) = serve_once("200 OK", r#"{"name":"core"}"#);
    let available = client(&base)
        .check_availability("core")
        .await
        .expect("check");
    assert!(!available);
    server.join().expect("server");
}

#[tokio::test]
async fn rejected_token_is_auth_error() {
    let (base, server) = serve_once("401 Unauthorized", "");
    let err = client(&base).check_availability("core").await.unwrap_err();
    assert_eq!(err, ApiError::Auth { status: 401 });
    server.join().expect("server");
}

#[tokio::test]
async fn closed_port_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let err = client(&format!("http://127.0.0.1:{port}/v1"))
        .check_availability("core")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got: {err}");
}

#[tokio::test]
async fn create_origin_posts_name_and_decodes_origin() {
    let (base, server) = serve_once(
        "201 Created",
        r#"{"id":"7","name":"core","owner_id":"42","private_key_name":"core-2024"}"#,
    );
    let origin = client(&base)
        .create_origin("core", "other-token")
        .await
        .expect("create");
    assert_eq!(origin.name, OriginName::from("core"));
    assert_eq!(origin.owner_id, "42");

    let request = server.join().expect("server");
    assert!(request.starts_with("POST /v1/depot/origins "), "{request}");
    assert!(request.contains("Bearer other-token"), "{request}");
    assert!(request.contains(r#""name":"core""#), "{request}");
}

#[tokio::test]
async fn create_origin_conflict_is_reported() {
    let (base, server) = serve_once("409 Conflict", "origin exists");
    let err = client(&base)
        .create_origin("core", "tok123")
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Conflict("origin exists".into()));
    server.join().expect("server");
}

#[tokio::test]
async fn my_origins_decodes_list() {
    let (base, server) = serve_once("200 OK", r#"[{"name":"core"},{"name":"extras"}]"#);
    let origins = client(&base).my_origins("tok123").await.expect("list");
    let names: Vec<_> = origins.iter().map(|o| o.name.to_string()).collect();
    assert_eq!(names, vec!["core", "extras"]);
    let request = server.join().expect("server");
    assert!(request.starts_with("GET /v1/user/origins "), "{request}");
}
