//! Tests de integración para el servidor de búsqueda
//! tests/integration_test.rs
//!
//! Cada test arranca su propio servidor sobre un corpus temporal, en un
//! puerto elegido por el sistema, y le habla por TCP.

use search_server::config::Config;
use search_server::crawler::DirErrorPolicy;
use search_server::server::Server;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Servidor corriendo en background más el corpus que indexó
struct TestServer {
    addr: SocketAddr,
    root: TempDir,
}

impl TestServer {
    fn start() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("a.txt"), "Cat cat dog.").unwrap();
        fs::write(root.path().join("b.txt"), "dog DOG").unwrap();
        fs::write(root.path().join("index.html"), "<html>welcome</html>").unwrap();
        fs::create_dir(root.path().join("nested")).unwrap();
        fs::write(root.path().join("nested").join("c.txt"), "bird, cat; bird?").unwrap();

        let config = Config {
            port: 0,
            root: root.path().to_path_buf(),
            workers: 4,
            dir_errors: DirErrorPolicy::Abort,
            ..Config::default()
        };

        let mut server = Server::new(config).unwrap();
        let addr = server.bind().unwrap();
        thread::spawn(move || server.run());

        Self { addr, root }
    }

    fn doc(&self, rel: &str) -> String {
        let path: PathBuf = rel.split('/').fold(self.root.path().to_path_buf(), |p, c| p.join(c));
        path.to_string_lossy().into_owned()
    }

    fn connect(&self) -> TcpStream {
        let stream = TcpStream::connect(self.addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        stream
    }
}

/// Una respuesta leída del socket
#[derive(Debug)]
struct RawResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: String,
}

/// Lee exactamente una respuesta usando `Content-Length`
fn read_response(reader: &mut BufReader<TcpStream>) -> RawResponse {
    let mut status_line = String::new();
    reader.read_line(&mut status_line).unwrap();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or_else(|| panic!("bad status line: {:?}", status_line));

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':').unwrap();
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    let length: usize = headers
        .get("content-length")
        .map(|v| v.parse().unwrap())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).unwrap();

    RawResponse {
        status,
        headers,
        body: String::from_utf8(body).unwrap(),
    }
}

fn get(server: &TestServer, target: &str) -> RawResponse {
    let mut stream = server.connect();
    write!(stream, "GET {} HTTP/1.1\r\nConnection: close\r\n\r\n", target).unwrap();
    read_response(&mut BufReader::new(stream))
}

#[test]
fn test_query_single_term_ranked() {
    let server = TestServer::start();
    let response = get(&server, "/query?terms=dog");

    assert_eq!(response.status, 200);
    let b = response.body.find(&format!("<li>{} [2]</li>", server.doc("b.txt"))).unwrap();
    let a = response.body.find(&format!("<li>{} [1]</li>", server.doc("a.txt"))).unwrap();
    assert!(b < a);
}

#[test]
fn test_query_and_semantics() {
    let server = TestServer::start();

    let response = get(&server, "/query?terms=cat+dog");
    assert!(response.body.contains(&format!("<li>{} [3]</li>", server.doc("a.txt"))));
    assert!(!response.body.contains(&server.doc("b.txt")));

    let response = get(&server, "/query?terms=bird+cat");
    assert!(response
        .body
        .contains(&format!("<li>{} [3]</li>", server.doc("nested/c.txt"))));

    let response = get(&server, "/query?terms=cat+unicorn");
    assert_eq!(response.status, 200);
    assert!(!response.body.contains("<li>"));
}

#[test]
fn test_query_terms_are_normalized() {
    let server = TestServer::start();
    let response = get(&server, "/query?terms=%22CAT%22+Dog!");
    assert!(response.body.contains(&format!("<li>{} [3]</li>", server.doc("a.txt"))));
}

#[test]
fn test_pipelined_requests_in_one_write() {
    let server = TestServer::start();
    let mut stream = server.connect();

    stream
        .write_all(b"GET /query?terms=cat HTTP/1.1\r\n\r\nGET /query?terms=dog HTTP/1.1\r\n\r\n")
        .unwrap();

    let mut reader = BufReader::new(stream);
    let first = read_response(&mut reader);
    let second = read_response(&mut reader);

    assert_eq!(first.status, 200);
    assert!(first.body.contains(&format!("<li>{} [2]</li>", server.doc("a.txt"))));
    assert!(!first.body.contains(&server.doc("b.txt")));

    assert_eq!(second.status, 200);
    assert!(second.body.contains(&format!("<li>{} [2]</li>", server.doc("b.txt"))));
}

#[test]
fn test_keep_alive_then_close() {
    let server = TestServer::start();
    let mut stream = server.connect();
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    stream.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();
    let first = read_response(&mut reader);
    assert_eq!(first.status, 302);
    assert!(first.headers.get("connection").is_none());

    stream
        .write_all(b"GET /query?terms=cat HTTP/1.1\r\nConnection: Close\r\n\r\n")
        .unwrap();
    let second = read_response(&mut reader);
    assert_eq!(second.status, 200);
    assert_eq!(second.headers.get("connection").map(String::as_str), Some("close"));

    // El servidor cerró: no hay más bytes
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn test_root_redirects_to_index() {
    let server = TestServer::start();
    let response = get(&server, "/");

    assert_eq!(response.status, 302);
    assert_eq!(
        response.headers.get("location").map(String::as_str),
        Some("/static/index.html")
    );
}

#[test]
fn test_static_file() {
    let server = TestServer::start();

    let response = get(&server, "/static/index.html");
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "<html>welcome</html>");
    assert!(response.headers["content-type"].starts_with("text/html"));

    let response = get(&server, "/static/nested/c.txt");
    assert_eq!(response.body, "bird, cat; bird?");
}

#[test]
fn test_not_found() {
    let server = TestServer::start();

    assert_eq!(get(&server, "/static/missing.txt").status, 404);
    assert_eq!(get(&server, "/static/../a.txt").status, 404);
    assert_eq!(get(&server, "/unknown").status, 404);
}

#[test]
fn test_bad_request_closes_connection() {
    let server = TestServer::start();
    let mut stream = server.connect();
    stream.write_all(b"NOT-HTTP\r\n\r\nGET / HTTP/1.1\r\n\r\n").unwrap();

    let mut reader = BufReader::new(stream);
    let response = read_response(&mut reader);
    assert_eq!(response.status, 400);

    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn test_metrics_endpoint() {
    let server = TestServer::start();
    get(&server, "/query?terms=cat");

    let response = get(&server, "/metrics");
    assert_eq!(response.status, 200);

    let value: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(value["pool"]["workers"], 4);
    assert_eq!(value["index"]["documents"], 4);
    assert!(value["requests"]["total"].as_u64().unwrap() >= 1);
}

#[test]
fn test_concurrent_clients() {
    let server = TestServer::start();
    let expected = format!("<li>{} [3]</li>", server.doc("a.txt"));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let addr = server.addr;
            let expected = expected.clone();
            thread::spawn(move || {
                let stream = TcpStream::connect(addr).unwrap();
                stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
                let mut writer = stream.try_clone().unwrap();
                let mut reader = BufReader::new(stream);

                for _ in 0..5 {
                    writer
                        .write_all(b"GET /query?terms=dog+cat HTTP/1.1\r\n\r\n")
                        .unwrap();
                    let response = read_response(&mut reader);
                    assert_eq!(response.status, 200);
                    assert!(response.body.contains(&expected));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
