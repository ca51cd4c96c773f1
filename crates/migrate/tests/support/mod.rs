//! Hand-rolled in-process HTTP stub for the end-to-end scenario tests.
//! No external network access: every request is served from a fixed
//! route table over a loopback `TcpListener`, parsing only the request
//! line and draining headers before replying.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

/// One fixture response, matched on the request's path (query string
/// ignored).
pub struct Route {
    pub path: &'static str,
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: &'static [u8],
}

impl Route {
    #[must_use]
    pub const fn ok(path: &'static str, content_type: &'static str, body: &'static [u8]) -> Self {
        Self {
            path,
            status: 200,
            content_type: Some(content_type),
            body,
        }
    }

    #[must_use]
    pub const fn not_found(path: &'static str) -> Self {
        Self {
            path,
            status: 404,
            content_type: None,
            body: b"",
        }
    }
}

/// A running stub server. Dropping it stops the accept loop.
pub struct StubServer {
    addr: SocketAddr,
    hits: Arc<Mutex<HashMap<String, u32>>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StubServer {
    pub async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener local addr");
        let routes = Arc::new(routes);
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let accept_hits = hits.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    accepted = listener.accept() => {
                        if let Ok((stream, _)) = accepted {
                            tokio::spawn(handle(stream, routes.clone(), accept_hits.clone()));
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Self {
            addr,
            hits,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of requests this server has seen for `path` so far.
    pub async fn hits(&self, path: &str) -> u32 {
        self.hits.lock().await.get(path).copied().unwrap_or(0)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn handle(stream: TcpStream, routes: Arc<Vec<Route>>, hits: Arc<Mutex<HashMap<String, u32>>>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
        return;
    }

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => continue,
        }
    }

    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .split('?')
        .next()
        .unwrap_or("/")
        .to_string();

    hits.lock().await.entry(path.clone()).and_modify(|n| *n += 1).or_insert(1);

    let mut stream = reader.into_inner();
    match routes.iter().find(|route| route.path == path) {
        Some(route) => write_response(&mut stream, route.status, route.content_type, route.body).await,
        None => write_response(&mut stream, 404, None, b"not found").await,
    }
}

async fn write_response(stream: &mut TcpStream, status: u16, content_type: Option<&str>, body: &[u8]) {
    let mut head = format!("HTTP/1.1 {status} {}\r\n", reason_phrase(status));
    if let Some(content_type) = content_type {
        head.push_str(&format!("Content-Type: {content_type}\r\n"));
    }
    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    head.push_str("Connection: close\r\n\r\n");
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(body).await;
    let _ = stream.shutdown().await;
}

const fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        _ => "Error",
    }
}
