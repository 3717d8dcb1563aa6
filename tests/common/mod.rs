//! Shared utilities for integration tests.
//!
//! Mock department backends are raw TCP responders on ephemeral ports so a
//! test can control exactly what the remote side does and count every call.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use user_aggregator::config::ServiceConfig;

/// Start a programmable backend. `f` receives the request path and returns
/// the status code and body to send.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let path = read_request_path(&mut socket).await;
                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_path(socket: &mut TcpStream) -> String {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") && buf.len() < 16 * 1024 {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let head = String::from_utf8_lossy(&buf);
    head.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string()
}

/// A mock department service that can be switched between healthy and
/// failing (503) and counts every request it receives.
pub struct MockDepartments {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicU32>,
    pub healthy: Arc<AtomicBool>,
}

impl MockDepartments {
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

/// Start a mock department service knowing the given `(id, name)` pairs.
pub async fn start_department_backend(departments: &[(u64, &str)]) -> MockDepartments {
    let known: Arc<Vec<(u64, String)>> = Arc::new(
        departments
            .iter()
            .map(|(id, name)| (*id, name.to_string()))
            .collect(),
    );
    let calls = Arc::new(AtomicU32::new(0));
    let healthy = Arc::new(AtomicBool::new(true));

    let (c, h) = (calls.clone(), healthy.clone());
    let addr = start_programmable_backend(move |path| {
        let known = known.clone();
        let c = c.clone();
        let h = h.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            if !h.load(Ordering::SeqCst) {
                return (503, "{\"error\":\"down\"}".to_string());
            }
            let id = path.strip_prefix("/api/departments/").and_then(|s| s.parse::<u64>().ok());
            match id.and_then(|id| known.iter().find(|(k, _)| *k == id)) {
                Some((id, name)) => (200, format!("{{\"id\":{},\"name\":\"{}\"}}", id, name)),
                None => (404, "{\"error\":\"not_found\"}".to_string()),
            }
        }
    })
    .await;

    MockDepartments { addr, calls, healthy }
}

/// Start a backend that accepts connections and never answers.
pub async fn start_stalled_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Config pointing at `base_url` with the given breaker settings.
pub fn config_for(base_url: &str, failure_threshold: u32, cooldown_ms: u64) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.department_service.base_url = base_url.to_string();
    config.department_service.timeout_ms = 500;
    config.department_service.connect_timeout_ms = 200;
    config.circuit_breaker.failure_threshold = failure_threshold;
    config.circuit_breaker.cooldown_ms = cooldown_ms;
    config
}

/// Give a just-spawned server a moment to start accepting.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
