//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use devserve::lifecycle::startup;
use devserve::reload::ClientRegistry;
use devserve::{HttpServer, ServerConfig, Shutdown};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A running server over a temporary root. Shuts down on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub root: TempDir,
    pub registry: ClientRegistry,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    /// Wait until exactly `count` reload clients are registered.
    pub async fn wait_for_clients(&self, count: usize) {
        for _ in 0..100 {
            if self.registry.len() == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("expected {count} reload clients, have {}", self.registry.len());
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server on an ephemeral port. `configure` runs before startup
/// validation, with the root already pointing at a fresh temp dir.
pub async fn start_server(configure: impl FnOnce(&mut ServerConfig, &Path)) -> TestServer {
    let root = tempfile::tempdir().unwrap();

    let mut config = ServerConfig::default();
    config.serve.root = root.path().to_path_buf();
    configure(&mut config, root.path());
    let config = startup::prepare(config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let registry = server.registry().clone();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestServer {
        addr,
        root,
        registry,
        shutdown,
    }
}

/// Send a request line verbatim, bypassing client-side path normalization.
/// Returns the status code and the raw response text.
#[allow(dead_code)]
pub async fn raw_request(addr: SocketAddr, method: &str, target: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{method} {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("response timed out")
        .unwrap();

    let text = String::from_utf8_lossy(&response).into_owned();
    let status = text
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);
    (status, text)
}
