//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use http_reflector::net::load_tls_config;
use http_reflector::{HttpServer, ReflectorConfig, Shutdown};
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A reflector bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_reflector(mut config: ReflectorConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".into();
    config.observability.access_log = false;

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let rx = shutdown.subscribe();
    let task = tokio::spawn(async move { server.run(listener, rx).await });

    TestServer { addr, shutdown, task }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// An HTTPS reflector with a throwaway self-signed certificate for
/// `localhost`. The PEM files live as long as the server.
#[allow(dead_code)]
pub struct TlsTestServer {
    pub server: TestServer,
    _cert: NamedTempFile,
    _key: NamedTempFile,
}

#[allow(dead_code)]
impl TlsTestServer {
    pub fn url(&self, path: &str) -> String {
        format!("https://localhost:{}{}", self.server.addr.port(), path)
    }
}

#[allow(dead_code)]
pub async fn start_tls_reflector(mut config: ReflectorConfig) -> TlsTestServer {
    use std::io::Write;

    // Test builds see both rustls providers; pick one explicitly.
    let _ = tokio_rustls::rustls::crypto::aws_lc_rs::default_provider().install_default();

    let generated = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let mut cert = NamedTempFile::new().unwrap();
    cert.write_all(generated.cert.pem().as_bytes()).unwrap();
    let mut key = NamedTempFile::new().unwrap();
    key.write_all(generated.key_pair.serialize_pem().as_bytes()).unwrap();

    let tls = load_tls_config(cert.path(), key.path()).await.unwrap();

    // axum-server binds by address, so reserve a free port first.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    config.listener.bind_address = addr.to_string();
    config.observability.access_log = false;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let rx = shutdown.subscribe();
    let task = tokio::spawn(async move { server.run_tls(addr, tls, rx).await });

    wait_for_listener(addr).await;
    TlsTestServer {
        server: TestServer { addr, shutdown, task },
        _cert: cert,
        _key: key,
    }
}

#[allow(dead_code)]
async fn wait_for_listener(addr: SocketAddr) {
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("listener on {addr} never came up");
}

/// Client that trusts any certificate and resolves `localhost` to `addr`.
#[allow(dead_code)]
pub fn tls_client(addr: SocketAddr) -> reqwest::Client {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .resolve("localhost", addr)
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
