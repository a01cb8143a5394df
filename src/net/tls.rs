//! TLS configuration, certificate loading and session capture.

use std::io;
use std::path::Path;

use axum::middleware::AddExtension;
use axum::Extension;
use axum_server::accept::{Accept, DefaultAcceptor};
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::server::TlsStream;
use tower::Layer;

use crate::reflection::TlsSession;

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, io::Error> {
    if !cert_path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}

/// Rustls acceptor that records the negotiated session parameters.
///
/// After the handshake the connection's [`TlsSession`] is attached to every
/// request served on it, which is how handlers learn the protocol version,
/// cipher suite, SNI and ALPN.
#[derive(Debug, Clone)]
pub struct TlsInfoAcceptor {
    inner: RustlsAcceptor<DefaultAcceptor>,
}

impl TlsInfoAcceptor {
    pub fn new(config: RustlsConfig) -> Self {
        Self {
            inner: RustlsAcceptor::new(config),
        }
    }
}

impl<I, S> Accept<I, S> for TlsInfoAcceptor
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: Send + 'static,
{
    type Stream = TlsStream<I>;
    type Service = AddExtension<S, TlsSession>;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();

        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await?;
            let conn = stream.get_ref().1;
            let session = TlsSession {
                version: conn.protocol_version().map(u16::from),
                cipher_suite: conn.negotiated_cipher_suite().map(|s| u16::from(s.suite())),
                server_name: conn.server_name().map(str::to_string),
                alpn: conn
                    .alpn_protocol()
                    .map(|p| String::from_utf8_lossy(p).into_owned()),
            };

            tracing::debug!(
                version = ?session.version,
                cipher_suite = ?session.cipher_suite,
                server_name = ?session.server_name,
                "TLS handshake complete"
            );

            Ok((stream, Extension(session).layer(service)))
        })
    }
}
