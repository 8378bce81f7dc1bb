//! Opening the byte stream to the relay.

use std::future::Future;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};

use crate::error::{Error, Result};
use crate::session::Stage;

/// Opens a bidirectional byte stream to a relay.
///
/// The session is generic over this seam so tests can substitute scripted
/// streams for real sockets.
pub trait Connector {
    /// Stream type produced by [`Connector::connect`].
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connects to `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the connection cannot be established.
    fn connect(&self, host: &str, port: u16) -> impl Future<Output = Result<Self::Stream>> + Send;
}

/// Implicit TLS (port 465) using the webpki root certificates.
#[derive(Clone)]
pub struct TlsConnector {
    inner: tokio_rustls::TlsConnector,
}

impl TlsConnector {
    /// Creates a connector trusting the webpki root certificates.
    #[must_use]
    pub fn new() -> Self {
        let root_store = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            inner: tokio_rustls::TlsConnector::from(Arc::new(config)),
        }
    }
}

impl Default for TlsConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TlsConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConnector").finish_non_exhaustive()
    }
}

impl Connector for TlsConnector {
    type Stream = TlsStream<TcpStream>;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Stream> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| Error::InvalidHostname(host.to_string()))?;

        let tcp_stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| Error::transport(Stage::Connect, e))?;

        self.inner
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| Error::transport(Stage::Connect, e))
    }
}

/// Plain TCP, for local relays and test servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainConnector;

impl Connector for PlainConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Stream> {
        TcpStream::connect((host, port))
            .await
            .map_err(|e| Error::transport(Stage::Connect, e))
    }
}
