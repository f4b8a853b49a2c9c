// ── Transport configuration and connector seam ──
//
// The session never opens sockets itself; it asks a `Connector` for a
// byte stream. Production uses plain TCP, tests substitute in-memory pipes.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::backoff::{PollPolicy, RetryPolicy};

pub const DEFAULT_PORT: u16 = 6970;
pub const DEFAULT_API_NAME: &str = "blueriver_api";
pub const DEFAULT_API_VERSION: &str = "2.13.0.0";
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the byte stream a session runs over.
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP with Nagle disabled; commands are tiny and latency-bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

/// Everything a [`BlueRiverClient`](crate::BlueRiverClient) needs to reach
/// and talk to one server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// API name declared in the `require` handshake.
    pub api_name: String,
    pub api_version: String,
    /// Applies to each connect attempt and each socket read.
    pub io_timeout: Duration,
    pub connect: RetryPolicy,
    pub poll: PollPolicy,
    pub join: RetryPolicy,
    pub leave: RetryPolicy,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            api_name: DEFAULT_API_NAME.into(),
            api_version: DEFAULT_API_VERSION.into(),
            io_timeout: DEFAULT_IO_TIMEOUT,
            connect: RetryPolicy::CONNECT,
            poll: PollPolicy::default(),
            join: RetryPolicy::VERIFY,
            leave: RetryPolicy::VERIFY,
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn tcp_connector_reaches_a_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            sock.read_exact(&mut buf).await.unwrap();
            buf
        });

        let mut stream = TcpConnector.connect("127.0.0.1", port).await.unwrap();
        assert!(stream.nodelay().unwrap());
        stream.write_all(b"ping\n").await.unwrap();

        assert_eq!(&server.await.unwrap(), b"ping\n");
    }

    #[test]
    fn defaults_match_blueriver_expectations() {
        let cfg = ClientConfig::new("10.0.1.135", DEFAULT_PORT);
        assert_eq!(cfg.api_name, "blueriver_api");
        assert_eq!(cfg.api_version, "2.13.0.0");
        assert_eq!(cfg.io_timeout, Duration::from_secs(10));
        assert_eq!(cfg.poll.max_attempts, 20);
    }
}
