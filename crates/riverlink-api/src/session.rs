// ── Session lifecycle ──
//
// Owns the socket and its connected/disconnected state. Nothing outside
// this module touches the stream directly; callers go through state
// transitions (`connect`, `disconnect`) or `command`, which tears the
// socket down whenever the byte stream can no longer be trusted.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::framer::JsonFramer;
use crate::protocol::{Response, WireCommand};
use crate::transport::{ClientConfig, Connector};

// ── Connection ───────────────────────────────────────────────────────

/// An open stream plus its framing buffer.
pub(crate) struct Connection<S> {
    stream: S,
    framer: JsonFramer,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn new(stream: S, config: &ClientConfig) -> Self {
        Self {
            stream,
            framer: JsonFramer::new(config.io_timeout),
        }
    }

    /// Write one command line and read back one response document.
    pub(crate) async fn round_trip(&mut self, line: &str) -> Result<Response, Error> {
        debug!(command = line, "sending command");
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await?;

        let doc = self.framer.read_document(&mut self.stream).await?;
        Ok(Response::from_value(doc))
    }

    async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "error closing connection");
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────

enum State<S> {
    Disconnected,
    Ready(Connection<S>),
}

/// Connection state machine: `Disconnected -> Ready -> Disconnected`.
pub(crate) struct Session<C: Connector> {
    connector: C,
    config: ClientConfig,
    state: State<C::Stream>,
}

impl<C: Connector> Session<C> {
    pub(crate) fn new(connector: C, config: ClientConfig) -> Self {
        Self {
            connector,
            config,
            state: State::Disconnected,
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Open the socket and perform the `require` handshake, retrying
    /// transport failures with backoff.
    ///
    /// Returns `Ok(false)` when the server answers the handshake with
    /// anything but SUCCESS; that is a refusal, not a transport fault.
    pub(crate) async fn connect(&mut self) -> Result<bool, Error> {
        self.disconnect().await;

        let policy = self.config.connect;
        let max_attempts = policy.max_attempts.max(1);
        let (host, port) = (self.config.host.clone(), self.config.port);

        let mut attempt = 1;
        loop {
            debug!(host = %host, port, attempt, max_attempts, "connecting");
            match self.open().await {
                Ok(Some(conn)) => {
                    info!(host = %host, port, "connected to BlueRiver API");
                    self.state = State::Ready(conn);
                    return Ok(true);
                }
                Ok(None) => return Ok(false),
                Err(e) if e.is_transient() => {
                    if attempt >= max_attempts {
                        error!(host = %host, port, attempts = max_attempts, error = %e, "giving up on connection");
                        return Err(Error::Connection {
                            host,
                            port,
                            attempts: max_attempts,
                            source: Box::new(e),
                        });
                    }
                    let delay = policy.backoff.delay(attempt - 1);
                    info!(
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "connection attempt failed, retrying (service may still be starting)"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(error = %e, "unexpected error during connection");
                    return Err(Error::Unexpected {
                        message: format!("during connection: {e}"),
                    });
                }
            }
        }
    }

    /// One connect attempt: stream, handshake, verdict.
    async fn open(&self) -> Result<Option<Connection<C::Stream>>, Error> {
        let cfg = &self.config;
        let stream = tokio::time::timeout(cfg.io_timeout, self.connector.connect(&cfg.host, cfg.port))
            .await
            .map_err(|_| Error::Timeout {
                timeout: cfg.io_timeout,
            })??;

        let mut conn = Connection::new(stream, cfg);
        let handshake = WireCommand::Require {
            api: &cfg.api_name,
            version: &cfg.api_version,
        };
        let response = conn.round_trip(&handshake.to_string()).await?;

        if response.is_success() {
            Ok(Some(conn))
        } else {
            error!(
                api = %cfg.api_name,
                version = %cfg.api_version,
                status = %response.status,
                "API rejected connection"
            );
            conn.close().await;
            Ok(None)
        }
    }

    /// Connect if needed, treating a refused handshake as a connection error.
    pub(crate) async fn ensure_ready(&mut self) -> Result<(), Error> {
        if self.is_connected() || self.connect().await? {
            return Ok(());
        }
        Err(Error::HandshakeRejected {
            host: self.config.host.clone(),
            port: self.config.port,
            api: self.config.api_name.clone(),
            version: self.config.api_version.clone(),
        })
    }

    /// Best-effort close. Always ends `Disconnected`.
    pub(crate) async fn disconnect(&mut self) {
        if let State::Ready(conn) = std::mem::replace(&mut self.state, State::Disconnected) {
            conn.close().await;
            debug!("disconnected from BlueRiver API");
        }
    }

    /// Run one command to a terminal response, resolving PROCESSING by polling.
    ///
    /// Drops the socket if the failure leaves the stream out of step.
    pub(crate) async fn command(&mut self, line: &str) -> Result<Response, Error> {
        let State::Ready(conn) = &mut self.state else {
            return Err(Error::NotConnected);
        };
        let result = conn.execute(line, &self.config.poll).await;
        if let Err(ref e) = result {
            if e.desyncs_session() {
                warn!(error = %e, command = line, "dropping session after communication failure");
                self.state = State::Disconnected;
            }
        }
        result
    }
}
