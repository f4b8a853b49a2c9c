use std::time::Duration;

use thiserror::Error;

/// Broad failure class, mirroring how callers are expected to react.
///
/// - `Connection`: the session could not be established (retried internally
///   at connect time, surfaced after exhaustion).
/// - `Communication`: an established session failed mid-flight; the socket
///   has been torn down and the next call reconnects.
/// - `Client`: the server answered, but the answer was an error, malformed,
///   or never converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Communication,
    Client,
}

/// Top-level error type for the `riverlink-api` crate.
///
/// `riverlink-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// Every connect attempt failed at the transport level.
    #[error("Failed to connect to {host}:{port} after {attempts} attempt(s): {source}")]
    Connection {
        host: String,
        port: u16,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// The server answered the `require` handshake with something other than SUCCESS.
    #[error("Server at {host}:{port} refused {api} {version}")]
    HandshakeRejected {
        host: String,
        port: u16,
        api: String,
        version: String,
    },

    // ── Communication ───────────────────────────────────────────────
    /// No complete response arrived within the I/O timeout.
    #[error("Timed out after {}ms waiting for the server", .timeout.as_millis())]
    Timeout { timeout: Duration },

    /// Peer closed the socket before a complete response arrived.
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// A command was issued without an established session.
    #[error("Not connected to API server")]
    NotConnected,

    /// A PROCESSING request never reached a terminal status.
    #[error("Request {request_id} timed out after {attempts} attempts")]
    PollExhausted { request_id: String, attempts: u32 },

    /// Socket-level I/O failure (connection refused, reset, etc.).
    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    // ── Client ──────────────────────────────────────────────────────
    /// Server reported `{"status":"ERROR"}`.
    #[error("{message}")]
    Api { message: String },

    /// Response bytes were not valid JSON. Carries the raw text for debugging.
    #[error("Invalid JSON response: {message}")]
    InvalidJson { message: String, body: String },

    /// A response grew past the framer's size cap without completing.
    #[error("Response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },

    /// Response carried a status outside SUCCESS / ERROR / PROCESSING.
    #[error("Unknown status '{status}' in response")]
    UnknownStatus { status: String },

    /// A PROCESSING response omitted its `request_id`.
    #[error("No request_id in PROCESSING response")]
    MissingRequestId,

    /// Join acknowledged, but the subscription never reported STREAMING.
    #[error(
        "{stream_type}:{index} on {device_id} did not reach STREAMING after {attempts} join attempt(s)"
    )]
    NotStreaming {
        stream_type: String,
        index: u32,
        device_id: String,
        attempts: u32,
    },

    /// Leave acknowledged, but the subscription kept reporting STREAMING.
    #[error("{stream_type}:{index} on {device_id} still STREAMING after {attempts} leave attempt(s)")]
    StillStreaming {
        stream_type: String,
        index: u32,
        device_id: String,
        attempts: u32,
    },

    /// Caller supplied arguments the protocol cannot express.
    #[error("{message}")]
    InvalidArgument { message: String },

    /// Response was well-formed JSON but not the expected shape.
    #[error("Unexpected response: {message}")]
    Unexpected { message: String },
}

impl Error {
    /// Classify this error into the connection / communication / client taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } | Self::HandshakeRejected { .. } => ErrorKind::Connection,
            Self::Timeout { .. }
            | Self::ConnectionClosed
            | Self::NotConnected
            | Self::PollExhausted { .. }
            | Self::Io(_) => ErrorKind::Communication,
            Self::Api { .. }
            | Self::InvalidJson { .. }
            | Self::ResponseTooLarge { .. }
            | Self::UnknownStatus { .. }
            | Self::MissingRequestId
            | Self::NotStreaming { .. }
            | Self::StillStreaming { .. }
            | Self::InvalidArgument { .. }
            | Self::Unexpected { .. } => ErrorKind::Client,
        }
    }

    pub fn is_communication(&self) -> bool {
        self.kind() == ErrorKind::Communication
    }

    /// Returns `true` if this is a transport failure worth retrying at connect time.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::ConnectionClosed | Self::Io(_)
        )
    }

    /// Returns `true` if the byte stream can no longer be trusted to line up
    /// responses with commands, so the socket must be dropped.
    pub(crate) fn desyncs_session(&self) -> bool {
        self.is_communication()
            || matches!(self, Self::InvalidJson { .. } | Self::ResponseTooLarge { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_matches_recovery_policy() {
        assert_eq!(Error::ConnectionClosed.kind(), ErrorKind::Communication);
        assert_eq!(Error::MissingRequestId.kind(), ErrorKind::Client);
        assert_eq!(
            Error::HandshakeRejected {
                host: "h".into(),
                port: 1,
                api: "blueriver_api".into(),
                version: "2.13.0.0".into(),
            }
            .kind(),
            ErrorKind::Connection
        );
        assert!(Error::Timeout { timeout: Duration::from_secs(1) }.is_transient());
        assert!(!Error::Api { message: "nope".into() }.is_transient());
    }

    #[test]
    fn malformed_json_tears_down_the_session() {
        let err = Error::InvalidJson {
            message: "expected value".into(),
            body: "{oops".into(),
        };
        assert!(err.desyncs_session());
        assert!(Error::ResponseTooLarge { limit: 1024 }.desyncs_session());
        assert!(!Error::UnknownStatus { status: "WAT".into() }.desyncs_session());
    }
}
