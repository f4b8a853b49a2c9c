// ── Core error types ──
//
// User-facing errors from riverlink-core. Consumers never see raw socket
// errors or JSON framing failures directly; the `From<riverlink_api::Error>`
// impl translates them into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to BlueRiver API at {host}:{port}: {reason}")]
    ConnectionFailed {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("API version rejected by {host}:{port}: {api} {version}")]
    HandshakeRejected {
        host: String,
        port: u16,
        api: String,
        version: String,
    },

    #[error("Controller disconnected")]
    ControllerDisconnected,

    #[error("Timed out after {timeout_secs}s waiting for the BlueRiver API")]
    Timeout { timeout_secs: u64 },

    #[error("Communication with the BlueRiver API failed: {message}")]
    Communication { message: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Receiver '{identifier}' not found")]
    ReceiverNotFound { identifier: String },

    #[error("Transmitter '{identifier}' not found")]
    TransmitterNotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Unknown display mode: {mode}")]
    UnknownDisplayMode { mode: String },

    #[error("Unknown resolution preset: {preset}")]
    UnknownPreset { preset: String },

    #[error("Operation rejected by device: {message}")]
    Rejected { message: String },

    #[error("Route not confirmed: {message}")]
    NotConverged { message: String },

    /// Video joined, audio did not. The video route is left in place.
    #[error("Video from '{transmitter}' reached '{receiver}' but audio did not follow: {reason}")]
    AudioFollowFailed {
        receiver: String,
        transmitter: String,
        reason: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("Protocol error: {message}")]
    Protocol { message: String },
}

impl CoreError {
    /// Returns `true` if the failure is on the connection rather than the request.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::HandshakeRejected { .. }
                | Self::ControllerDisconnected
                | Self::Communication { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<riverlink_api::Error> for CoreError {
    fn from(err: riverlink_api::Error) -> Self {
        use riverlink_api::Error as Api;

        match err {
            Api::Connection {
                host, port, source, ..
            } => match *source {
                Api::Timeout { timeout } => CoreError::Timeout {
                    timeout_secs: timeout.as_secs(),
                },
                other => CoreError::ConnectionFailed {
                    host,
                    port,
                    reason: other.to_string(),
                },
            },
            Api::HandshakeRejected {
                host,
                port,
                api,
                version,
            } => CoreError::HandshakeRejected {
                host,
                port,
                api,
                version,
            },
            Api::Timeout { timeout } => CoreError::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            Api::NotConnected => CoreError::ControllerDisconnected,
            e @ (Api::ConnectionClosed | Api::PollExhausted { .. } | Api::Io(_)) => {
                CoreError::Communication {
                    message: e.to_string(),
                }
            }
            Api::Api { message } => CoreError::Rejected { message },
            e @ (Api::NotStreaming { .. } | Api::StillStreaming { .. }) => {
                CoreError::NotConverged {
                    message: e.to_string(),
                }
            }
            Api::InvalidArgument { message } => CoreError::ValidationFailed { message },
            e @ (Api::InvalidJson { .. }
            | Api::ResponseTooLarge { .. }
            | Api::UnknownStatus { .. }
            | Api::MissingRequestId
            | Api::Unexpected { .. }) => CoreError::Protocol {
                message: e.to_string(),
            },
        }
    }
}
