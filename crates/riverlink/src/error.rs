//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use riverlink_config::ConfigError;
use riverlink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the BlueRiver API at {address}")]
    #[diagnostic(
        code(riverlink::connection_failed),
        help(
            "Check that the control add-on is running and reachable.\n\
             Address: {address}\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { address: String, reason: String },

    #[error("{address} does not accept {api} {version}")]
    #[diagnostic(
        code(riverlink::handshake_rejected),
        help("Set a supported version with --api-version or `api_version` in your profile.")
    )]
    HandshakeRejected {
        address: String,
        api: String,
        version: String,
    },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(riverlink::not_found),
        help("Run: riverlink {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Device ───────────────────────────────────────────────────────

    #[error("Device error ({code}): {message}")]
    #[diagnostic(code(riverlink::device_error))]
    DeviceError { code: String, message: String },

    #[error("Audio did not follow video from '{transmitter}' to '{receiver}'")]
    #[diagnostic(
        code(riverlink::audio_follow_failed),
        help(
            "Video is routed; audio is not.\n\
             Reason: {reason}\n\
             Retry with: riverlink route set {receiver} {transmitter}"
        )
    )]
    AudioFollowFailed {
        receiver: String,
        transmitter: String,
        reason: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(riverlink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(riverlink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: riverlink config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No BlueRiver API host configured")]
    #[diagnostic(
        code(riverlink::no_config),
        help(
            "Create a profile with: riverlink config init\n\
             Or pass --host (RIVERLINK_HOST).\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(riverlink::config))]
    Config(Box<figment::Error>),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(riverlink::timeout),
        help("Increase timeout with --timeout or check that the API server is responsive.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(riverlink::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::HandshakeRejected { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { host, port, reason } => CliError::ConnectionFailed {
                address: format!("{host}:{port}"),
                reason,
            },

            CoreError::HandshakeRejected {
                host,
                port,
                api,
                version,
            } => CliError::HandshakeRejected {
                address: format!("{host}:{port}"),
                api,
                version,
            },

            CoreError::ControllerDisconnected => CliError::ConnectionFailed {
                address: "(disconnected)".into(),
                reason: "the session was closed".into(),
            },

            e @ CoreError::Communication { .. } => CliError::ConnectionFailed {
                address: "(session)".into(),
                reason: e.to_string(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::ReceiverNotFound { identifier } => CliError::NotFound {
                resource_type: "receiver".into(),
                identifier,
                list_command: "receivers list".into(),
            },

            CoreError::TransmitterNotFound { identifier } => CliError::NotFound {
                resource_type: "transmitter".into(),
                identifier,
                list_command: "transmitters list".into(),
            },

            CoreError::UnknownPreset { preset } => CliError::NotFound {
                resource_type: "preset".into(),
                identifier: preset,
                list_command: "preset list".into(),
            },

            CoreError::UnknownDisplayMode { mode } => CliError::Validation {
                field: "mode".into(),
                reason: format!("unknown display mode '{mode}'"),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::AudioFollowFailed {
                receiver,
                transmitter,
                reason,
            } => CliError::AudioFollowFailed {
                receiver,
                transmitter,
                reason,
            },

            CoreError::Rejected { message } => CliError::DeviceError {
                code: "rejected".into(),
                message,
            },

            CoreError::NotConverged { message } => CliError::DeviceError {
                code: "not_converged".into(),
                message,
            },

            CoreError::Protocol { message } => CliError::DeviceError {
                code: "protocol".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            e @ ConfigError::Serialization(_) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let refused = CliError::from(CoreError::ConnectionFailed {
            host: "10.0.1.135".into(),
            port: 6970,
            reason: "refused".into(),
        });
        assert_eq!(refused.exit_code(), exit_code::CONNECTION);

        let missing = CliError::from(CoreError::ReceiverNotFound {
            identifier: "Lobby".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(missing.to_string(), "receiver 'Lobby' not found");

        let slow = CliError::from(CoreError::Timeout { timeout_secs: 10 });
        assert_eq!(slow.exit_code(), exit_code::TIMEOUT);

        let rejected = CliError::from(CoreError::Rejected {
            message: "Join failed: busy".into(),
        });
        assert_eq!(rejected.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn missing_streams_are_reported_by_the_device() {
        let err = CliError::from(CoreError::from(riverlink_api::Error::Api {
            message: "Failed to start stream: no such stream".into(),
        }));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        match err {
            CliError::DeviceError { code, message } => {
                assert_eq!(code, "rejected");
                assert!(message.contains("no such stream"), "{message}");
            }
            other => panic!("expected DeviceError, got {other:?}"),
        }

        let preset = CliError::from(CoreError::UnknownPreset {
            preset: "8K @ 120Hz".into(),
        });
        assert_eq!(preset.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn unknown_profile_is_not_found() {
        let err = CliError::from(ConfigError::UnknownProfile {
            name: "attic".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
