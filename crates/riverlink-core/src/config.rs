// ── Runtime connection configuration ──
//
// Describes *how* to reach a BlueRiver API server and how often to poll it.
// Never touches disk: the CLI builds a `ControllerConfig` and hands it in.

use std::time::Duration;

use riverlink_api::ClientConfig;
use riverlink_api::transport::DEFAULT_PORT;

/// Address the BlueRiver add-on listens on in a factory setup.
pub const DEFAULT_HOST: &str = "10.0.1.135";

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for one BlueRiver API server.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Socket, handshake, and retry tuning for the protocol client.
    pub client: ClientConfig,
    /// How often the background task refreshes the topology. Zero disables it.
    pub scan_interval: Duration,
}

impl ControllerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            client: ClientConfig::new(host, port),
            scan_interval: DEFAULT_SCAN_INTERVAL,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}
