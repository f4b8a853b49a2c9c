// ── Stream and subscription endpoints ──

use riverlink_api::StreamType;
use riverlink_api::protocol::{STATE_STREAMING, UNASSIGNED_ADDRESS};
use serde::{Deserialize, Serialize};

/// Outgoing multicast stream on a transmitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEndpoint {
    pub stream_type: StreamType,
    pub index: u32,
    pub address: String,
    pub enabled: bool,
    pub state: String,
}

impl StreamEndpoint {
    pub fn is_streaming(&self) -> bool {
        self.state == STATE_STREAMING
    }

    /// Whether the stream has a real multicast address.
    pub fn is_assigned(&self) -> bool {
        !self.address.is_empty() && self.address != UNASSIGNED_ADDRESS
    }
}

/// Incoming multicast binding on a receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionEndpoint {
    pub stream_type: StreamType,
    pub index: u32,
    pub address: String,
    pub enabled: bool,
    pub state: String,
    /// Transmitter whose stream carries `address`, when one is known.
    pub source_device_id: Option<String>,
    pub source_device_name: Option<String>,
}

impl SubscriptionEndpoint {
    pub fn is_streaming(&self) -> bool {
        self.state == STATE_STREAMING
    }
}
