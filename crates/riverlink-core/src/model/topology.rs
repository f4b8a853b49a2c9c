// ── Receiver / transmitter graph ──

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use riverlink_api::StreamType;
use serde::{Deserialize, Serialize};

use super::device::DeviceInfo;
use super::display::{DisplayModeState, VideoSignal};
use super::stream::{StreamEndpoint, SubscriptionEndpoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    #[serde(flatten)]
    pub info: DeviceInfo,
    pub subscriptions: Vec<SubscriptionEndpoint>,
    pub display: DisplayModeState,
    /// Signal leaving the receiver's HDMI output.
    pub video: Option<VideoSignal>,
}

impl Receiver {
    pub fn subscription(&self, stream_type: &StreamType, index: u32) -> Option<&SubscriptionEndpoint> {
        self.subscriptions
            .iter()
            .find(|s| &s.stream_type == stream_type && s.index == index)
    }

    /// The HDMI:0 subscription, which decides what the screen shows.
    pub fn video_source(&self) -> Option<&SubscriptionEndpoint> {
        self.subscription(&StreamType::Hdmi, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmitter {
    #[serde(flatten)]
    pub info: DeviceInfo,
    pub streams: Vec<StreamEndpoint>,
    /// Signal arriving on the transmitter's HDMI input.
    pub input: Option<VideoSignal>,
}

impl Transmitter {
    pub fn stream(&self, stream_type: &StreamType, index: u32) -> Option<&StreamEndpoint> {
        self.streams
            .iter()
            .find(|s| &s.stream_type == stream_type && s.index == index)
    }
}

/// One fully recomputed view of the matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub receivers: BTreeMap<String, Receiver>,
    pub transmitters: BTreeMap<String, Transmitter>,
    /// Multicast address to transmitter device id.
    pub stream_map: BTreeMap<String, String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Topology {
    /// Find a receiver by device id, falling back to its name.
    pub fn find_receiver(&self, identifier: &str) -> Option<&Receiver> {
        self.receivers.get(identifier).or_else(|| {
            self.receivers
                .values()
                .find(|r| r.info.is_named(identifier))
        })
    }

    /// Find a transmitter by device id, falling back to its name.
    pub fn find_transmitter(&self, identifier: &str) -> Option<&Transmitter> {
        self.transmitters.get(identifier).or_else(|| {
            self.transmitters
                .values()
                .find(|t| t.info.is_named(identifier))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty() && self.transmitters.is_empty()
    }
}
