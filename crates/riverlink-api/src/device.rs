// ── Raw device documents ──
//
// Shapes of the `result.devices[]` entries returned by `get ... device`.
// Firmware revisions disagree on which fields exist and occasionally on
// their JSON types, so every field is optional and a field of the wrong
// type reads as absent instead of failing the whole snapshot.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::protocol::{STATE_STREAMING, StreamType};

pub const NODE_HDMI_ENCODER: &str = "HDMI_ENCODER";
pub const NODE_HDMI_DECODER: &str = "HDMI_DECODER";
pub const NODE_FRAME_BUFFER: &str = "FRAME_BUFFER";
pub const NODE_NETWORK_INTERFACE: &str = "NETWORK_INTERFACE";

// ── Lenient field helpers ────────────────────────────────────────────

fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(de)?;
    Ok(serde_json::from_value(value).ok())
}

fn or_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(de)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keep the well-formed elements of an array, drop the rest.
fn lenient_vec<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(de)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

// ── Device ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDevice {
    #[serde(default, deserialize_with = "lenient")]
    pub device_id: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub identity: Identity,
    #[serde(default, deserialize_with = "or_default")]
    pub configuration: DeviceConfiguration,
    #[serde(default, deserialize_with = "or_default")]
    pub status: DeviceStatus,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub nodes: Vec<Node>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub streams: Vec<RawStream>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub subscriptions: Vec<RawStream>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, deserialize_with = "lenient")]
    pub is_transmitter: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_receiver: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub firmware_version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub firmware_comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfiguration {
    #[serde(default, deserialize_with = "lenient")]
    pub device_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature: Option<f64>,
}

impl RawDevice {
    pub fn is_transmitter(&self) -> bool {
        self.identity.is_transmitter.unwrap_or(false)
    }

    pub fn is_receiver(&self) -> bool {
        self.identity.is_receiver.unwrap_or(false)
    }

    /// First node of the given type, any index.
    pub fn node(&self, node_type: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is(node_type))
    }

    /// Node of the given type at a specific index.
    pub fn node_at(&self, node_type: &str, index: u32) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.is(node_type) && n.index == Some(index))
    }

    /// Subscription of the given type and index.
    pub fn subscription(&self, stream_type: &StreamType, index: u32) -> Option<&RawStream> {
        self.subscriptions
            .iter()
            .find(|s| s.stream_type.as_ref() == Some(stream_type) && s.index() == index)
    }

    /// Stream of the given type and index.
    pub fn stream(&self, stream_type: &StreamType, index: u32) -> Option<&RawStream> {
        self.streams
            .iter()
            .find(|s| s.stream_type.as_ref() == Some(stream_type) && s.index() == index)
    }
}

// ── Nodes ────────────────────────────────────────────────────────────

/// An internal processing block (encoder, decoder, frame buffer, NIC, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub node_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub index: Option<u32>,
    #[serde(default, deserialize_with = "or_default")]
    pub configuration: NodeConfiguration,
    #[serde(default, deserialize_with = "or_default")]
    pub status: NodeStatus,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub inputs: Vec<NodeInput>,
}

impl Node {
    pub fn is(&self, node_type: &str) -> bool {
        self.node_type.as_deref() == Some(node_type)
    }

    pub fn input(&self, name: &str) -> Option<&NodeInput> {
        self.inputs.iter().find(|i| i.name.as_deref() == Some(name))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfiguration {
    #[serde(default, deserialize_with = "lenient")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub frames_per_second: Option<u32>,
    /// Frame buffer sub-mode, e.g. `FAST_SWITCHED_CROP`.
    #[serde(default, deserialize_with = "lenient")]
    pub display_mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub ip: Option<IpStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub video: Option<VideoStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub hdcp_protected: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub hdcp_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub frames_per_second: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub color_space: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bits_per_pixel: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub scan_mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeInput {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub status: NodeInputStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeInputStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub source: Option<SourceRef>,
}

/// What feeds a node input: another node, or a subscription directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(default, deserialize_with = "lenient")]
    pub ref_class: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ref_type: Option<String>,
}

// ── Streams & subscriptions ──────────────────────────────────────────

/// Transmitter stream or receiver subscription; both share this shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStream {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub stream_type: Option<StreamType>,
    #[serde(default, deserialize_with = "lenient")]
    pub index: Option<u32>,
    #[serde(default, deserialize_with = "or_default")]
    pub configuration: StreamConfiguration,
    #[serde(default, deserialize_with = "or_default")]
    pub status: StreamStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamConfiguration {
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub enable: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
}

impl RawStream {
    pub fn index(&self) -> u32 {
        self.index.unwrap_or(0)
    }

    pub fn is_streaming(&self) -> bool {
        self.status.state.as_deref() == Some(STATE_STREAMING)
    }
}

// ── Envelope ─────────────────────────────────────────────────────────

/// Extract `result.devices[]` from a SUCCESS response body.
///
/// A missing or non-array `devices` reads as an empty list; individual
/// malformed entries are skipped.
pub fn devices_from_result(result: &Value) -> Vec<RawDevice> {
    let Some(Value::Array(items)) = result.get("devices") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match RawDevice::deserialize(item) {
            Ok(device) => Some(device),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed device entry");
                None
            }
        })
        .collect()
}
