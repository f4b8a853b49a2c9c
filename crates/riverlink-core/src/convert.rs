// ── Wire → domain conversion ──
//
// Per-device conversions from the lenient `riverlink_api::device` wire
// types. Missing fields take documented defaults instead of failing.

use riverlink_api::device::{
    NODE_FRAME_BUFFER, NODE_HDMI_DECODER, NODE_HDMI_ENCODER, NODE_NETWORK_INTERFACE, Node,
    RawDevice, RawStream,
};
use riverlink_api::protocol::{STATE_STOPPED, UNASSIGNED_ADDRESS};
use riverlink_api::{Resolution, StreamType, VideoMode};

use crate::model::{DeviceInfo, DisplayModeState, Role, StreamEndpoint, SubscriptionEndpoint, VideoSignal};
use crate::presets;

/// Frame-buffer resolution assumed when the node omits it.
pub const DEFAULT_FRAME_BUFFER: Resolution = Resolution::new(1920, 1080, 60);

const ENCODER_MAIN_INPUT: &str = "main";

pub(crate) fn device_info(raw: &RawDevice, device_id: &str, role: Role) -> DeviceInfo {
    DeviceInfo {
        device_id: device_id.to_string(),
        name: raw
            .configuration
            .device_name
            .clone()
            .unwrap_or_else(|| device_id.to_string()),
        ip_address: raw
            .node(NODE_NETWORK_INTERFACE)
            .and_then(|n| n.status.ip.as_ref())
            .and_then(|ip| ip.address.clone()),
        active: raw.status.active.unwrap_or(false),
        temperature: raw.status.temperature,
        firmware_version: raw
            .identity
            .firmware_version
            .clone()
            .unwrap_or_else(|| "unknown".into()),
        firmware_comment: raw.identity.firmware_comment.clone().unwrap_or_default(),
        role,
    }
}

// ── Streams ──────────────────────────────────────────────────────────

struct Endpoint {
    stream_type: StreamType,
    index: u32,
    address: String,
    enabled: bool,
    state: String,
}

fn endpoint(raw: &RawStream) -> Option<Endpoint> {
    Some(Endpoint {
        stream_type: raw.stream_type.clone()?,
        index: raw.index(),
        address: raw
            .configuration
            .address
            .clone()
            .unwrap_or_else(|| UNASSIGNED_ADDRESS.into()),
        enabled: raw.configuration.enable.unwrap_or(false),
        state: raw
            .status
            .state
            .clone()
            .unwrap_or_else(|| STATE_STOPPED.into()),
    })
}

/// Streams without a type cannot be addressed and are dropped.
pub(crate) fn stream_endpoint(raw: &RawStream) -> Option<StreamEndpoint> {
    let e = endpoint(raw)?;
    Some(StreamEndpoint {
        stream_type: e.stream_type,
        index: e.index,
        address: e.address,
        enabled: e.enabled,
        state: e.state,
    })
}

/// Source fields start empty; the topology pass resolves them.
pub(crate) fn subscription_endpoint(raw: &RawStream) -> Option<SubscriptionEndpoint> {
    let e = endpoint(raw)?;
    Some(SubscriptionEndpoint {
        stream_type: e.stream_type,
        index: e.index,
        address: e.address,
        enabled: e.enabled,
        state: e.state,
        source_device_id: None,
        source_device_name: None,
    })
}

// ── Display mode ─────────────────────────────────────────────────────

/// Detect the receiver's output mode from its HDMI encoder's main input.
///
/// A direct HDMI subscription means genlock. A frame-buffer source maps the
/// buffer's `display_mode`, with unknown values read as fastswitch. No
/// encoder, or any other source, reads as genlock.
pub(crate) fn display_mode(raw: &RawDevice) -> DisplayModeState {
    let frame_buffer = raw.node_at(NODE_FRAME_BUFFER, 0);

    let source = output_encoder(raw)
        .and_then(|n| n.input(ENCODER_MAIN_INPUT))
        .and_then(|i| i.status.source.as_ref());

    let mode = match source {
        Some(src) => match (src.ref_class.as_deref(), src.ref_type.as_deref()) {
            (Some("SUBSCRIPTION"), Some("HDMI")) => VideoMode::Genlock,
            (Some("NODE"), Some("FRAME_BUFFER")) => frame_buffer
                .map_or(VideoMode::Genlock, |fb| {
                    frame_buffer_mode(fb.configuration.display_mode.as_deref())
                }),
            _ => VideoMode::Genlock,
        },
        None => VideoMode::Genlock,
    };

    let config = frame_buffer.map(|fb| &fb.configuration);
    let resolution = Resolution::new(
        config.and_then(|c| c.width).unwrap_or(DEFAULT_FRAME_BUFFER.width),
        config.and_then(|c| c.height).unwrap_or(DEFAULT_FRAME_BUFFER.height),
        config
            .and_then(|c| c.frames_per_second)
            .unwrap_or(DEFAULT_FRAME_BUFFER.fps),
    );

    DisplayModeState {
        mode,
        width: resolution.width,
        height: resolution.height,
        fps: resolution.fps,
        resolution_preset: presets::match_resolution(resolution).to_string(),
        resolution_applies: mode.uses_resolution(),
        pending_preset: None,
    }
}

fn frame_buffer_mode(display_mode: Option<&str>) -> VideoMode {
    match display_mode {
        Some("GENLOCK_SCALING") => VideoMode::GenlockScaling,
        Some("FAST_SWITCHED_STRETCH") => VideoMode::FastswitchStretch,
        Some("FAST_SWITCHED_CROP") => VideoMode::FastswitchCrop,
        _ => VideoMode::Fastswitch,
    }
}

// ── Signal metadata ──────────────────────────────────────────────────

/// The receiver's HDMI output encoder: index 0, or the first one listed
/// when none carries that index.
fn output_encoder(raw: &RawDevice) -> Option<&Node> {
    raw.node_at(NODE_HDMI_ENCODER, 0)
        .or_else(|| raw.node(NODE_HDMI_ENCODER))
}

/// Output signal of a receiver.
pub(crate) fn receiver_signal(raw: &RawDevice) -> Option<VideoSignal> {
    output_encoder(raw).map(video_signal)
}

/// Input signal of a transmitter.
pub(crate) fn transmitter_signal(raw: &RawDevice) -> Option<VideoSignal> {
    raw.node_at(NODE_HDMI_DECODER, 0).map(video_signal)
}

fn video_signal(node: &Node) -> VideoSignal {
    let video = node.status.video.as_ref();
    VideoSignal {
        width: video.and_then(|v| v.width),
        height: video.and_then(|v| v.height),
        fps: video.and_then(|v| v.frames_per_second),
        color_space: video.and_then(|v| v.color_space.clone()),
        bits_per_pixel: video.and_then(|v| v.bits_per_pixel),
        scan_mode: video.and_then(|v| v.scan_mode.clone()),
        hdcp_protected: node.status.hdcp_protected,
        hdcp_version: node.status.hdcp_version.clone(),
    }
}
