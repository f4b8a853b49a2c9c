// ── Wire protocol vocabulary ──
//
// Outbound traffic is one text line per command; inbound traffic is one
// JSON document per line sent. Everything here is pure: rendering command
// lines and classifying response documents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::Error;

/// Subscription/stream state reported while media is flowing.
pub const STATE_STREAMING: &str = "STREAMING";
pub const STATE_STOPPED: &str = "STOPPED";

/// Multicast address the server reports for an unassigned stream.
pub const UNASSIGNED_ADDRESS: &str = "0.0.0.0";

// ── Response classification ──────────────────────────────────────────

/// Top-level `status` of a response document.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Error,
    Processing,
    #[strum(default)]
    Other(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Processing => "PROCESSING",
            Self::Other(raw) => raw,
        })
    }
}

/// Server-assigned handle for a long-running command.
///
/// The server sends it as a number, but only ever echoes it back, so it is
/// kept as text to avoid caring about width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A classified response document.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    pub request_id: Option<RequestId>,
    /// The full document as received.
    pub body: Value,
}

impl Response {
    pub fn from_value(body: Value) -> Self {
        let status = match body.get("status") {
            Some(Value::String(s)) => Status::from_str(s).unwrap_or(Status::Other(s.clone())),
            Some(other) => Status::Other(other.to_string()),
            None => Status::Other("<missing>".into()),
        };
        let request_id = body.get("request_id").and_then(RequestId::from_value);
        Self {
            status,
            request_id,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// `error.message` of an ERROR response.
    pub fn error_message(&self) -> &str {
        self.body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
    }

    /// `result` payload of a SUCCESS response (`null` when absent).
    pub fn result(&self) -> &Value {
        self.body.get("result").unwrap_or(&Value::Null)
    }

    /// Require SUCCESS, turning ERROR into [`Error::Api`] prefixed with `context`.
    pub fn into_success(self, context: &str) -> Result<Self, Error> {
        match self.status {
            Status::Success => Ok(self),
            Status::Error => Err(Error::Api {
                message: format!("{context}: {}", self.error_message()),
            }),
            Status::Processing => Err(Error::Unexpected {
                message: format!("{context}: unresolved PROCESSING response"),
            }),
            Status::Other(status) => Err(Error::UnknownStatus { status }),
        }
    }
}

// ── Stream addressing ────────────────────────────────────────────────

/// Media stream kinds the protocol addresses by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamType {
    Hdmi,
    HdmiAudio,
    Audio,
    StereoAudio,
    MultichAudio,
    #[strum(default)]
    Other(String),
}

impl StreamType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hdmi => "HDMI",
            Self::HdmiAudio => "HDMI_AUDIO",
            Self::Audio => "AUDIO",
            Self::StereoAudio => "STEREO_AUDIO",
            Self::MultichAudio => "MULTICH_AUDIO",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StreamType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StreamType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_str(&raw).unwrap_or(Self::Other(raw)))
    }
}

/// `<deviceId>:<type>:<index>` as used by join/leave/start/stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRef<'a> {
    pub device_id: &'a str,
    pub stream_type: &'a StreamType,
    pub index: u32,
}

impl<'a> StreamRef<'a> {
    pub fn new(device_id: &'a str, stream_type: &'a StreamType, index: u32) -> Self {
        Self {
            device_id,
            stream_type,
            index,
        }
    }
}

impl fmt::Display for StreamRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.device_id, self.stream_type, self.index)
    }
}

// ── Video modes ──────────────────────────────────────────────────────

/// Receiver output pipeline mode.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VideoMode {
    /// Zero-buffer passthrough; output timing follows the source.
    #[default]
    Genlock,
    GenlockScaling,
    Fastswitch,
    FastswitchStretch,
    FastswitchCrop,
}

impl VideoMode {
    /// Whether the mode runs through the frame buffer at a chosen resolution.
    pub fn uses_resolution(self) -> bool {
        self != Self::Genlock
    }

    fn wire_keyword(self) -> &'static str {
        match self {
            Self::Genlock => "genlock",
            Self::GenlockScaling => "genlock_scaling",
            Self::Fastswitch => "fastswitch",
            Self::FastswitchStretch => "fastswitch stretch",
            Self::FastswitchCrop => "fastswitch crop",
        }
    }
}

/// Output resolution and refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32, fps: u32) -> Self {
        Self { width, height, fps }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ {}Hz", self.width, self.height, self.fps)
    }
}

// ── Command lines ────────────────────────────────────────────────────

/// One outbound command. `Display` renders the line without its newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireCommand<'a> {
    Require { api: &'a str, version: &'a str },
    GetAllDevices,
    GetDevice(&'a str),
    Join { source: StreamRef<'a>, sink: StreamRef<'a> },
    Leave(StreamRef<'a>),
    Start(StreamRef<'a>),
    Stop(StreamRef<'a>),
    SetVideo {
        device_id: &'a str,
        mode: VideoMode,
        resolution: Option<Resolution>,
    },
    Request(&'a RequestId),
}

impl<'a> WireCommand<'a> {
    /// Build a `set <id> video ...` line, rejecting scaling modes without a resolution.
    ///
    /// Genlock ignores any resolution passed.
    pub fn set_video(
        device_id: &'a str,
        mode: VideoMode,
        resolution: Option<Resolution>,
    ) -> Result<Self, Error> {
        let resolution = if mode.uses_resolution() {
            Some(resolution.ok_or_else(|| Error::InvalidArgument {
                message: "Scaling modes (genlock_scaling, fastswitch) require width, height, and fps"
                    .into(),
            })?)
        } else {
            None
        };
        Ok(Self::SetVideo {
            device_id,
            mode,
            resolution,
        })
    }
}

impl fmt::Display for WireCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Require { api, version } => write!(f, "require {api} {version}"),
            Self::GetAllDevices => f.write_str("get all device"),
            Self::GetDevice(id) => write!(f, "get {id} device"),
            Self::Join { source, sink } => write!(f, "join {source} {sink}"),
            Self::Leave(target) => write!(f, "leave {target}"),
            Self::Start(target) => write!(f, "start {target}"),
            Self::Stop(target) => write!(f, "stop {target}"),
            Self::SetVideo {
                device_id,
                mode,
                resolution,
            } => {
                write!(f, "set {device_id} video {}", mode.wire_keyword())?;
                if let Some(r) = resolution {
                    write!(f, " size {} {} fps {}", r.width, r.height, r.fps)?;
                }
                Ok(())
            }
            Self::Request(id) => write!(f, "request {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_every_command_line() {
        let hdmi = StreamType::Hdmi;
        let tx = StreamRef::new("d8:80:39:aa:00:01", &hdmi, 0);
        let rx = StreamRef::new("d8:80:39:bb:00:02", &hdmi, 0);
        let rid = RequestId("17".into());

        let cases = [
            (
                WireCommand::Require {
                    api: "blueriver_api",
                    version: "2.13.0.0",
                },
                "require blueriver_api 2.13.0.0",
            ),
            (WireCommand::GetAllDevices, "get all device"),
            (WireCommand::GetDevice("rx1"), "get rx1 device"),
            (
                WireCommand::Join { source: tx, sink: rx },
                "join d8:80:39:aa:00:01:HDMI:0 d8:80:39:bb:00:02:HDMI:0",
            ),
            (WireCommand::Leave(rx), "leave d8:80:39:bb:00:02:HDMI:0"),
            (WireCommand::Start(tx), "start d8:80:39:aa:00:01:HDMI:0"),
            (WireCommand::Stop(tx), "stop d8:80:39:aa:00:01:HDMI:0"),
            (WireCommand::Request(&rid), "request 17"),
        ];
        for (cmd, line) in cases {
            assert_eq!(cmd.to_string(), line);
        }
    }

    #[test]
    fn set_video_renders_mode_variants() {
        let r = Some(Resolution::new(1920, 1080, 60));
        let line = |mode| WireCommand::set_video("rx", mode, r).unwrap().to_string();

        assert_eq!(line(VideoMode::Genlock), "set rx video genlock");
        assert_eq!(
            line(VideoMode::GenlockScaling),
            "set rx video genlock_scaling size 1920 1080 fps 60"
        );
        assert_eq!(line(VideoMode::Fastswitch), "set rx video fastswitch size 1920 1080 fps 60");
        assert_eq!(
            line(VideoMode::FastswitchStretch),
            "set rx video fastswitch stretch size 1920 1080 fps 60"
        );
        assert_eq!(
            line(VideoMode::FastswitchCrop),
            "set rx video fastswitch crop size 1920 1080 fps 60"
        );
    }

    #[test]
    fn scaling_modes_require_a_resolution() {
        let err = WireCommand::set_video("rx", VideoMode::FastswitchCrop, None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(WireCommand::set_video("rx", VideoMode::Genlock, None).is_ok());
    }

    #[test]
    fn classifies_response_documents() {
        let r = Response::from_value(json!({"status":"PROCESSING","request_id":42}));
        assert_eq!(r.status, Status::Processing);
        assert_eq!(r.request_id.unwrap().to_string(), "42");

        let r = Response::from_value(json!({"status":"ERROR","error":{"message":"no such device"}}));
        assert_eq!(r.error_message(), "no such device");
        let err = r.into_success("Failed to get devices").unwrap_err();
        assert_eq!(err.to_string(), "Failed to get devices: no such device");

        let r = Response::from_value(json!({"status":"MAYBE"}));
        assert_eq!(r.status, Status::Other("MAYBE".into()));
    }

    #[test]
    fn stream_types_round_trip_through_names() {
        assert_eq!(StreamType::HdmiAudio.to_string(), "HDMI_AUDIO");
        assert_eq!("MULTICH_AUDIO".parse::<StreamType>().unwrap(), StreamType::MultichAudio);
        assert_eq!("USB".parse::<StreamType>().unwrap(), StreamType::Other("USB".into()));
        assert_eq!("fastswitch_crop".parse::<VideoMode>().unwrap(), VideoMode::FastswitchCrop);
    }
}
