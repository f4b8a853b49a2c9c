// ── Display mode and signal metadata ──

use std::str::FromStr;

use riverlink_api::{Resolution, VideoMode};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Parse a display mode name such as `fastswitch_crop`.
pub fn parse_display_mode(name: &str) -> Result<VideoMode, CoreError> {
    VideoMode::from_str(name.trim()).map_err(|_| CoreError::UnknownDisplayMode {
        mode: name.to_string(),
    })
}

/// How a receiver's resolution preset relates to what is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PresetStatus {
    /// Chosen while in genlock; applied on the next switch to a scaling mode.
    Pending,
    /// The current mode scales to this resolution.
    Applied,
    /// Configured on the frame buffer but unused in genlock.
    Stored,
}

/// Receiver output pipeline as detected from its node graph.
///
/// `resolution_applies` is always `mode != genlock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayModeState {
    pub mode: VideoMode,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Preset matching the frame-buffer resolution, or `Custom`.
    pub resolution_preset: String,
    pub resolution_applies: bool,
    /// Preset picked while in genlock, waiting to be applied.
    pub pending_preset: Option<String>,
}

impl DisplayModeState {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height, self.fps)
    }

    pub fn preset_status(&self) -> PresetStatus {
        if self.mode == VideoMode::Genlock && self.pending_preset.is_some() {
            PresetStatus::Pending
        } else if self.resolution_applies {
            PresetStatus::Applied
        } else {
            PresetStatus::Stored
        }
    }

    /// The preset a user would consider selected: the pending one in
    /// genlock, otherwise the detected one.
    pub fn effective_preset(&self) -> &str {
        match (&self.pending_preset, self.mode) {
            (Some(pending), VideoMode::Genlock) => pending,
            _ => &self.resolution_preset,
        }
    }
}

/// Video timing and protection reported by an HDMI node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSignal {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub color_space: Option<String>,
    pub bits_per_pixel: Option<u32>,
    pub scan_mode: Option<String>,
    pub hdcp_protected: Option<bool>,
    pub hdcp_version: Option<String>,
}

impl VideoSignal {
    /// `1920x1080 @ 60Hz` when timing is known.
    pub fn timing(&self) -> Option<String> {
        match (self.width, self.height, self.fps) {
            (Some(w), Some(h), Some(f)) => Some(Resolution::new(w, h, f).to_string()),
            (Some(w), Some(h), None) => Some(format!("{w}x{h}")),
            _ => None,
        }
    }
}
