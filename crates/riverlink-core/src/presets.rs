// ── Resolution presets ──
//
// Named output formats offered for receivers in frame-buffer modes.
// Matching is exact on (width, height, fps); table order decides ties.

use riverlink_api::Resolution;
use serde::Serialize;

/// Label for a resolution that matches no preset.
pub const CUSTOM_PRESET: &str = "Custom";

pub const DEFAULT_PRESET: &str = "1080p @ 60Hz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PresetCategory {
    /// Broadcast and consumer video formats.
    Broadcast,
    /// VESA computer monitor formats.
    Monitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionPreset {
    pub name: &'static str,
    pub category: PresetCategory,
    #[serde(flatten)]
    pub resolution: Resolution,
}

const fn broadcast(name: &'static str, width: u32, height: u32, fps: u32) -> ResolutionPreset {
    ResolutionPreset {
        name,
        category: PresetCategory::Broadcast,
        resolution: Resolution::new(width, height, fps),
    }
}

const fn monitor(name: &'static str, width: u32, height: u32) -> ResolutionPreset {
    ResolutionPreset {
        name,
        category: PresetCategory::Monitor,
        resolution: Resolution::new(width, height, 60),
    }
}

pub static PRESETS: [ResolutionPreset; 24] = [
    broadcast("720p @ 60Hz", 1280, 720, 60),
    broadcast("720p @ 50Hz", 1280, 720, 50),
    broadcast("1080p @ 60Hz", 1920, 1080, 60),
    broadcast("1080p @ 50Hz", 1920, 1080, 50),
    broadcast("1080p @ 30Hz", 1920, 1080, 30),
    broadcast("1080p @ 25Hz", 1920, 1080, 25),
    broadcast("1080p @ 24Hz", 1920, 1080, 24),
    broadcast("4K UHD @ 60Hz", 3840, 2160, 60),
    broadcast("4K UHD @ 50Hz", 3840, 2160, 50),
    broadcast("4K UHD @ 30Hz", 3840, 2160, 30),
    broadcast("4K UHD @ 25Hz", 3840, 2160, 25),
    broadcast("4K UHD @ 24Hz", 3840, 2160, 24),
    broadcast("4K Cinema @ 60Hz", 4096, 2160, 60),
    broadcast("4K Cinema @ 30Hz", 4096, 2160, 30),
    broadcast("4K Cinema @ 24Hz", 4096, 2160, 24),
    monitor("1024×768 @ 60Hz", 1024, 768),
    monitor("1280×768 @ 60Hz", 1280, 768),
    monitor("1280×960 @ 60Hz", 1280, 960),
    monitor("1280×1024 @ 60Hz", 1280, 1024),
    monitor("1360×768 @ 60Hz", 1360, 768),
    monitor("1400×1050 @ 60Hz", 1400, 1050),
    monitor("1600×1200 @ 60Hz", 1600, 1200),
    monitor("1680×1050 @ 60Hz", 1680, 1050),
    monitor("1920×1200 @ 60Hz", 1920, 1200),
];

/// Look up a preset by name.
///
/// Case-insensitive, and an ASCII `x` stands in for `×` so monitor
/// presets can be typed on a plain keyboard.
pub fn find(name: &str) -> Option<&'static ResolutionPreset> {
    let wanted = normalize(name);
    PRESETS.iter().find(|p| normalize(p.name) == wanted)
}

/// Name of the first preset matching `resolution`, or [`CUSTOM_PRESET`].
pub fn match_resolution(resolution: Resolution) -> &'static str {
    PRESETS
        .iter()
        .find(|p| p.resolution == resolution)
        .map_or(CUSTOM_PRESET, |p| p.name)
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace('×', "x")
}
