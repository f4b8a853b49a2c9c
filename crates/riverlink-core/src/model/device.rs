// ── Device domain types ──

use serde::{Deserialize, Serialize};

/// Which side of the matrix a device sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Receiver,
    Transmitter,
}

/// Identity and health common to receivers and transmitters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: String,
    /// Configured name, or the device id when none is set.
    pub name: String,
    pub ip_address: Option<String>,
    pub active: bool,
    /// Degrees Celsius.
    pub temperature: Option<f64>,
    pub firmware_version: String,
    pub firmware_comment: String,
    pub role: Role,
}

impl DeviceInfo {
    /// Matches either the device id or the configured name.
    pub fn is_named(&self, identifier: &str) -> bool {
        self.device_id == identifier || self.name == identifier
    }
}
