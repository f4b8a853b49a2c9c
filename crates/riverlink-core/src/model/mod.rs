// ── Domain model ──
//
// Canonical types rebuilt from every device snapshot.

mod device;
mod display;
mod stream;
mod topology;

pub use device::{DeviceInfo, Role};
pub use display::{DisplayModeState, PresetStatus, VideoSignal, parse_display_mode};
pub use stream::{StreamEndpoint, SubscriptionEndpoint};
pub use topology::{Receiver, Topology, Transmitter};
