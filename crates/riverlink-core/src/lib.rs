//! Reactive topology layer between `riverlink-api` and the CLI.
//!
//! This crate owns the domain model, the topology parser, and the
//! workflows that turn user intent into verified protocol operations:
//!
//! - **[`Controller`]**: central facade managing the full lifecycle.
//!   [`connect()`](Controller::connect) performs the handshake, loads the
//!   first topology, then spawns a periodic refresh task.
//!   [`Controller::oneshot()`](Controller::oneshot) is the lightweight mode
//!   for single CLI invocations.
//!
//! - **[`TopologyStore`]**: the latest [`Topology`] behind a
//!   `tokio::sync::watch` channel. Refreshes and pending-preset bookkeeping
//!   both go through the channel's atomic modify.
//!
//! - **[`TopologyStream`]**: subscription handle vended by the store, with
//!   `current()` / `latest()` / `changed()` and a `Stream` adapter.
//!
//! - **Topology parser** ([`parse_snapshot`]): rebuilds receivers,
//!   transmitters, and the multicast address map from one device snapshot.
//!
//! - **Presets** ([`presets`]): the named resolution table.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod presets;
pub mod store;
pub mod stream;
pub mod topology;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ControllerConfig;
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use store::TopologyStore;
pub use stream::TopologyStream;
pub use topology::parse_snapshot;

pub use model::{
    DeviceInfo, DisplayModeState, PresetStatus, Receiver, Role, StreamEndpoint,
    SubscriptionEndpoint, Topology, Transmitter, VideoSignal, parse_display_mode,
};
pub use presets::ResolutionPreset;

// Protocol types that appear in this crate's API.
pub use riverlink_api::{Resolution, StreamType, VideoMode};
