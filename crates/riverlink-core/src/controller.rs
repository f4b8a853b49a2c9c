// ── Controller abstraction ──
//
// Full lifecycle management for one BlueRiver API server: connection,
// background topology refresh, and the routing/display workflows layered
// over the protocol client.

use std::sync::Arc;
use std::time::Duration;

use riverlink_api::protocol::STATE_STOPPED;
use riverlink_api::{BlueRiverClient, StreamType, VideoMode};
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{PresetStatus, Receiver, Topology, Transmitter};
use crate::presets::{self, ResolutionPreset};
use crate::store::TopologyStore;
use crate::stream::TopologyStream;

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Reads come from the
/// topology store; every mutation goes through the protocol client, whose
/// session lock serializes it against the background refresh.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: BlueRiverClient,
    store: TopologyStore,
    connection_state: watch::Sender<ConnectionState>,
    tasks: Mutex<BackgroundTasks>,
}

struct BackgroundTasks {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Controller {
    /// Create a controller. Does NOT connect; call [`connect()`](Self::connect).
    pub fn new(config: ControllerConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(ControllerInner {
                client: BlueRiverClient::new(config.client.clone()),
                config,
                store: TopologyStore::new(),
                connection_state,
                tasks: Mutex::new(BackgroundTasks {
                    cancel: CancellationToken::new(),
                    handles: Vec::new(),
                }),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &TopologyStore {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Connect, load the first topology, and start the refresh task.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.set_state(ConnectionState::Connecting);

        let client_config = &self.inner.config.client;
        match self.inner.client.connect().await {
            Ok(true) => {}
            Ok(false) => {
                self.set_state(ConnectionState::Failed);
                return Err(CoreError::HandshakeRejected {
                    host: client_config.host.clone(),
                    port: client_config.port,
                    api: client_config.api_name.clone(),
                    version: client_config.api_version.clone(),
                });
            }
            Err(e) => {
                self.set_state(ConnectionState::Failed);
                return Err(e.into());
            }
        }

        if let Err(e) = self.refresh().await {
            self.set_state(ConnectionState::Failed);
            return Err(e);
        }

        let interval = self.inner.config.scan_interval;
        if !interval.is_zero() {
            let mut tasks = self.inner.tasks.lock().await;
            if tasks.handles.is_empty() {
                let ctrl = self.clone();
                let cancel = tasks.cancel.clone();
                tasks
                    .handles
                    .push(tokio::spawn(refresh_task(ctrl, interval, cancel)));
            }
        }

        self.set_state(ConnectionState::Connected);
        info!(
            host = %client_config.host,
            port = client_config.port,
            "connected to BlueRiver API"
        );
        Ok(())
    }

    /// Stop background tasks and close the session.
    pub async fn disconnect(&self) {
        {
            let mut tasks = self.inner.tasks.lock().await;
            tasks.cancel.cancel();
            for handle in tasks.handles.drain(..) {
                let _ = handle.await;
            }
            tasks.cancel = CancellationToken::new();
        }

        self.inner.client.disconnect().await;
        self.set_state(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Fetch every device and replace the topology.
    pub async fn refresh(&self) -> Result<Arc<Topology>, CoreError> {
        let devices = self.inner.client.get_all_devices().await?;
        let topology = self.inner.store.apply_snapshot(&devices);
        debug!(
            receivers = topology.receivers.len(),
            transmitters = topology.transmitters.len(),
            "topology refresh complete"
        );
        Ok(topology)
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// For single CLI invocations: the periodic refresh is disabled.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.scan_interval = Duration::ZERO;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn topology(&self) -> Arc<Topology> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> TopologyStream {
        self.inner.store.subscribe()
    }

    /// Look up a receiver by device id or name.
    pub fn receiver(&self, identifier: &str) -> Result<Receiver, CoreError> {
        self.topology()
            .find_receiver(identifier)
            .cloned()
            .ok_or_else(|| CoreError::ReceiverNotFound {
                identifier: identifier.to_string(),
            })
    }

    /// Look up a transmitter by device id or name.
    pub fn transmitter(&self, identifier: &str) -> Result<Transmitter, CoreError> {
        self.topology()
            .find_transmitter(identifier)
            .cloned()
            .ok_or_else(|| CoreError::TransmitterNotFound {
                identifier: identifier.to_string(),
            })
    }

    // ── Routing ──────────────────────────────────────────────────────

    /// Route a transmitter's HDMI video and audio to a receiver.
    ///
    /// A stopped HDMI:0 stream is started first. Audio follows video as a
    /// second verified join; if it fails the video route stays in place and
    /// [`CoreError::AudioFollowFailed`] is returned.
    pub async fn select_source(&self, receiver: &str, transmitter: &str) -> Result<(), CoreError> {
        let rx = self.receiver(receiver)?;
        let tx = self.transmitter(transmitter)?;
        let (rx_id, tx_id) = (rx.info.device_id.as_str(), tx.info.device_id.as_str());
        let client = &self.inner.client;

        let stopped = tx
            .stream(&StreamType::Hdmi, 0)
            .is_some_and(|s| s.state == STATE_STOPPED);
        if stopped {
            info!(tx = tx_id, "starting stopped HDMI stream before join");
            if let Err(e) = client.start_stream(tx_id, &StreamType::Hdmi, 0).await {
                warn!(tx = tx_id, error = %e, "failed to start stream, joining anyway");
            }
        }

        client.join(tx_id, rx_id, &StreamType::Hdmi, 0, 0).await?;
        if let Err(e) = client.join(tx_id, rx_id, &StreamType::HdmiAudio, 0, 0).await {
            error!(tx = tx_id, rx = rx_id, error = %e, "audio did not follow video");
            return Err(CoreError::AudioFollowFailed {
                receiver: rx.info.name.clone(),
                transmitter: tx.info.name.clone(),
                reason: CoreError::from(e).to_string(),
            });
        }
        info!(tx = tx_id, rx = rx_id, "route set");

        self.refresh().await?;
        Ok(())
    }

    /// Leave the receiver's HDMI video and audio subscriptions.
    ///
    /// The topology is not refreshed; the next poll observes the change.
    pub async fn clear_source(&self, receiver: &str) -> Result<(), CoreError> {
        let rx = self.receiver(receiver)?;
        let rx_id = rx.info.device_id.as_str();
        let client = &self.inner.client;

        client.leave(rx_id, &StreamType::Hdmi, 0).await?;
        client.leave(rx_id, &StreamType::HdmiAudio, 0).await?;
        info!(rx = rx_id, "route cleared");
        Ok(())
    }

    // ── Display ──────────────────────────────────────────────────────

    /// Switch a receiver's output mode.
    ///
    /// Scaling modes use the pending preset when one was chosen in genlock,
    /// consuming it, and otherwise keep the frame buffer's current resolution.
    pub async fn set_display_mode(&self, receiver: &str, mode: VideoMode) -> Result<(), CoreError> {
        self.switch_mode(receiver, mode, None).await
    }

    /// Switch to a scaling mode at a given preset in one command.
    ///
    /// The preset replaces any pending one. Genlock ignores resolution, so
    /// pairing it with a preset is rejected before anything is sent.
    pub async fn set_display_mode_with_preset(
        &self,
        receiver: &str,
        mode: VideoMode,
        preset: &str,
    ) -> Result<(), CoreError> {
        let preset = presets::find(preset).ok_or_else(|| CoreError::UnknownPreset {
            preset: preset.to_string(),
        })?;
        if !mode.uses_resolution() {
            return Err(CoreError::ValidationFailed {
                message: format!("{mode} ignores resolution; '{}' needs a scaling mode", preset.name),
            });
        }
        self.switch_mode(receiver, mode, Some(preset)).await
    }

    async fn switch_mode(
        &self,
        receiver: &str,
        mode: VideoMode,
        preset: Option<&'static ResolutionPreset>,
    ) -> Result<(), CoreError> {
        let rx = self.receiver(receiver)?;
        let rx_id = rx.info.device_id.as_str();

        let chosen = match (preset, rx.display.pending_preset.as_deref()) {
            (Some(preset), _) => Some(preset),
            (None, Some(name)) if mode.uses_resolution() => Some(
                presets::find(name).ok_or_else(|| CoreError::UnknownPreset {
                    preset: name.to_string(),
                })?,
            ),
            (None, _) => None,
        };
        let resolution = mode
            .uses_resolution()
            .then(|| chosen.map_or(rx.display.resolution(), |p| p.resolution));

        self.inner
            .client
            .set_video_mode(rx_id, mode, resolution)
            .await?;
        if chosen.is_some() {
            self.inner.store.take_pending_preset(rx_id);
        }
        info!(rx = rx_id, %mode, "display mode changed");

        self.refresh().await?;
        Ok(())
    }

    /// Choose a resolution preset for a receiver.
    ///
    /// Applied immediately in scaling modes; in genlock it is recorded as
    /// pending until the next switch to a scaling mode.
    pub async fn set_resolution_preset(
        &self,
        receiver: &str,
        preset: &str,
    ) -> Result<PresetStatus, CoreError> {
        let preset = presets::find(preset).ok_or_else(|| CoreError::UnknownPreset {
            preset: preset.to_string(),
        })?;
        let rx = self.receiver(receiver)?;
        let rx_id = rx.info.device_id.as_str();
        let mode = rx.display.mode;

        if mode.uses_resolution() {
            self.inner
                .client
                .set_video_mode(rx_id, mode, Some(preset.resolution))
                .await?;
            info!(rx = rx_id, preset = preset.name, "resolution applied");
            self.refresh().await?;
            Ok(PresetStatus::Applied)
        } else {
            if !self.inner.store.stage_pending_preset(rx_id, preset.name) {
                return Err(CoreError::ReceiverNotFound {
                    identifier: receiver.to_string(),
                });
            }
            info!(
                rx = rx_id,
                preset = preset.name,
                "pending resolution set, applies when leaving genlock"
            );
            Ok(PresetStatus::Pending)
        }
    }

    // ── Stream control ───────────────────────────────────────────────

    pub async fn start_stream(
        &self,
        transmitter: &str,
        stream_type: &StreamType,
        index: u32,
    ) -> Result<(), CoreError> {
        let tx = self.transmitter(transmitter)?;
        self.inner
            .client
            .start_stream(&tx.info.device_id, stream_type, index)
            .await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn stop_stream(
        &self,
        transmitter: &str,
        stream_type: &StreamType,
        index: u32,
    ) -> Result<(), CoreError> {
        let tx = self.transmitter(transmitter)?;
        self.inner
            .client
            .stop_stream(&tx.info.device_id, stream_type, index)
            .await?;
        self.refresh().await?;
        Ok(())
    }

    // ── Ad-hoc queries ───────────────────────────────────────────────

    /// Full `get <id> device` body, for devices in or out of the topology.
    pub async fn device_state(&self, device_id: &str) -> Result<Value, CoreError> {
        Ok(self.inner.client.get_device_state(device_id).await?)
    }

    /// Run a raw command line and return the terminal response body,
    /// including ERROR responses.
    pub async fn execute_raw(&self, line: &str) -> Result<Value, CoreError> {
        Ok(self.inner.client.execute_raw(line).await?.body)
    }

    fn set_state(&self, state: ConnectionState) {
        self.inner.connection_state.send_replace(state);
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodically refresh the topology.
async fn refresh_task(controller: Controller, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = controller.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
