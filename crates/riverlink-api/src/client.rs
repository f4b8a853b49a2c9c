// ── BlueRiver client ──
//
// Public operations over one session. A single async mutex around the
// session is the concurrency guard: it is held from the first write of an
// operation until its terminal response, including PROCESSING polls and
// join/leave verification rounds, so responses can never be paired with
// the wrong command.

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::device::{RawDevice, RawStream, devices_from_result};
use crate::error::Error;
use crate::protocol::{Resolution, Response, StreamRef, StreamType, VideoMode, WireCommand};
use crate::session::Session;
use crate::transport::{ClientConfig, Connector, TcpConnector};
use crate::verify::{Convergence, Probe, converge};

/// Async client for the BlueRiver control API.
///
/// Every operation connects on demand, so a freshly constructed client
/// needs no explicit [`connect`](Self::connect) call.
pub struct BlueRiverClient<C: Connector = TcpConnector> {
    config: ClientConfig,
    session: Mutex<Session<C>>,
}

impl BlueRiverClient<TcpConnector> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> BlueRiverClient<C> {
    pub fn with_connector(config: ClientConfig, connector: C) -> Self {
        Self {
            session: Mutex::new(Session::new(connector, config.clone())),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Connect and handshake, retrying transport failures per the connect policy.
    ///
    /// `Ok(false)` means the server refused the requested API version.
    pub async fn connect(&self) -> Result<bool, Error> {
        self.session.lock().await.connect().await
    }

    /// Close the socket. Never fails.
    pub async fn disconnect(&self) {
        self.session.lock().await.disconnect().await;
    }

    /// Waits for any in-flight operation to finish before answering.
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_connected()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Fetch every device known to the server.
    ///
    /// A communication failure triggers one reconnect-and-retry before
    /// surfacing.
    pub async fn get_all_devices(&self) -> Result<Vec<RawDevice>, Error> {
        let line = WireCommand::GetAllDevices.to_string();
        let mut session = self.session.lock().await;
        session.ensure_ready().await?;

        let response = match session.command(&line).await {
            Err(e) if e.is_communication() => {
                warn!(error = %e, "communication error, reconnecting");
                session.disconnect().await;
                session.ensure_ready().await?;
                session.command(&line).await?
            }
            other => other?,
        };

        let response = response.into_success("Failed to get devices")?;
        let devices = devices_from_result(response.result());
        debug!(count = devices.len(), "fetched devices");
        Ok(devices)
    }

    /// Full `get <id> device` response body for one device.
    pub async fn get_device_state(&self, device_id: &str) -> Result<Value, Error> {
        let mut session = self.session.lock().await;
        session.ensure_ready().await?;
        Ok(device_state(&mut *session, device_id).await?.body)
    }

    // ── Stream routing ───────────────────────────────────────────────

    /// Subscribe `rx_id`'s `stream_type` input to `tx_id`'s stream, then
    /// confirm the subscription reports STREAMING, re-joining as needed.
    pub async fn join(
        &self,
        tx_id: &str,
        rx_id: &str,
        stream_type: &StreamType,
        tx_index: u32,
        rx_index: u32,
    ) -> Result<(), Error> {
        let command = WireCommand::Join {
            source: StreamRef::new(tx_id, stream_type, tx_index),
            sink: StreamRef::new(rx_id, stream_type, rx_index),
        }
        .to_string();

        let mut session = self.session.lock().await;
        session.ensure_ready().await?;

        let mut probe = SubscriptionProbe {
            session: &mut *session,
            command,
            failure_context: "Join failed",
            device_id: rx_id,
            stream_type,
            index: rx_index,
            want_streaming: true,
            last_state: None,
        };
        match converge(&self.config.join, &mut probe).await? {
            Convergence::Converged { attempts } => {
                info!(tx = tx_id, rx = rx_id, %stream_type, attempts, "join verified");
                Ok(())
            }
            Convergence::Exhausted { attempts } => {
                debug!(final_state = ?probe.last_state, "join verification failed");
                error!(rx = rx_id, %stream_type, index = rx_index, attempts, "subscription never reached STREAMING");
                Err(Error::NotStreaming {
                    stream_type: stream_type.to_string(),
                    index: rx_index,
                    device_id: rx_id.to_string(),
                    attempts,
                })
            }
        }
    }

    /// Drop a subscription, then confirm it no longer reports STREAMING.
    pub async fn leave(
        &self,
        device_id: &str,
        stream_type: &StreamType,
        index: u32,
    ) -> Result<(), Error> {
        let command = WireCommand::Leave(StreamRef::new(device_id, stream_type, index)).to_string();

        let mut session = self.session.lock().await;
        session.ensure_ready().await?;

        let mut probe = SubscriptionProbe {
            session: &mut *session,
            command,
            failure_context: "Leave failed",
            device_id,
            stream_type,
            index,
            want_streaming: false,
            last_state: None,
        };
        match converge(&self.config.leave, &mut probe).await? {
            Convergence::Converged { attempts } => {
                info!(rx = device_id, %stream_type, attempts, "leave verified");
                Ok(())
            }
            Convergence::Exhausted { attempts } => {
                debug!(final_state = ?probe.last_state, "leave verification failed");
                error!(rx = device_id, %stream_type, index, attempts, "subscription still STREAMING");
                Err(Error::StillStreaming {
                    stream_type: stream_type.to_string(),
                    index,
                    device_id: device_id.to_string(),
                    attempts,
                })
            }
        }
    }

    // ── Device control ───────────────────────────────────────────────

    /// Switch a receiver's output pipeline.
    ///
    /// Every mode except genlock requires `resolution`; genlock ignores it.
    pub async fn set_video_mode(
        &self,
        device_id: &str,
        mode: VideoMode,
        resolution: Option<Resolution>,
    ) -> Result<(), Error> {
        let command = WireCommand::set_video(device_id, mode, resolution)?.to_string();
        self.run_checked(&command, "Failed to set video mode").await?;
        info!(device_id, %mode, "video mode set");
        Ok(())
    }

    pub async fn start_stream(
        &self,
        device_id: &str,
        stream_type: &StreamType,
        index: u32,
    ) -> Result<(), Error> {
        let command = WireCommand::Start(StreamRef::new(device_id, stream_type, index)).to_string();
        self.run_checked(&command, "Failed to start stream").await?;
        info!(device_id, %stream_type, index, "stream started");
        Ok(())
    }

    pub async fn stop_stream(
        &self,
        device_id: &str,
        stream_type: &StreamType,
        index: u32,
    ) -> Result<(), Error> {
        let command = WireCommand::Stop(StreamRef::new(device_id, stream_type, index)).to_string();
        self.run_checked(&command, "Failed to stop stream").await?;
        info!(device_id, %stream_type, index, "stream stopped");
        Ok(())
    }

    /// Run an arbitrary command line and return its terminal response.
    ///
    /// The response is returned whatever its status; callers decide.
    pub async fn execute_raw(&self, line: &str) -> Result<Response, Error> {
        let line = line.trim();
        if line.is_empty() || line.contains('\n') {
            return Err(Error::InvalidArgument {
                message: "raw command must be a single non-empty line".into(),
            });
        }
        let mut session = self.session.lock().await;
        session.ensure_ready().await?;
        session.command(line).await
    }

    async fn run_checked(&self, line: &str, context: &str) -> Result<Response, Error> {
        let mut session = self.session.lock().await;
        session.ensure_ready().await?;
        session.command(line).await?.into_success(context)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

async fn device_state<C: Connector>(
    session: &mut Session<C>,
    device_id: &str,
) -> Result<Response, Error> {
    session
        .command(&WireCommand::GetDevice(device_id).to_string())
        .await?
        .into_success("Failed to get device state")
}

/// Join or leave one subscription and watch its state.
struct SubscriptionProbe<'a, C: Connector> {
    session: &'a mut Session<C>,
    command: String,
    failure_context: &'static str,
    device_id: &'a str,
    stream_type: &'a StreamType,
    index: u32,
    want_streaming: bool,
    last_state: Option<Value>,
}

impl<C: Connector> Probe for SubscriptionProbe<'_, C> {
    async fn act(&mut self) -> Result<(), Error> {
        self.session
            .command(&self.command)
            .await?
            .into_success(self.failure_context)
            .map(drop)
    }

    async fn converged(&mut self) -> Result<bool, Error> {
        let response = device_state(&mut *self.session, self.device_id).await?;
        let streaming = devices_from_result(response.result())
            .first()
            .and_then(|d| d.subscription(self.stream_type, self.index))
            .is_some_and(RawStream::is_streaming);
        self.last_state = Some(response.body);
        Ok(streaming == self.want_streaming)
    }
}
