// riverlink-api: Async Rust client for the SDVoE BlueRiver TCP control protocol

pub mod backoff;
pub mod client;
mod correlator;
pub mod device;
pub mod error;
pub mod framer;
pub mod protocol;
mod session;
pub mod transport;
mod verify;

pub use backoff::{Backoff, PollPolicy, RetryPolicy};
pub use client::BlueRiverClient;
pub use device::RawDevice;
pub use error::{Error, ErrorKind};
pub use protocol::{Resolution, Response, Status, StreamType, VideoMode};
pub use transport::{ClientConfig, Connector, TcpConnector};
