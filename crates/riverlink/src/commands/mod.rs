//! Command dispatch: bridges CLI args -> controller workflows -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod mode;
pub mod preset;
pub mod raw;
pub mod receivers;
pub mod route;
pub mod stream;
pub mod transmitters;
pub mod util;
pub mod watch;

use std::time::Duration;

use riverlink_core::{Controller, ControllerConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a connection-bound command to the appropriate handler.
///
/// `watch` keeps the background refresh running; everything else connects,
/// runs once, and disconnects.
pub async fn dispatch(
    cmd: Command,
    mut config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if matches!(cmd, Command::Watch) {
        return watch::handle(config, global).await;
    }

    config.scan_interval = Duration::ZERO;
    let controller = Controller::new(config);
    controller.connect().await?;

    let result = match cmd {
        Command::Devices(args) => devices::handle(&controller, args, global).await,
        Command::Receivers(args) => receivers::handle(&controller, args, global),
        Command::Transmitters(args) => transmitters::handle(&controller, args, global),
        Command::Route(args) => route::handle(&controller, args, global).await,
        Command::Mode(args) => mode::handle(&controller, args, global).await,
        Command::Preset(args) => preset::handle(&controller, args, global).await,
        Command::Stream(args) => stream::handle(&controller, args, global).await,
        Command::Raw(args) => raw::handle(&controller, args, global).await,
        // Handled before dispatch
        Command::Watch | Command::Config(_) | Command::Completions(_) => Ok(()),
    };

    controller.disconnect().await;
    result
}
