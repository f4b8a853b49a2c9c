//! Route command handlers.

use riverlink_core::Controller;

use crate::cli::{GlobalOpts, RouteArgs, RouteCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    controller: &Controller,
    args: RouteArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RouteCommand::Set {
            receiver,
            transmitter,
        } => {
            util::with_spinner(
                format!("Routing {transmitter} to {receiver}"),
                global,
                controller.select_source(&receiver, &transmitter),
            )
            .await?;
            if !global.quiet {
                eprintln!("{receiver} now shows {transmitter}");
            }
            Ok(())
        }

        RouteCommand::Clear { receiver } => {
            util::with_spinner(
                format!("Clearing {receiver}"),
                global,
                controller.clear_source(&receiver),
            )
            .await?;
            if !global.quiet {
                eprintln!("{receiver} disconnected");
            }
            Ok(())
        }
    }
}
