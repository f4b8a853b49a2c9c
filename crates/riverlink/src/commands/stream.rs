//! Transmitter stream command handlers.

use riverlink_core::Controller;

use crate::cli::{GlobalOpts, StreamArgs, StreamCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    controller: &Controller,
    args: StreamArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        StreamCommand::Start(target) => {
            let stream_type = util::parse_stream_type(&target.stream_type);
            controller
                .start_stream(&target.transmitter, &stream_type, target.index)
                .await?;
            if !global.quiet {
                eprintln!(
                    "Started {stream_type}:{} on {}",
                    target.index, target.transmitter
                );
            }
            Ok(())
        }

        StreamCommand::Stop(target) => {
            let stream_type = util::parse_stream_type(&target.stream_type);
            controller
                .stop_stream(&target.transmitter, &stream_type, target.index)
                .await?;
            if !global.quiet {
                eprintln!(
                    "Stopped {stream_type}:{} on {}",
                    target.index, target.transmitter
                );
            }
            Ok(())
        }
    }
}
