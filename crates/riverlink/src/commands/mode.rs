//! Display mode command handler.

use riverlink_core::{Controller, VideoMode};

use crate::cli::{DisplayMode, GlobalOpts, ModeArgs, ModeCommand};
use crate::error::CliError;

use super::util;

impl From<DisplayMode> for VideoMode {
    fn from(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Genlock => VideoMode::Genlock,
            DisplayMode::GenlockScaling => VideoMode::GenlockScaling,
            DisplayMode::Fastswitch => VideoMode::Fastswitch,
            DisplayMode::FastswitchStretch => VideoMode::FastswitchStretch,
            DisplayMode::FastswitchCrop => VideoMode::FastswitchCrop,
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: ModeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ModeCommand::Set {
            receiver,
            mode,
            preset,
        } => {
            let mode = VideoMode::from(mode);
            let message = format!("Switching {receiver} to {mode}");
            match preset {
                Some(preset) => {
                    util::with_spinner(
                        message,
                        global,
                        controller.set_display_mode_with_preset(&receiver, mode, &preset),
                    )
                    .await?;
                }
                None => {
                    util::with_spinner(message, global, controller.set_display_mode(&receiver, mode))
                        .await?;
                }
            }

            if !global.quiet {
                let rx = controller.receiver(&receiver)?;
                if mode.uses_resolution() {
                    eprintln!("{receiver}: {mode} at {}", rx.display.resolution());
                } else {
                    eprintln!("{receiver}: {mode}");
                }
            }
            Ok(())
        }
    }
}
