//! Resolution preset command handlers.

use riverlink_core::presets::{DEFAULT_PRESET, PRESETS};
use riverlink_core::{Controller, PresetStatus, ResolutionPreset};
use tabled::Tabled;

use crate::cli::{GlobalOpts, PresetArgs, PresetCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Width")]
    width: u32,
    #[tabled(rename = "Height")]
    height: u32,
    #[tabled(rename = "FPS")]
    fps: u32,
}

impl From<&ResolutionPreset> for PresetRow {
    fn from(p: &ResolutionPreset) -> Self {
        let name = if p.name == DEFAULT_PRESET {
            format!("{} (default)", p.name)
        } else {
            p.name.to_string()
        };
        Self {
            name,
            category: p.category.to_string(),
            width: p.resolution.width,
            height: p.resolution.height,
            fps: p.resolution.fps,
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// Print the preset table. Needs no connection.
pub fn list(global: &GlobalOpts) {
    let out = output::render_list(&global.output, &PRESETS, |p| PresetRow::from(p), |p| {
        p.name.to_string()
    });
    output::print_output(&out, global.quiet);
}

pub async fn handle(
    controller: &Controller,
    args: PresetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PresetCommand::List => {
            list(global);
            Ok(())
        }

        PresetCommand::Set { receiver, preset } => {
            let status = util::with_spinner(
                format!("Setting {receiver} to {preset}"),
                global,
                controller.set_resolution_preset(&receiver, &preset),
            )
            .await?;
            if !global.quiet {
                match status {
                    // Staged only in this process, so it is gone once we exit.
                    PresetStatus::Pending => eprintln!(
                        "{receiver} is in genlock, which ignores resolution; nothing was changed.\n\
                         Use `riverlink mode set {receiver} <mode> --preset \"{preset}\"` to switch with this preset."
                    ),
                    PresetStatus::Applied => eprintln!("{receiver} now outputs {preset}"),
                    PresetStatus::Stored => {
                        eprintln!("{receiver} stored {preset}; genlock ignores it until a scaling mode is set");
                    }
                }
            }
            Ok(())
        }
    }
}
