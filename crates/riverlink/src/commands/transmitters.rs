//! Transmitter command handlers.

use riverlink_core::{Controller, StreamType, Transmitter};
use tabled::Tabled;

use crate::cli::{GlobalOpts, TransmittersArgs, TransmittersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TransmitterRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "HDMI")]
    hdmi: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Input")]
    input: String,
}

impl From<&Transmitter> for TransmitterRow {
    fn from(t: &Transmitter) -> Self {
        let hdmi = t.stream(&StreamType::Hdmi, 0);
        Self {
            id: t.info.device_id.clone(),
            name: t.info.name.clone(),
            hdmi: hdmi.map(|s| s.state.clone()).unwrap_or_default(),
            address: hdmi
                .filter(|s| s.is_assigned())
                .map(|s| s.address.clone())
                .unwrap_or_default(),
            input: t
                .input
                .as_ref()
                .and_then(riverlink_core::VideoSignal::timing)
                .unwrap_or_default(),
        }
    }
}

fn detail(t: &Transmitter) -> String {
    let mut lines = vec![
        format!("ID:       {}", t.info.device_id),
        format!("Name:     {}", t.info.name),
        format!("IP:       {}", t.info.ip_address.as_deref().unwrap_or("-")),
        format!("Active:   {}", t.info.active),
        format!("Firmware: {}", t.info.firmware_version),
        format!(
            "Input:    {}",
            util::or_dash(t.input.as_ref().and_then(riverlink_core::VideoSignal::timing))
        ),
    ];
    if !t.streams.is_empty() {
        lines.push("Streams:".into());
        for s in &t.streams {
            lines.push(format!(
                "  {}:{}  {}  {}{}",
                s.stream_type,
                s.index,
                s.address,
                s.state,
                if s.enabled { "" } else { "  (disabled)" }
            ));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    controller: &Controller,
    args: TransmittersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TransmittersCommand::List => {
            let transmitters: Vec<Transmitter> =
                controller.topology().transmitters.values().cloned().collect();
            let out = output::render_list(
                &global.output,
                &transmitters,
                |t| TransmitterRow::from(t),
                |t| t.info.device_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TransmittersCommand::Get { transmitter } => {
            let found = controller.transmitter(&transmitter)?;
            let out = output::render_single(&global.output, &found, detail, |t| {
                t.info.device_id.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
