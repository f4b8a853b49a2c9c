//! Receiver command handlers.

use riverlink_core::{Controller, Receiver, StreamType};
use tabled::Tabled;

use crate::cli::{GlobalOpts, ReceiversArgs, ReceiversCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReceiverRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Preset")]
    preset: String,
    #[tabled(rename = "Output")]
    output: String,
}

impl From<&Receiver> for ReceiverRow {
    fn from(r: &Receiver) -> Self {
        Self {
            id: r.info.device_id.clone(),
            name: r.info.name.clone(),
            source: util::source_label(r.video_source()),
            mode: r.display.mode.to_string(),
            preset: format!(
                "{} ({})",
                r.display.effective_preset(),
                r.display.preset_status()
            ),
            output: r
                .video
                .as_ref()
                .and_then(riverlink_core::VideoSignal::timing)
                .unwrap_or_default(),
        }
    }
}

fn detail(r: &Receiver) -> String {
    let d = &r.display;
    let mut lines = vec![
        format!("ID:         {}", r.info.device_id),
        format!("Name:       {}", r.info.name),
        format!("IP:         {}", r.info.ip_address.as_deref().unwrap_or("-")),
        format!("Active:     {}", r.info.active),
        format!("Firmware:   {}", r.info.firmware_version),
        format!("Video:      {}", util::source_label(r.video_source())),
        format!(
            "Audio:      {}",
            util::source_label(r.subscription(&StreamType::HdmiAudio, 0))
        ),
        format!("Mode:       {}", d.mode),
        format!("Frame:      {}", d.resolution()),
        format!("Preset:     {} ({})", d.effective_preset(), d.preset_status()),
    ];
    if let Some(ref video) = r.video {
        lines.push(format!("Output:     {}", util::or_dash(video.timing())));
        if let Some(ref cs) = video.color_space {
            lines.push(format!("Color:      {cs}"));
        }
        if let Some(protected) = video.hdcp_protected {
            lines.push(format!(
                "HDCP:       {}",
                if protected {
                    video.hdcp_version.as_deref().unwrap_or("yes")
                } else {
                    "no"
                }
            ));
        }
    }
    if !r.subscriptions.is_empty() {
        lines.push("Subscriptions:".into());
        for s in &r.subscriptions {
            lines.push(format!(
                "  {}:{}  {}  {}  {}",
                s.stream_type,
                s.index,
                s.address,
                s.state,
                s.source_device_name.as_deref().unwrap_or("-")
            ));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    controller: &Controller,
    args: ReceiversArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ReceiversCommand::List => {
            let receivers: Vec<Receiver> =
                controller.topology().receivers.values().cloned().collect();
            let out = output::render_list(
                &global.output,
                &receivers,
                |r| ReceiverRow::from(r),
                |r| r.info.device_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReceiversCommand::Get { receiver } => {
            let found = controller.receiver(&receiver)?;
            let out = output::render_single(&global.output, &found, detail, |r| {
                r.info.device_id.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
