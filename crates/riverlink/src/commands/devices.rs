//! Device command handlers.

use riverlink_core::{Controller, DeviceInfo, Topology};
use tabled::Tabled;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Temp")]
    temperature: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
}

impl From<&DeviceInfo> for DeviceRow {
    fn from(d: &DeviceInfo) -> Self {
        Self {
            id: d.device_id.clone(),
            name: d.name.clone(),
            role: d.role.to_string(),
            ip: d.ip_address.clone().unwrap_or_default(),
            active: (if d.active { "yes" } else { "no" }).to_string(),
            temperature: d.temperature.map(|t| format!("{t:.1}°C")).unwrap_or_default(),
            firmware: d.firmware_version.clone(),
        }
    }
}

fn detail(d: &DeviceInfo) -> String {
    [
        format!("ID:       {}", d.device_id),
        format!("Name:     {}", d.name),
        format!("Role:     {}", d.role),
        format!("IP:       {}", d.ip_address.as_deref().unwrap_or("-")),
        format!("Active:   {}", d.active),
        format!("Temp:     {}", util::or_dash(d.temperature.map(|t| format!("{t:.1}°C")))),
        format!("Firmware: {}", d.firmware_version),
        format!(
            "Comment:  {}",
            if d.firmware_comment.is_empty() {
                "-"
            } else {
                d.firmware_comment.as_str()
            }
        ),
    ]
    .join("\n")
}

/// Receivers first, then transmitters, each in id order.
fn all_devices(topology: &Topology) -> Vec<DeviceInfo> {
    topology
        .receivers
        .values()
        .map(|r| r.info.clone())
        .chain(topology.transmitters.values().map(|t| t.info.clone()))
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let devices = all_devices(&controller.topology());
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.device_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let devices = all_devices(&controller.topology());
            let found = devices
                .iter()
                .find(|d| d.device_id == device)
                .or_else(|| devices.iter().find(|d| d.is_named(&device)));
            match found {
                Some(d) => {
                    let out =
                        output::render_single(&global.output, d, detail, |d| d.device_id.clone());
                    output::print_output(&out, global.quiet);
                    Ok(())
                }
                None => Err(CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: device,
                    list_command: "devices list".into(),
                }),
            }
        }

        DevicesCommand::State { device } => {
            let state = controller.device_state(&device).await?;
            let out = output::render_value(&global.output, &state);
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
