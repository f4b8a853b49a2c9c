//! `watch`: follow the polled topology and print what changed.

use owo_colors::OwoColorize;
use riverlink_core::{Controller, ControllerConfig, Topology, VideoMode};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

/// One observed difference between consecutive topologies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Change {
    ReceiverAdded { receiver: String },
    ReceiverRemoved { receiver: String },
    TransmitterAdded { transmitter: String },
    TransmitterRemoved { transmitter: String },
    SourceChanged {
        receiver: String,
        from: String,
        to: String,
    },
    ModeChanged {
        receiver: String,
        from: VideoMode,
        to: VideoMode,
    },
}

fn diff(old: &Topology, new: &Topology) -> Vec<Change> {
    let mut changes = Vec::new();

    for (id, rx) in &new.receivers {
        let Some(prev) = old.receivers.get(id) else {
            changes.push(Change::ReceiverAdded {
                receiver: rx.info.name.clone(),
            });
            continue;
        };
        let (from, to) = (
            util::source_label(prev.video_source()),
            util::source_label(rx.video_source()),
        );
        if from != to {
            changes.push(Change::SourceChanged {
                receiver: rx.info.name.clone(),
                from,
                to,
            });
        }
        if prev.display.mode != rx.display.mode {
            changes.push(Change::ModeChanged {
                receiver: rx.info.name.clone(),
                from: prev.display.mode,
                to: rx.display.mode,
            });
        }
    }
    for (id, rx) in &old.receivers {
        if !new.receivers.contains_key(id) {
            changes.push(Change::ReceiverRemoved {
                receiver: rx.info.name.clone(),
            });
        }
    }

    for (id, tx) in &new.transmitters {
        if !old.transmitters.contains_key(id) {
            changes.push(Change::TransmitterAdded {
                transmitter: tx.info.name.clone(),
            });
        }
    }
    for (id, tx) in &old.transmitters {
        if !new.transmitters.contains_key(id) {
            changes.push(Change::TransmitterRemoved {
                transmitter: tx.info.name.clone(),
            });
        }
    }

    changes
}

fn describe(change: &Change, color: bool) -> String {
    let paint = |s: &str| {
        if color {
            s.cyan().bold().to_string()
        } else {
            s.to_string()
        }
    };
    match change {
        Change::ReceiverAdded { receiver } => format!("+ receiver {}", paint(receiver)),
        Change::ReceiverRemoved { receiver } => format!("- receiver {}", paint(receiver)),
        Change::TransmitterAdded { transmitter } => format!("+ transmitter {}", paint(transmitter)),
        Change::TransmitterRemoved { transmitter } => {
            format!("- transmitter {}", paint(transmitter))
        }
        Change::SourceChanged { receiver, from, to } => {
            format!("{}: {from} -> {}", paint(receiver), paint(to))
        }
        Change::ModeChanged { receiver, from, to } => {
            format!("{}: mode {from} -> {}", paint(receiver), paint(&to.to_string()))
        }
    }
}

fn print_changes(topology: &Topology, changes: &[Change], global: &GlobalOpts, color: bool) {
    let stamp = topology
        .refreshed_at
        .unwrap_or_else(chrono::Utc::now)
        .with_timezone(&chrono::Local)
        .format("%H:%M:%S")
        .to_string();

    for change in changes {
        let line = match global.output {
            OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(change),
            OutputFormat::Table | OutputFormat::Yaml | OutputFormat::Plain => {
                let stamp = if color {
                    stamp.dimmed().to_string()
                } else {
                    stamp.clone()
                };
                format!("{stamp} {}", describe(change, color))
            }
        };
        output::print_output(&line, global.quiet);
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let controller = Controller::new(config);
    controller.connect().await?;

    let mut stream = controller.subscribe();
    let mut previous = stream.current().clone();
    let color = output::should_color(&global.color);
    if !global.quiet {
        eprintln!(
            "Watching {} receivers and {} transmitters every {}s (Ctrl-C to stop)",
            previous.receivers.len(),
            previous.transmitters.len(),
            controller.config().scan_interval.as_secs()
        );
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            next = stream.changed() => {
                let Some(topology) = next else { break };
                let changes = diff(&previous, &topology);
                print_changes(&topology, &changes, global, color);
                previous = topology;
            }
        }
    }

    controller.disconnect().await;
    Ok(())
}
