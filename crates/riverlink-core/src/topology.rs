// ── Topology parser ──
//
// Turns one flat `get all device` snapshot into the receiver/transmitter
// graph. Everything is recomputed; the only value carried over from the
// previous topology is each receiver's pending preset.

use std::collections::BTreeMap;

use chrono::Utc;
use riverlink_api::RawDevice;
use tracing::debug;

use crate::convert;
use crate::model::{Receiver, Role, Topology, Transmitter};

/// Build a [`Topology`] from raw devices.
///
/// Pass one collects transmitters and maps each enabled, assigned stream
/// address to its transmitter. Pass two builds receivers and resolves each
/// subscription's source through that map. Devices without an id are
/// skipped; a device flagged as both roles appears in both maps.
pub fn parse_snapshot(devices: &[RawDevice], previous: Option<&Topology>) -> Topology {
    let mut transmitters = BTreeMap::new();
    let mut stream_map = BTreeMap::new();

    for raw in devices.iter().filter(|d| d.is_transmitter()) {
        let Some(device_id) = raw.device_id.as_deref() else {
            continue;
        };
        let streams: Vec<_> = raw
            .streams
            .iter()
            .filter_map(convert::stream_endpoint)
            .collect();
        for stream in streams.iter().filter(|s| s.enabled && s.is_assigned()) {
            stream_map.insert(stream.address.clone(), device_id.to_string());
        }
        transmitters.insert(
            device_id.to_string(),
            Transmitter {
                info: convert::device_info(raw, device_id, Role::Transmitter),
                streams,
                input: convert::transmitter_signal(raw),
            },
        );
    }

    let mut receivers = BTreeMap::new();
    for raw in devices.iter().filter(|d| d.is_receiver()) {
        let Some(device_id) = raw.device_id.as_deref() else {
            continue;
        };
        let mut subscriptions: Vec<_> = raw
            .subscriptions
            .iter()
            .filter_map(convert::subscription_endpoint)
            .collect();
        for sub in &mut subscriptions {
            // The unassigned address is never in the map.
            if let Some(tx_id) = stream_map.get(&sub.address) {
                sub.source_device_name = transmitters.get(tx_id).map(|tx| tx.info.name.clone());
                sub.source_device_id = Some(tx_id.clone());
            }
        }

        let mut display = convert::display_mode(raw);
        display.pending_preset = previous
            .and_then(|p| p.receivers.get(device_id))
            .and_then(|r| r.display.pending_preset.clone());

        receivers.insert(
            device_id.to_string(),
            Receiver {
                info: convert::device_info(raw, device_id, Role::Receiver),
                subscriptions,
                display,
                video: convert::receiver_signal(raw),
            },
        );
    }

    debug!(
        receivers = receivers.len(),
        transmitters = transmitters.len(),
        streams = stream_map.len(),
        "parsed topology snapshot"
    );

    Topology {
        receivers,
        transmitters,
        stream_map,
        refreshed_at: Some(Utc::now()),
    }
}
