// ── Topology store ──
//
// Holds the latest `Topology` behind a watch channel. Both writers (the
// refresh path and pending-preset bookkeeping) go through `send_modify`,
// so a refresh can never drop a pending preset staged concurrently.

use std::sync::Arc;

use riverlink_api::RawDevice;
use tokio::sync::watch;

use crate::model::Topology;
use crate::stream::TopologyStream;
use crate::topology::parse_snapshot;

pub struct TopologyStore {
    sender: watch::Sender<Arc<Topology>>,
}

impl TopologyStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Topology::default()));
        Self { sender }
    }

    pub fn snapshot(&self) -> Arc<Topology> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> TopologyStream {
        TopologyStream::new(self.sender.subscribe())
    }

    /// Replace the topology with one parsed from `devices`, carrying
    /// pending presets over from the current one.
    pub fn apply_snapshot(&self, devices: &[RawDevice]) -> Arc<Topology> {
        let mut applied = Arc::default();
        self.sender.send_modify(|current| {
            *current = Arc::new(parse_snapshot(devices, Some(current)));
            applied = Arc::clone(current);
        });
        applied
    }

    /// Record a pending preset for a receiver. Returns `false` if the
    /// receiver is not in the current topology.
    pub fn stage_pending_preset(&self, receiver_id: &str, preset: &str) -> bool {
        self.sender.send_if_modified(|current| {
            if !current.receivers.contains_key(receiver_id) {
                return false;
            }
            let topology = Arc::make_mut(current);
            if let Some(receiver) = topology.receivers.get_mut(receiver_id) {
                receiver.display.pending_preset = Some(preset.to_string());
            }
            true
        })
    }

    /// Remove and return a receiver's pending preset.
    pub fn take_pending_preset(&self, receiver_id: &str) -> Option<String> {
        let mut taken = None;
        self.sender.send_if_modified(|current| {
            let has_pending = current
                .receivers
                .get(receiver_id)
                .is_some_and(|r| r.display.pending_preset.is_some());
            if !has_pending {
                return false;
            }
            taken = Arc::make_mut(current)
                .receivers
                .get_mut(receiver_id)
                .and_then(|r| r.display.pending_preset.take());
            true
        });
        taken
    }
}

impl Default for TopologyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use riverlink_api::device::devices_from_result;
    use serde_json::json;

    use super::*;

    fn devices() -> Vec<RawDevice> {
        devices_from_result(&json!({"devices": [
            {"device_id": "rx1", "identity": {"is_receiver": true}}
        ]}))
    }

    #[test]
    fn staged_preset_survives_the_next_snapshot() {
        let store = TopologyStore::new();
        store.apply_snapshot(&devices());

        assert!(store.stage_pending_preset("rx1", "720p @ 50Hz"));
        assert!(!store.stage_pending_preset("rx9", "720p @ 50Hz"));

        let refreshed = store.apply_snapshot(&devices());
        assert_eq!(
            refreshed.receivers["rx1"].display.pending_preset.as_deref(),
            Some("720p @ 50Hz")
        );

        assert_eq!(store.take_pending_preset("rx1").as_deref(), Some("720p @ 50Hz"));
        assert_eq!(store.take_pending_preset("rx1"), None);
        assert_eq!(store.snapshot().receivers["rx1"].display.pending_preset, None);
    }

    #[tokio::test]
    async fn subscribers_see_each_refresh() {
        let store = TopologyStore::new();
        let mut stream = store.subscribe();
        assert!(stream.current().is_empty());

        store.apply_snapshot(&devices());

        let next = stream.changed().await.unwrap();
        assert!(next.receivers.contains_key("rx1"));
        assert_eq!(stream.current().receivers.len(), 1);
    }

    #[tokio::test]
    async fn stream_adapter_yields_current_then_updates() {
        use futures_util::StreamExt;

        let store = TopologyStore::new();
        let mut updates = store.subscribe().into_stream();

        let first = updates.next().await.unwrap();
        assert!(first.is_empty());

        store.apply_snapshot(&devices());
        let second = updates.next().await.unwrap();
        assert!(second.receivers.contains_key("rx1"));
    }
}
