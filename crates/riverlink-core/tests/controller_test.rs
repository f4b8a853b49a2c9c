// End-to-end controller workflows against a loopback fake matrix.
#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;

use riverlink_core::{
    ConnectionState, Controller, CoreError, PresetStatus, StreamType, VideoMode,
};

use common::{FakeMatrix, receiver, transmitter};

async fn matrix() -> FakeMatrix {
    FakeMatrix::start(vec![
        transmitter("tx1", "Blu-ray", "239.1.0.1", "STOPPED"),
        transmitter("tx2", "Apple TV", "239.1.0.2", "STREAMING"),
        receiver("rx1", "Living Room"),
    ])
    .await
}

async fn connected(matrix: &FakeMatrix) -> Controller {
    let controller = Controller::new(matrix.config());
    controller.connect().await.unwrap();
    matrix.clear_log();
    controller
}

// ── Lifecycle ────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_loads_the_first_topology() {
    let matrix = matrix().await;
    let controller = Controller::new(matrix.config());
    let state = controller.connection_state();

    controller.connect().await.unwrap();

    assert_eq!(*state.borrow(), ConnectionState::Connected);
    let topology = controller.topology();
    assert_eq!(topology.transmitters.len(), 2);
    assert_eq!(topology.receivers["rx1"].info.name, "Living Room");
    assert_eq!(topology.stream_map["239.1.0.2"], "tx2");
    assert!(topology.refreshed_at.is_some());

    controller.disconnect().await;
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn unreachable_server_fails_to_connect() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let matrix = matrix().await;
    let mut config = matrix.config();
    config.client.port = port;
    let controller = Controller::new(config);

    let err = controller.connect().await.unwrap_err();

    assert!(matches!(err, CoreError::ConnectionFailed { .. }), "got {err:?}");
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Failed);
}

#[tokio::test]
async fn oneshot_runs_the_closure_between_connect_and_disconnect() {
    let matrix = matrix().await;

    let names = Controller::oneshot(matrix.config(), |ctrl| async move {
        Ok(ctrl
            .topology()
            .transmitters
            .values()
            .map(|t| t.info.name.clone())
            .collect::<Vec<_>>())
    })
    .await
    .unwrap();

    assert_eq!(names, vec!["Blu-ray", "Apple TV"]);
}

#[tokio::test]
async fn background_task_keeps_polling() {
    let matrix = matrix().await;
    let mut config = matrix.config();
    config.scan_interval = Duration::from_millis(20);
    let controller = Controller::new(config);
    controller.connect().await.unwrap();
    let mut updates = controller.subscribe();

    matrix.with(|m| {
        m.devices.get_mut("tx2").unwrap()["configuration"]["device_name"] = "Roku".into();
    });
    let next = tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(next.transmitters["tx2"].info.name, "Roku");
    controller.disconnect().await;
}

// ── Routing ──────────────────────────────────────────────────────────

#[tokio::test]
async fn select_source_starts_stopped_stream_then_routes_video_and_audio() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;

    controller.select_source("Living Room", "Blu-ray").await.unwrap();

    let log = matrix.log();
    let commands: Vec<&str> = log
        .iter()
        .map(String::as_str)
        .filter(|l| !l.starts_with("get"))
        .collect();
    assert_eq!(
        commands,
        vec![
            "start tx1:HDMI:0",
            "join tx1:HDMI:0 rx1:HDMI:0",
            "join tx1:HDMI_AUDIO:0 rx1:HDMI_AUDIO:0",
        ]
    );
    assert_eq!(log.last().unwrap(), "get all device");

    let rx = controller.receiver("rx1").unwrap();
    let source = rx.video_source().unwrap();
    assert_eq!(source.source_device_id.as_deref(), Some("tx1"));
    assert_eq!(source.source_device_name.as_deref(), Some("Blu-ray"));
    assert!(source.is_streaming());
}

#[tokio::test]
async fn streaming_transmitter_is_not_restarted() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;

    controller.select_source("rx1", "tx2").await.unwrap();

    assert!(!matrix.log().iter().any(|l| l.starts_with("start")));
}

#[tokio::test]
async fn audio_failure_keeps_the_video_route() {
    let matrix = matrix().await;
    matrix.with(|m| m.reject_joins.push("HDMI_AUDIO".into()));
    let controller = connected(&matrix).await;

    let err = controller.select_source("rx1", "tx2").await.unwrap_err();

    assert!(matches!(err, CoreError::AudioFollowFailed { .. }), "got {err:?}");
    assert!(err.to_string().contains("Apple TV"));
    assert!(!matrix.log().iter().any(|l| l.starts_with("leave")));

    let topology = controller.refresh().await.unwrap();
    let video = topology.receivers["rx1"].video_source().unwrap();
    assert_eq!(video.source_device_id.as_deref(), Some("tx2"));
}

#[tokio::test]
async fn unknown_transmitter_is_reported_by_name() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;

    let err = controller.select_source("rx1", "Chromecast").await.unwrap_err();

    assert_eq!(err.to_string(), "Transmitter 'Chromecast' not found");
    assert!(matrix.log().is_empty());
}

#[tokio::test]
async fn clear_source_leaves_both_streams_without_refreshing() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;
    controller.select_source("rx1", "tx2").await.unwrap();
    matrix.clear_log();

    controller.clear_source("Living Room").await.unwrap();

    let log = matrix.log();
    let leaves: Vec<&String> = log.iter().filter(|l| l.starts_with("leave")).collect();
    assert_eq!(leaves, vec!["leave rx1:HDMI:0", "leave rx1:HDMI_AUDIO:0"]);
    assert!(!log.iter().any(|l| l == "get all device"));
    let rx = matrix.device("rx1");
    assert_eq!(rx["subscriptions"][0]["status"]["state"], "STOPPED");
}

// ── Display mode & presets ───────────────────────────────────────────

#[tokio::test]
async fn preset_in_genlock_waits_for_the_next_mode_change() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;

    let status = controller
        .set_resolution_preset("rx1", "720p @ 60Hz")
        .await
        .unwrap();

    assert_eq!(status, PresetStatus::Pending);
    assert!(matrix.log().is_empty(), "nothing is sent in genlock");

    // A poll in between must not lose the pending preset.
    let topology = controller.refresh().await.unwrap();
    let display = &topology.receivers["rx1"].display;
    assert_eq!(display.pending_preset.as_deref(), Some("720p @ 60Hz"));
    assert_eq!(display.preset_status(), PresetStatus::Pending);

    controller
        .set_display_mode("rx1", VideoMode::FastswitchCrop)
        .await
        .unwrap();

    assert!(
        matrix
            .log()
            .contains(&"set rx1 video fastswitch crop size 1280 720 fps 60".to_string())
    );
    let display = controller.receiver("rx1").unwrap().display;
    assert_eq!(display.mode, VideoMode::FastswitchCrop);
    assert_eq!(display.resolution_preset, "720p @ 60Hz");
    assert_eq!(display.pending_preset, None);
    assert!(display.resolution_applies);
}

#[tokio::test]
async fn scaling_mode_without_pending_keeps_current_resolution() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;

    controller
        .set_display_mode("rx1", VideoMode::GenlockScaling)
        .await
        .unwrap();
    controller.set_display_mode("rx1", VideoMode::Genlock).await.unwrap();

    let sets: Vec<String> = matrix
        .log()
        .into_iter()
        .filter(|l| l.starts_with("set"))
        .collect();
    assert_eq!(
        sets,
        vec![
            "set rx1 video genlock_scaling size 1920 1080 fps 60",
            "set rx1 video genlock",
        ]
    );
    assert!(matrix.log().iter().any(|l| l.starts_with("request ")));
}

#[tokio::test]
async fn preset_in_scaling_mode_applies_immediately() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;
    controller
        .set_display_mode("rx1", VideoMode::Fastswitch)
        .await
        .unwrap();
    matrix.clear_log();

    let status = controller
        .set_resolution_preset("rx1", "4K UHD @ 30Hz")
        .await
        .unwrap();

    assert_eq!(status, PresetStatus::Applied);
    assert_eq!(matrix.log()[0], "set rx1 video fastswitch size 3840 2160 fps 30");
    let display = controller.receiver("rx1").unwrap().display;
    assert_eq!(display.resolution_preset, "4K UHD @ 30Hz");
}

#[tokio::test]
async fn mode_and_preset_apply_together_from_a_fresh_controller() {
    let matrix = matrix().await;
    let staging = connected(&matrix).await;
    staging
        .set_resolution_preset("rx1", "720p @ 60Hz")
        .await
        .unwrap();
    staging.disconnect().await;
    drop(staging);

    let controller = connected(&matrix).await;
    controller
        .set_display_mode_with_preset("rx1", VideoMode::FastswitchCrop, "720p @ 60Hz")
        .await
        .unwrap();

    assert_eq!(matrix.log()[0], "set rx1 video fastswitch crop size 1280 720 fps 60");
    let display = controller.receiver("rx1").unwrap().display;
    assert_eq!(display.resolution_preset, "720p @ 60Hz");
    assert_eq!(display.pending_preset, None);
}

#[tokio::test]
async fn explicit_preset_replaces_the_pending_one() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;
    controller
        .set_resolution_preset("rx1", "720p @ 60Hz")
        .await
        .unwrap();

    controller
        .set_display_mode_with_preset("rx1", VideoMode::Fastswitch, "4K UHD @ 30Hz")
        .await
        .unwrap();

    assert_eq!(matrix.log()[0], "set rx1 video fastswitch size 3840 2160 fps 30");
    let display = controller.receiver("rx1").unwrap().display;
    assert_eq!(display.pending_preset, None);
}

#[tokio::test]
async fn genlock_with_a_preset_is_rejected_before_sending() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;

    let err = controller
        .set_display_mode_with_preset("rx1", VideoMode::Genlock, "720p @ 60Hz")
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ValidationFailed { .. }), "got {err:?}");
    assert!(matrix.log().is_empty());
}

#[tokio::test]
async fn unknown_preset_is_rejected_before_sending() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;

    let err = controller
        .set_resolution_preset("rx1", "8K @ 120Hz")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Unknown resolution preset: 8K @ 120Hz");
    assert!(matrix.log().is_empty());
}

// ── Streams & raw access ─────────────────────────────────────────────

#[tokio::test]
async fn stream_control_refreshes_the_topology() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;

    controller
        .start_stream("Blu-ray", &StreamType::Hdmi, 0)
        .await
        .unwrap();
    let tx = controller.transmitter("tx1").unwrap();
    assert!(tx.stream(&StreamType::Hdmi, 0).unwrap().is_streaming());

    controller
        .stop_stream("tx1", &StreamType::Hdmi, 0)
        .await
        .unwrap();
    let tx = controller.transmitter("tx1").unwrap();
    assert!(!tx.stream(&StreamType::Hdmi, 0).unwrap().is_streaming());
}

#[tokio::test]
async fn raw_commands_and_device_state_pass_through() {
    let matrix = matrix().await;
    let controller = connected(&matrix).await;

    let state = controller.device_state("rx1").await.unwrap();
    assert_eq!(state["result"]["devices"][0]["device_id"], "rx1");

    let body = controller.execute_raw("frobnicate").await.unwrap();
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["error"]["message"], "unknown command");
}
