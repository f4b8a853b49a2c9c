// Loopback fake of a BlueRiver matrix for controller tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use riverlink_api::{Backoff, PollPolicy, RetryPolicy};
use riverlink_core::ControllerConfig;

/// Device state the fake server mutates in response to commands.
#[derive(Default)]
pub struct Matrix {
    pub devices: BTreeMap<String, Value>,
    pub log: Vec<String>,
    /// Stream types whose joins are rejected outright.
    pub reject_joins: Vec<String>,
    next_request: u64,
}

#[derive(Clone)]
pub struct FakeMatrix {
    state: Arc<Mutex<Matrix>>,
    pub port: u16,
}

impl FakeMatrix {
    pub async fn start(devices: Vec<Value>) -> Self {
        let mut matrix = Matrix::default();
        for device in devices {
            let id = device["device_id"].as_str().unwrap().to_string();
            matrix.devices.insert(id, device);
        }
        let state = Arc::new(Mutex::new(matrix));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let shared = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let state = Arc::clone(&shared);
                tokio::spawn(async move {
                    let (read, mut write) = socket.into_split();
                    let mut lines = BufReader::new(read).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        let reply = handle(&mut state.lock().unwrap(), &line);
                        if write.write_all(reply.to_string().as_bytes()).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });

        Self { state, port }
    }

    pub fn config(&self) -> ControllerConfig {
        let mut cfg = ControllerConfig::new("127.0.0.1", self.port);
        cfg.scan_interval = Duration::ZERO;
        let quick = RetryPolicy {
            max_attempts: 3,
            backoff: Backoff::new(Duration::from_millis(1), Duration::from_millis(4), 2.0),
        };
        cfg.client.connect = quick;
        cfg.client.join = quick;
        cfg.client.leave = quick;
        cfg.client.poll = PollPolicy {
            max_attempts: 5,
            interval: Duration::from_millis(1),
        };
        cfg
    }

    pub fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Matrix) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn device(&self, id: &str) -> Value {
        self.state.lock().unwrap().devices[id].clone()
    }
}

// ── Device fixtures ──────────────────────────────────────────────────

pub fn transmitter(id: &str, name: &str, video_addr: &str, video_state: &str) -> Value {
    json!({
        "device_id": id,
        "identity": {"is_transmitter": true, "firmware_version": "3.5.0"},
        "configuration": {"device_name": name},
        "status": {"active": true, "temperature": 48.0},
        "nodes": [
            {"type": "NETWORK_INTERFACE", "index": 0, "status": {"ip": {"address": "10.0.1.50"}}},
            {"type": "HDMI_DECODER", "index": 0, "status": {
                "video": {"width": 1920, "height": 1080, "frames_per_second": 60},
                "hdcp_protected": false
            }}
        ],
        "streams": [
            {"type": "HDMI", "index": 0,
             "configuration": {"address": video_addr, "enable": true},
             "status": {"state": video_state}},
            {"type": "HDMI_AUDIO", "index": 0,
             "configuration": {"address": "239.2.0.1", "enable": true},
             "status": {"state": "STREAMING"}}
        ]
    })
}

/// A receiver in genlock with an unrouted HDMI/HDMI_AUDIO pair.
pub fn receiver(id: &str, name: &str) -> Value {
    json!({
        "device_id": id,
        "identity": {"is_receiver": true},
        "configuration": {"device_name": name},
        "status": {"active": true},
        "nodes": [
            {"type": "HDMI_ENCODER", "index": 0,
             "inputs": [{"name": "main", "status": {"source": {"ref_class": "SUBSCRIPTION", "ref_type": "HDMI"}}}]},
            {"type": "FRAME_BUFFER", "index": 0,
             "configuration": {"width": 1920, "height": 1080, "frames_per_second": 60, "display_mode": "FAST_SWITCHED"}}
        ],
        "subscriptions": [
            {"type": "HDMI", "index": 0,
             "configuration": {"address": "0.0.0.0", "enable": false},
             "status": {"state": "STOPPED"}},
            {"type": "HDMI_AUDIO", "index": 0,
             "configuration": {"address": "0.0.0.0", "enable": false},
             "status": {"state": "STOPPED"}}
        ]
    })
}

// ── Command handling ─────────────────────────────────────────────────

fn success(result: Value) -> Value {
    json!({"status": "SUCCESS", "result": result})
}

fn failure(message: &str) -> Value {
    json!({"status": "ERROR", "error": {"message": message}})
}

fn parse_ref(token: &str) -> Option<(String, String, u64)> {
    let mut parts = token.split(':');
    let id = parts.next()?.to_string();
    let kind = parts.next()?.to_string();
    let index = parts.next()?.parse().ok()?;
    Some((id, kind, index))
}

fn entry<'a>(device: &'a mut Value, list: &str, kind: &str, index: u64) -> Option<&'a mut Value> {
    device[list]
        .as_array_mut()?
        .iter_mut()
        .find(|e| e["type"] == kind && e["index"] == index)
}

fn handle(matrix: &mut Matrix, line: &str) -> Value {
    matrix.log.push(line.to_string());
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
        ["require", ..] => json!({"status": "SUCCESS"}),
        ["get", "all", "device"] => {
            success(json!({"devices": matrix.devices.values().cloned().collect::<Vec<_>>()}))
        }
        ["get", id, "device"] => match matrix.devices.get(*id) {
            Some(device) => success(json!({"devices": [device]})),
            None => failure("no such device"),
        },
        ["join", source, sink] => join(matrix, source, sink),
        ["leave", sink] => {
            let Some((id, kind, index)) = parse_ref(sink) else {
                return failure("bad reference");
            };
            let Some(sub) = matrix
                .devices
                .get_mut(&id)
                .and_then(|d| entry(d, "subscriptions", &kind, index))
            else {
                return failure("no such subscription");
            };
            sub["configuration"]["address"] = json!("0.0.0.0");
            sub["status"]["state"] = json!("STOPPED");
            success(json!({}))
        }
        [verb @ ("start" | "stop"), target] => {
            let Some((id, kind, index)) = parse_ref(target) else {
                return failure("bad reference");
            };
            let Some(stream) = matrix
                .devices
                .get_mut(&id)
                .and_then(|d| entry(d, "streams", &kind, index))
            else {
                return failure("no such stream");
            };
            let state = if *verb == "start" { "STREAMING" } else { "STOPPED" };
            stream["status"]["state"] = json!(state);
            success(json!({}))
        }
        ["set", id, "video", rest @ ..] => set_video(matrix, id, rest),
        ["request", _] => success(json!({})),
        _ => failure("unknown command"),
    }
}

fn join(matrix: &mut Matrix, source: &str, sink: &str) -> Value {
    let (Some((tx, kind, tx_index)), Some((rx, _, rx_index))) = (parse_ref(source), parse_ref(sink))
    else {
        return failure("bad reference");
    };
    if matrix.reject_joins.contains(&kind) {
        return failure("join refused");
    }
    let Some(address) = matrix
        .devices
        .get_mut(&tx)
        .and_then(|d| entry(d, "streams", &kind, tx_index))
        .map(|s| s["configuration"]["address"].clone())
    else {
        return failure("no such stream");
    };
    let Some(sub) = matrix
        .devices
        .get_mut(&rx)
        .and_then(|d| entry(d, "subscriptions", &kind, rx_index))
    else {
        return failure("no such subscription");
    };
    sub["configuration"]["address"] = address;
    sub["configuration"]["enable"] = json!(true);
    sub["status"]["state"] = json!("STREAMING");
    success(json!({}))
}

fn set_video(matrix: &mut Matrix, id: &str, args: &[&str]) -> Value {
    let Some(device) = matrix.devices.get_mut(id) else {
        return failure("no such device");
    };
    let (mode_words, size) = match args.iter().position(|w| *w == "size") {
        Some(at) => (&args[..at], Some(&args[at + 1..])),
        None => (args, None),
    };
    let (source, fb_mode) = match mode_words {
        ["genlock"] => ("SUBSCRIPTION", None),
        ["genlock_scaling"] => ("FRAME_BUFFER", Some("GENLOCK_SCALING")),
        ["fastswitch"] => ("FRAME_BUFFER", Some("FAST_SWITCHED")),
        ["fastswitch", "stretch"] => ("FRAME_BUFFER", Some("FAST_SWITCHED_STRETCH")),
        ["fastswitch", "crop"] => ("FRAME_BUFFER", Some("FAST_SWITCHED_CROP")),
        _ => return failure("unknown video mode"),
    };

    let nodes = device["nodes"].as_array_mut().unwrap();
    for node in nodes.iter_mut() {
        if node["type"] == "HDMI_ENCODER" {
            node["inputs"][0]["status"]["source"] = if source == "SUBSCRIPTION" {
                json!({"ref_class": "SUBSCRIPTION", "ref_type": "HDMI"})
            } else {
                json!({"ref_class": "NODE", "ref_type": "FRAME_BUFFER"})
            };
        }
        if node["type"] == "FRAME_BUFFER" {
            if let Some(fb_mode) = fb_mode {
                node["configuration"]["display_mode"] = json!(fb_mode);
            }
            if let Some([w, h, "fps", f]) = size {
                node["configuration"]["width"] = json!(w.parse::<u32>().unwrap());
                node["configuration"]["height"] = json!(h.parse::<u32>().unwrap());
                node["configuration"]["frames_per_second"] = json!(f.parse::<u32>().unwrap());
            }
        }
    }
    // Mode changes complete asynchronously.
    matrix.next_request += 1;
    json!({"status": "PROCESSING", "request_id": matrix.next_request})
}
