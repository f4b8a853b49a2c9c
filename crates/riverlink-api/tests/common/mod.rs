// Shared fake BlueRiver server for client integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use riverlink_api::{ClientConfig, Connector};

/// What the fake server does with one received line.
pub enum Reply {
    Json(Value),
    /// Raw bytes, possibly split into several writes.
    Chunks(Vec<String>),
    /// Drop the connection without answering.
    Hangup,
}

type Responder = dyn FnMut(&str) -> Reply + Send;

/// In-memory connector whose peer is a scripted fake server.
#[derive(Clone)]
pub struct FakeServer {
    responder: Arc<Mutex<Box<Responder>>>,
    log: Arc<Mutex<Vec<String>>>,
    attempts: Arc<AtomicU32>,
    refuse_first: u32,
}

impl FakeServer {
    /// Server that accepts the handshake and delegates everything else.
    pub fn new(mut handler: impl FnMut(&str) -> Reply + Send + 'static) -> Self {
        Self::raw(move |line| {
            if line.starts_with("require ") {
                Reply::Json(json!({"status": "SUCCESS"}))
            } else {
                handler(line)
            }
        })
    }

    /// Server with no built-in handshake handling.
    pub fn raw(handler: impl FnMut(&str) -> Reply + Send + 'static) -> Self {
        Self {
            responder: Arc::new(Mutex::new(Box::new(handler))),
            log: Arc::new(Mutex::new(Vec::new())),
            attempts: Arc::new(AtomicU32::new(0)),
            refuse_first: 0,
        }
    }

    /// Refuse the first `n` connection attempts.
    pub fn refusing(mut self, n: u32) -> Self {
        self.refuse_first = n;
        self
    }

    /// Every line received, across all connections, in arrival order.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn respond(&self, line: &str) -> Reply {
        self.log.lock().unwrap().push(line.to_string());
        (self.responder.lock().unwrap())(line)
    }
}

impl Connector for FakeServer {
    type Stream = DuplexStream;

    async fn connect(&self, _host: &str, _port: u16) -> io::Result<DuplexStream> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.refuse_first {
            return Err(io::Error::from(io::ErrorKind::ConnectionRefused));
        }

        let (client, server) = tokio::io::duplex(64 * 1024);
        let this = self.clone();
        tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(server);
            let mut lines = BufReader::new(read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match this.respond(&line) {
                    Reply::Json(doc) => {
                        if write.write_all(doc.to_string().as_bytes()).await.is_err() {
                            return;
                        }
                    }
                    Reply::Chunks(chunks) => {
                        for chunk in chunks {
                            if write.write_all(chunk.as_bytes()).await.is_err() {
                                return;
                            }
                            tokio::task::yield_now().await;
                        }
                    }
                    Reply::Hangup => return,
                }
            }
        });
        Ok(client)
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new("fake", 6970)
}

pub fn ok(result: Value) -> Reply {
    Reply::Json(json!({"status": "SUCCESS", "result": result}))
}

pub fn device_with_subscription(id: &str, stream_type: &str, index: u32, state: &str) -> Value {
    json!({
        "devices": [{
            "device_id": id,
            "identity": {"is_receiver": true},
            "subscriptions": [{
                "type": stream_type,
                "index": index,
                "configuration": {"address": "239.1.1.1", "enable": true},
                "status": {"state": state}
            }]
        }]
    })
}
