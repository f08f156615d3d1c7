//! Shared test support: a recording sink, wire-format builders, and a
//! scripted WebSocket server standing in for the exchange's private stream.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use execution_feed::{ExecutionEvent, ExecutionSink};

/// Sink that records every delivery into a shared vector.
pub struct RecordingSink {
    events: Arc<Mutex<Vec<ExecutionEvent>>>,
}

impl RecordingSink {
    /// Create a sink and a handle to the deliveries it records.
    pub fn new() -> (Self, Arc<Mutex<Vec<ExecutionEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: Arc::clone(&events),
            },
            events,
        )
    }
}

#[async_trait]
impl ExecutionSink for RecordingSink {
    async fn deliver(&mut self, event: &ExecutionEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Identifiers of the recorded deliveries, in delivery order.
pub fn delivered_ids(events: &Arc<Mutex<Vec<ExecutionEvent>>>) -> Vec<String> {
    events
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.exec_id.clone())
        .collect()
}

/// Wait until at least `count` deliveries have been recorded.
pub async fn wait_for_deliveries(events: &Arc<Mutex<Vec<ExecutionEvent>>>, count: usize) {
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if events.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    assert!(
        result.is_ok(),
        "timed out waiting for {count} deliveries, got {:?}",
        delivered_ids(events)
    );
}

/// One execution in wire shape (all numeric fields are decimal strings).
pub fn execution_json(id: &str, symbol: &str, time_ms: i64) -> serde_json::Value {
    serde_json::json!({
        "execId": id,
        "symbol": symbol,
        "execTime": time_ms.to_string(),
        "execPrice": "100.5",
        "execQty": "0.25",
        "side": "Buy"
    })
}

/// A stream data frame carrying the given executions.
pub fn execution_frame(executions: &[serde_json::Value]) -> String {
    serde_json::json!({
        "topic": "execution",
        "data": executions
    })
    .to_string()
}

/// A REST execution-list response body carrying the given executions.
pub fn execution_list_body(executions: &[serde_json::Value]) -> serde_json::Value {
    serde_json::json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": { "list": executions }
    })
}

/// One scripted server-side step for a single stream connection.
pub enum ServerAction {
    /// Send a text frame to the client.
    Send(String),
    /// Close the connection gracefully.
    Close,
    /// Keep the connection open, draining client frames, until the client
    /// goes away or the test ends.
    Hold,
}

/// Script for one accepted connection, performed in order.
pub type SessionScript = Vec<ServerAction>;

/// Spawn a scripted WebSocket server.
///
/// Each accepted connection consumes the next script: the server reads the
/// client's auth and subscribe frames, acknowledges the auth, then performs
/// the script's actions. After all scripts are used, further connections
/// are accepted and held open silently so late reconnects don't fail the
/// test.
pub async fn spawn_ws_server(scripts: Vec<SessionScript>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for script in scripts {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                return;
            };

            // Client handshake: auth frame, then subscribe frame.
            let _ = ws.next().await;
            let _ = ws.next().await;
            let _ = ws
                .send(Message::Text(
                    r#"{"success":true,"ret_msg":"","op":"auth","conn_id":"test"}"#.into(),
                ))
                .await;
            let _ = ws
                .send(Message::Text(r#"{"success":true,"op":"subscribe"}"#.into()))
                .await;

            let mut hold = false;
            for action in script {
                match action {
                    ServerAction::Send(text) => {
                        let _ = ws.send(Message::Text(text.into())).await;
                    }
                    ServerAction::Close => {
                        let _ = ws.close(None).await;
                    }
                    ServerAction::Hold => {
                        hold = true;
                    }
                }
            }

            if hold {
                while let Some(frame) = ws.next().await {
                    if frame.is_err() {
                        break;
                    }
                }
            }
        }

        // Scripts exhausted: accept and hold any further connections.
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                if let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await {
                    while let Some(frame) = ws.next().await {
                        if frame.is_err() {
                            break;
                        }
                    }
                }
            });
        }
    });

    format!("ws://{addr}")
}
