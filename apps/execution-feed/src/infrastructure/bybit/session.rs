//! Private Stream Session
//!
//! Owns exactly one live WebSocket connection: connects, authenticates,
//! subscribes, and runs the receive loop that turns inbound frames into
//! deduplicated execution deliveries.
//!
//! A session is single-use. The supervisor creates one per connection
//! attempt, drives it until it ends (server close, error, or cancellation),
//! and disposes it before opening the next one, so at most one live
//! transport exists at a time.

use chrono::Utc;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

use super::auth::build_auth_frame;
use super::codec::{CodecError, Frame, FrameCodec};
use super::messages::SubscribeFrame;
use crate::application::ports::ExecutionSink;
use crate::domain::{ExecutionEvent, FeedContext};
use crate::infrastructure::config::ConnectionOptions;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can end a stream session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// WebSocket transport error (connect, send, or receive).
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Outbound frame could not be serialized.
    #[error("frame serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Inbound frame could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Server rejected the authentication frame.
    #[error("authentication rejected by server: {0}")]
    AuthRejected(String),

    /// Server closed the stream.
    #[error("stream closed by server")]
    Closed,

    /// Downstream sink failed to accept a delivery.
    #[error("execution sink error: {0}")]
    Sink(#[source] anyhow::Error),

    /// Cancellation was requested; not a fault.
    #[error("session cancelled")]
    Cancelled,
}

// =============================================================================
// Stream Session
// =============================================================================

/// One live connection to the private execution stream.
pub struct StreamSession {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    codec: FrameCodec,
}

impl StreamSession {
    /// Open the transport, authenticate, and subscribe to executions.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the handshake sends fail.
    pub async fn connect(options: &ConnectionOptions) -> Result<Self, SessionError> {
        tracing::info!(url = %options.ws_url, "connecting to execution stream");

        let (ws_stream, _response) = connect_async(options.ws_url.as_str()).await?;
        let (mut write, read) = ws_stream.split();

        let auth = build_auth_frame(&options.credentials, Utc::now().timestamp_millis());
        write
            .send(Message::Text(serde_json::to_string(&auth)?.into()))
            .await?;

        let subscribe = SubscribeFrame::execution();
        write
            .send(Message::Text(serde_json::to_string(&subscribe)?.into()))
            .await?;

        tracing::debug!("auth and subscribe frames sent");

        Ok(Self {
            write,
            read,
            codec: FrameCodec::new(),
        })
    }

    /// Run the receive loop until the stream ends or cancellation fires.
    ///
    /// Each decoded execution passes through the dedup guard; only
    /// newly-seen events advance the watermark and reach the sink, in
    /// frame order, one delivery awaited at a time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` when the server ends the stream,
    /// `SessionError::Cancelled` when cancellation fires, and transport,
    /// codec, or sink errors otherwise.
    pub async fn stream<S: ExecutionSink>(
        &mut self,
        ctx: &mut FeedContext,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError> {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("stream session cancelled");
                    return Err(SessionError::Cancelled);
                }
                frame = self.read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        match self.codec.decode(&text)? {
                            Frame::Control(control) => {
                                if control.is_failure() {
                                    return Err(SessionError::AuthRejected(
                                        control.ret_msg.unwrap_or_default(),
                                    ));
                                }
                                if control.op == "auth" {
                                    tracing::info!("stream authenticated");
                                } else {
                                    tracing::debug!(op = %control.op, "operation acknowledged");
                                }
                            }
                            Frame::Executions(entries) => {
                                for entry in entries {
                                    let event = ExecutionEvent::from(entry);
                                    deliver_if_new(ctx, sink, &event).await?;
                                }
                            }
                            Frame::Ignored => {
                                tracing::trace!("ignoring unrelated frame");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        self.write.send(Message::Pong(payload)).await?;
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("server sent close frame");
                        return Err(SessionError::Closed);
                    }
                    Some(Ok(_)) => {
                        // Binary and pong frames are not part of this protocol.
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        tracing::info!("stream transport ended");
                        return Err(SessionError::Closed);
                    }
                }
            }
        }
    }

    /// Close the transport gracefully, releasing the connection.
    ///
    /// Close-phase errors are swallowed: the connection is being torn down
    /// either way, and the supervisor's retry path must not depend on a
    /// clean goodbye.
    pub async fn dispose(mut self) {
        if let Err(e) = self.write.close().await {
            tracing::debug!(error = %e, "error closing stream transport");
        }
    }
}

/// Forward `event` to the sink if its identifier has not been seen yet.
async fn deliver_if_new<S: ExecutionSink>(
    ctx: &mut FeedContext,
    sink: &mut S,
    event: &ExecutionEvent,
) -> Result<(), SessionError> {
    if !ctx.seen.observe(&event.exec_id) {
        tracing::debug!(exec_id = %event.exec_id, "duplicate execution suppressed");
        return Ok(());
    }

    ctx.watermark.advance(event.exec_time_ms);
    sink.deliver(event).await.map_err(SessionError::Sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use crate::domain::Side;

    #[derive(Debug, Default)]
    struct RecordingSink {
        delivered: Vec<String>,
    }

    #[async_trait]
    impl ExecutionSink for RecordingSink {
        async fn deliver(&mut self, event: &ExecutionEvent) -> anyhow::Result<()> {
            self.delivered.push(event.exec_id.clone());
            Ok(())
        }
    }

    fn event(id: &str, time_ms: i64) -> ExecutionEvent {
        ExecutionEvent {
            exec_id: id.to_string(),
            symbol: "BTCUSDT".to_string(),
            price: dec!(100),
            qty: dec!(1),
            exec_time_ms: time_ms,
            side: Side::Buy,
        }
    }

    #[tokio::test]
    async fn new_event_is_delivered_and_advances_watermark() {
        let mut ctx = FeedContext::new();
        let mut sink = RecordingSink::default();

        deliver_if_new(&mut ctx, &mut sink, &event("a1", 1_000))
            .await
            .unwrap();

        assert_eq!(sink.delivered, vec!["a1"]);
        assert_eq!(ctx.watermark.get(), 1_000);
    }

    #[tokio::test]
    async fn duplicate_event_is_suppressed() {
        let mut ctx = FeedContext::new();
        let mut sink = RecordingSink::default();

        deliver_if_new(&mut ctx, &mut sink, &event("a1", 1_000))
            .await
            .unwrap();
        deliver_if_new(&mut ctx, &mut sink, &event("a1", 1_000))
            .await
            .unwrap();

        assert_eq!(sink.delivered, vec!["a1"]);
        assert_eq!(ctx.watermark.get(), 1_000);
    }

    #[tokio::test]
    async fn sink_error_propagates_after_marking_seen() {
        struct FailingSink;

        #[async_trait]
        impl ExecutionSink for FailingSink {
            async fn deliver(&mut self, _event: &ExecutionEvent) -> anyhow::Result<()> {
                anyhow::bail!("downstream unavailable")
            }
        }

        let mut ctx = FeedContext::new();
        let mut sink = FailingSink;

        let result = deliver_if_new(&mut ctx, &mut sink, &event("a1", 1_000)).await;
        assert!(matches!(result, Err(SessionError::Sink(_))));
        assert_eq!(ctx.seen.len(), 1);
    }
}
