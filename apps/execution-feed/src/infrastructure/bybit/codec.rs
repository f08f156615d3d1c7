//! Stream Frame Codec
//!
//! Classifies and decodes text frames from the private WebSocket stream.
//!
//! Frames fall into three classes:
//!
//! - **Control**: objects with an `op` field (auth/subscribe acks),
//!   consumed by the session and never forwarded downstream
//! - **Data**: objects with `topic == "execution"` and a `data` array of
//!   execution entries
//! - **Ignored**: anything else (other topics, heartbeat payloads)

use super::messages::{ControlFrame, ExecutionDataFrame, ExecutionEntry, TOPIC_EXECUTION};

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame is valid JSON but not an object.
    #[error("invalid frame format: expected JSON object, got {0}")]
    InvalidFormat(String),
}

/// Decoded classification of one inbound text frame.
#[derive(Debug)]
pub enum Frame {
    /// Operation acknowledgement; consumed by the session.
    Control(ControlFrame),
    /// Execution events from the subscribed topic.
    Executions(Vec<ExecutionEntry>),
    /// Frame of no interest to this client.
    Ignored,
}

/// JSON codec for the private stream.
#[derive(Debug, Default, Clone)]
pub struct FrameCodec;

impl FrameCodec {
    /// Create a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Classify and decode a text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not valid JSON, is not an object,
    /// or carries an execution payload that fails to decode.
    pub fn decode(&self, text: &str) -> Result<Frame, CodecError> {
        let value: serde_json::Value = serde_json::from_str(text)?;

        if !value.is_object() {
            return Err(CodecError::InvalidFormat(kind_of(&value).to_string()));
        }

        // Control frames are identified by the presence of `op`.
        if value.get("op").is_some() {
            let control: ControlFrame = serde_json::from_value(value)?;
            return Ok(Frame::Control(control));
        }

        match value.get("topic").and_then(|t| t.as_str()) {
            Some(TOPIC_EXECUTION) => {
                let frame: ExecutionDataFrame = serde_json::from_value(value)?;
                Ok(Frame::Executions(frame.data))
            }
            _ => Ok(Frame::Ignored),
        }
    }
}

/// Human-readable JSON value kind for error messages.
const fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
