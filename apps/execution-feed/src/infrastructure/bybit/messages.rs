//! Bybit Wire Message Types
//!
//! Wire format types for the private WebSocket stream and the REST
//! execution-list endpoint. Both interfaces report executions in the same
//! shape, so one `ExecutionEntry` covers the stream's `data` array and the
//! REST response's `result.list`.
//!
//! # Message Types
//!
//! ## Outbound (WebSocket)
//! - `AuthFrame`: `{"op":"auth","args":[apiKey, expires, signature]}`
//! - `SubscribeFrame`: `{"op":"subscribe","args":["execution"]}`
//!
//! ## Inbound (WebSocket)
//! - Control frames: objects carrying an `op` field (auth/subscribe acks)
//! - Data frames: objects carrying `topic` and a `data` array of executions
//!
//! ## REST
//! - `ExecutionListResponse`: `{retCode, retMsg, result: {list: [...]}}`
//!
//! Price, quantity, and timestamp fields are decimal strings on the wire;
//! prices and quantities parse into `rust_decimal::Decimal` (never through
//! binary floating point), timestamps into `i64` milliseconds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{ExecutionEvent, Side};

// =============================================================================
// Outbound Frames
// =============================================================================

/// Topic carrying private execution events.
pub const TOPIC_EXECUTION: &str = "execution";

/// Authentication frame sent immediately after connecting.
///
/// # Wire Format (JSON)
/// ```json
/// {"op":"auth","args":["api-key", 1700000010000, "signature-hex"]}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AuthFrame {
    /// Operation name (always `"auth"`).
    pub op: &'static str,
    /// API key, expiry deadline (epoch ms), and signature.
    pub args: (String, i64, String),
}

impl AuthFrame {
    /// Create an auth frame from its parts.
    #[must_use]
    pub const fn new(api_key: String, expires_ms: i64, signature: String) -> Self {
        Self {
            op: "auth",
            args: (api_key, expires_ms, signature),
        }
    }
}

/// Subscription frame sent after authentication.
///
/// # Wire Format (JSON)
/// ```json
/// {"op":"subscribe","args":["execution"]}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeFrame {
    /// Operation name (always `"subscribe"`).
    pub op: &'static str,
    /// Topics to subscribe to.
    pub args: Vec<&'static str>,
}

impl SubscribeFrame {
    /// Subscribe to the private execution topic.
    #[must_use]
    pub fn execution() -> Self {
        Self {
            op: "subscribe",
            args: vec![TOPIC_EXECUTION],
        }
    }
}

// =============================================================================
// Inbound Frames
// =============================================================================

/// Control frame acknowledging an operation.
///
/// # Wire Format (JSON)
/// ```json
/// {"success":true,"ret_msg":"","op":"auth","conn_id":"..."}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ControlFrame {
    /// Operation being acknowledged (`"auth"`, `"subscribe"`, ...).
    pub op: String,
    /// Whether the operation succeeded, when the server reports it.
    #[serde(default)]
    pub success: Option<bool>,
    /// Server-provided detail message.
    #[serde(default)]
    pub ret_msg: Option<String>,
}

impl ControlFrame {
    /// Whether this frame reports an explicit failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }
}

/// Data frame carrying execution events.
///
/// # Wire Format (JSON)
/// ```json
/// {"topic":"execution","data":[{"execId":"...","symbol":"BTCUSDT",...}]}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionDataFrame {
    /// Topic the frame belongs to.
    pub topic: String,
    /// Execution entries, zero or more.
    #[serde(default)]
    pub data: Vec<ExecutionEntry>,
}

/// One execution as both interfaces encode it.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionEntry {
    /// Exchange-assigned execution identifier.
    #[serde(rename = "execId")]
    pub exec_id: String,
    /// Trading symbol.
    pub symbol: String,
    /// Execution time, decimal-string epoch milliseconds.
    #[serde(rename = "execTime", deserialize_with = "de_string_millis")]
    pub exec_time_ms: i64,
    /// Fill price, decimal string.
    #[serde(rename = "execPrice", with = "rust_decimal::serde::str")]
    pub exec_price: Decimal,
    /// Fill quantity, decimal string.
    #[serde(rename = "execQty", with = "rust_decimal::serde::str")]
    pub exec_qty: Decimal,
    /// Side of the fill.
    pub side: Side,
}

impl From<ExecutionEntry> for ExecutionEvent {
    fn from(entry: ExecutionEntry) -> Self {
        Self {
            exec_id: entry.exec_id,
            symbol: entry.symbol,
            price: entry.exec_price,
            qty: entry.exec_qty,
            exec_time_ms: entry.exec_time_ms,
            side: entry.side,
        }
    }
}

// =============================================================================
// REST Response Types
// =============================================================================

/// Envelope of the `/v5/execution/list` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionListResponse {
    /// API status code; zero means success.
    #[serde(rename = "retCode", default)]
    pub ret_code: i64,
    /// API status message.
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    /// Result payload; absent on some error responses.
    #[serde(default)]
    pub result: Option<ExecutionListResult>,
}

/// Result payload of the `/v5/execution/list` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionListResult {
    /// Executions in API order, assumed chronological per symbol.
    #[serde(default)]
    pub list: Vec<ExecutionEntry>,
}

/// Deserialize a decimal-string-encoded millisecond timestamp.
fn de_string_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<i64>().map_err(serde::de::Error::custom)
}
