//! Bybit Request Signing
//!
//! HMAC-SHA256 signing shared by the WebSocket authentication frame and the
//! REST recovery queries.
//!
//! # Authentication Flow (private WebSocket)
//!
//! 1. Connect to the private stream endpoint
//! 2. Send `{"op":"auth","args":[apiKey, expires, signature]}` where
//!    `expires` is a millisecond deadline shortly in the future and
//!    `signature = HMAC-SHA256(secret, "GET/realtime" + expires)`
//! 3. Receive `{"op":"auth","success":true,...}` on the stream
//!
//! # REST Signing
//!
//! Signed headers carry `HMAC-SHA256(secret, timestamp + apiKey +
//! recvWindow + queryString)`, hex-encoded lowercase.
//!
//! # References
//!
//! - [Bybit WebSocket Auth](https://bybit-exchange.github.io/docs/v5/ws/connect)
//! - [Bybit REST Auth](https://bybit-exchange.github.io/docs/v5/guide)

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::messages::AuthFrame;
use crate::infrastructure::config::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// How far in the future the auth frame's `expires` deadline is set.
/// Bybit rejects auth frames whose deadline has already passed.
pub const AUTH_EXPIRY: Duration = Duration::from_millis(10_000);

/// Payload prefix signed for WebSocket authentication.
const AUTH_PAYLOAD_PREFIX: &str = "GET/realtime";

/// Sign a message with HMAC-SHA256, returning lowercase hex.
///
/// Deterministic and stateless: the same secret and message always produce
/// the same signature.
#[allow(clippy::expect_used)]
#[must_use]
pub fn sign(secret: &str, message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Build the WebSocket authentication frame.
///
/// `now_ms` is the current wall-clock time in epoch milliseconds; it is a
/// parameter rather than read internally so the frame is deterministic
/// under test.
#[must_use]
pub fn build_auth_frame(credentials: &Credentials, now_ms: i64) -> AuthFrame {
    #[allow(clippy::cast_possible_wrap)]
    let expires = now_ms + AUTH_EXPIRY.as_millis() as i64;
    let signature = sign(
        credentials.api_secret(),
        &format!("{AUTH_PAYLOAD_PREFIX}{expires}"),
    );

    AuthFrame::new(credentials.api_key().to_string(), expires, signature)
}
