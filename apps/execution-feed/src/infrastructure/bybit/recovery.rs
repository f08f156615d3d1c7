//! Gap Recovery Service
//!
//! After a reconnect, reconciles the window of executions missed while
//! disconnected by querying the REST execution-list endpoint, symbol by
//! symbol, and feeding unseen results through the same dedup guard and sink
//! as the live stream.
//!
//! Symbols are reconciled **sequentially**: recovery for one symbol
//! completes fully before the next begins, and the first failed query
//! aborts the pass for all remaining symbols. The supervisor retries the
//! whole pass from the last watermark on the next reconnect.

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::auth::sign;
use super::messages::{ExecutionEntry, ExecutionListResponse};
use crate::application::ports::ExecutionSink;
use crate::domain::{ExecutionEvent, FeedContext};
use crate::infrastructure::config::{ConnectionOptions, Credentials, RecoverySettings};

/// REST path of the historical executions endpoint.
const EXECUTION_LIST_PATH: &str = "/v5/execution/list";

// =============================================================================
// Error Type
// =============================================================================

/// Errors that abort a recovery pass.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// Transport-level HTTP failure (connect, send, or body decode).
    #[error("recovery query transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success HTTP status.
    #[error("recovery query failed with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for the log.
        body: String,
    },

    /// Endpoint answered 200 but reported an API-level error.
    #[error("recovery query rejected by API (retCode {code}): {message}")]
    Api {
        /// API status code.
        code: i64,
        /// API status message.
        message: String,
    },

    /// Downstream sink failed to accept a delivery.
    #[error("execution sink error: {0}")]
    Sink(#[source] anyhow::Error),

    /// Cancellation was requested; not a fault.
    #[error("recovery cancelled")]
    Cancelled,
}

// =============================================================================
// Gap Recovery
// =============================================================================

/// Queries the execution-list endpoint to close a delivery gap.
pub struct GapRecovery {
    http: reqwest::Client,
    credentials: Credentials,
    rest_url: String,
    symbols: Vec<String>,
    recv_window_ms: u64,
}

impl GapRecovery {
    /// Create a recovery service over the configured symbols.
    #[must_use]
    pub fn new(options: &ConnectionOptions, settings: &RecoverySettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials: options.credentials.clone(),
            rest_url: options.rest_url.clone(),
            symbols: settings.symbols.clone(),
            recv_window_ms: settings.recv_window_ms,
        }
    }

    /// Reconcile executions missed since `since_ms`.
    ///
    /// A zero `since_ms` means no execution has ever been delivered; it is
    /// replaced with the current wall-clock time so the first connection
    /// never queries backwards in history.
    ///
    /// Returns the maximum execution timestamp observed across all symbols,
    /// or the (possibly substituted) `since_ms` when nothing new was seen.
    ///
    /// # Errors
    ///
    /// The first failed query aborts the pass; remaining symbols are not
    /// queried. Sink failures and cancellation abort identically.
    pub async fn recover<S: ExecutionSink>(
        &self,
        ctx: &mut FeedContext,
        sink: &mut S,
        since_ms: i64,
        cancel: &CancellationToken,
    ) -> Result<i64, RecoveryError> {
        let since_ms = if since_ms == 0 {
            Utc::now().timestamp_millis()
        } else {
            since_ms
        };
        let mut latest_ms = since_ms;

        for symbol in &self.symbols {
            if cancel.is_cancelled() {
                return Err(RecoveryError::Cancelled);
            }

            tracing::info!(symbol = %symbol, since_ms, "recovering missed executions");

            let entries = tokio::select! {
                () = cancel.cancelled() => return Err(RecoveryError::Cancelled),
                result = self.fetch_executions(symbol, since_ms) => result?,
            };

            let Some(entries) = entries else {
                tracing::warn!(symbol = %symbol, "query response missing result payload");
                continue;
            };

            let mut recovered = 0_usize;
            for entry in entries {
                let event = ExecutionEvent::from(entry);
                if !ctx.seen.observe(&event.exec_id) {
                    continue;
                }

                latest_ms = latest_ms.max(event.exec_time_ms);
                sink.deliver(&event).await.map_err(RecoveryError::Sink)?;
                recovered += 1;
            }

            tracing::info!(symbol = %symbol, recovered, "recovery pass complete");
        }

        Ok(latest_ms)
    }

    /// Issue one signed execution-list query.
    ///
    /// Returns `None` when the envelope is successful but carries no result
    /// payload; that symbol is skipped rather than failing the pass.
    async fn fetch_executions(
        &self,
        symbol: &str,
        since_ms: i64,
    ) -> Result<Option<Vec<ExecutionEntry>>, RecoveryError> {
        let query = build_query(symbol, since_ms);
        let url = format!("{}{EXECUTION_LIST_PATH}?{query}", self.rest_url);

        let timestamp = Utc::now().timestamp_millis();
        let payload = format!(
            "{timestamp}{}{}{query}",
            self.credentials.api_key(),
            self.recv_window_ms
        );
        let signature = sign(self.credentials.api_secret(), &payload);

        let response = self
            .http
            .get(&url)
            .header("X-BAPI-API-KEY", self.credentials.api_key())
            .header("X-BAPI-TIMESTAMP", timestamp.to_string())
            .header("X-BAPI-RECV-WINDOW", self.recv_window_ms.to_string())
            .header("X-BAPI-SIGN", signature)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecoveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ExecutionListResponse = response.json().await?;
        if envelope.ret_code != 0 {
            return Err(RecoveryError::Api {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }

        Ok(envelope.result.map(|result| result.list))
    }
}

/// Build the execution-list query string for one symbol.
///
/// Linear (USDT perpetual) category only; the query string is also the
/// signed payload's tail, so its field order is fixed.
fn build_query(symbol: &str, since_ms: i64) -> String {
    format!("category=linear&symbol={symbol}&startTime={since_ms}")
}
