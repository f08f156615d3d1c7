//! Connection Supervisor
//!
//! The outer control loop that keeps the execution feed alive for the life
//! of the process. It owns the state that must survive reconnects (dedup
//! guard, watermark, attempt counter) and lends it to one subordinate at a
//! time, so the live stream and the recovery pass can never race each other.
//!
//! # Lifecycle
//!
//! ```text
//! Idle → Connecting → [Recovering, attempt > 1] → Streaming ─┐
//!          ▲                                                 │ close/error
//!          └────────────────── Backoff ◄─────────────────────┘
//!
//! Cancellation at any point → Cancelled (terminal, no backoff)
//! ```
//!
//! Every session is disposed before the next attempt, so at most one live
//! transport exists at a time. Recovery runs only on reconnects: the first
//! successful connection has no gap to close.

use tokio_util::sync::CancellationToken;

use super::reconnect::BackoffPolicy;
use super::recovery::{GapRecovery, RecoveryError};
use super::session::{SessionError, StreamSession};
use crate::application::ports::ExecutionSink;
use crate::domain::FeedContext;
use crate::infrastructure::config::{ConnectionOptions, FeedConfig};

// =============================================================================
// Supervisor State
// =============================================================================

/// State of the supervisor's connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorState {
    /// Not yet started.
    #[default]
    Idle,
    /// Opening a stream session.
    Connecting,
    /// Reconciling missed executions after a reconnect.
    Recovering,
    /// Live receive loop is running.
    Streaming,
    /// Waiting out the delay before the next attempt.
    Backoff,
    /// Cancellation observed; no further attempts. Terminal.
    Cancelled,
}

impl SupervisorState {
    /// State name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Recovering => "recovering",
            Self::Streaming => "streaming",
            Self::Backoff => "backoff",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the supervisor will make no further attempts.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// =============================================================================
// Error Type
// =============================================================================

/// Failure of one connection attempt, caught at the supervisor boundary.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The stream session failed or was closed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The recovery pass failed.
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
}

impl FeedError {
    /// Whether this failure originated from cancellation.
    ///
    /// Cancellation-originated unwinds terminate the supervisor immediately
    /// without backoff; everything else is retried.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Session(SessionError::Cancelled) | Self::Recovery(RecoveryError::Cancelled)
        )
    }
}

// =============================================================================
// Connection Supervisor
// =============================================================================

/// Supervises stream sessions, gap recovery, and reconnect backoff.
pub struct ConnectionSupervisor<S> {
    options: ConnectionOptions,
    recovery: GapRecovery,
    backoff: BackoffPolicy,
    sink: S,
    cancel: CancellationToken,
    ctx: FeedContext,
    attempts: u32,
    state: SupervisorState,
}

impl<S: ExecutionSink> ConnectionSupervisor<S> {
    /// Create a supervisor from configuration.
    #[must_use]
    pub fn new(config: &FeedConfig, sink: S, cancel: CancellationToken) -> Self {
        Self {
            options: config.connection.clone(),
            recovery: GapRecovery::new(&config.connection, &config.recovery),
            backoff: BackoffPolicy::new(&config.backoff),
            sink,
            cancel,
            ctx: FeedContext::new(),
            attempts: 0,
            state: SupervisorState::Idle,
        }
    }

    /// Run until cancelled, reconnecting through every transient fault.
    ///
    /// Returns the final watermark (epoch ms of the last delivered
    /// execution, zero if none), a resume point for callers that persist
    /// one.
    pub async fn run(mut self) -> i64 {
        tracing::info!("execution feed supervisor starting");

        loop {
            if self.cancel.is_cancelled() {
                self.transition(SupervisorState::Cancelled);
                break;
            }

            self.attempts += 1;
            self.transition(SupervisorState::Connecting);
            tracing::info!(attempt = self.attempts, "connecting");

            match self.run_attempt().await {
                Ok(()) => {
                    tracing::info!(attempt = self.attempts, "stream session ended");
                }
                Err(e) if e.is_cancellation() => {
                    self.transition(SupervisorState::Cancelled);
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt = self.attempts, "connection attempt failed");
                }
            }

            if self.cancel.is_cancelled() {
                self.transition(SupervisorState::Cancelled);
                break;
            }

            let delay = self.backoff.delay_for_attempt(self.attempts);
            self.transition(SupervisorState::Backoff);
            tracing::info!(
                delay_ms = delay.as_millis(),
                attempt = self.attempts,
                "reconnecting after backoff"
            );

            tokio::select! {
                () = self.cancel.cancelled() => {
                    self.transition(SupervisorState::Cancelled);
                    break;
                }
                () = tokio::time::sleep(delay) => {}
            }
        }

        let watermark = self.ctx.watermark.get();
        tracing::info!(
            watermark,
            delivered = self.ctx.seen.len(),
            "execution feed supervisor stopped"
        );
        watermark
    }

    /// One full connection attempt: connect, recover if reconnecting,
    /// stream, and dispose the session on every exit path.
    async fn run_attempt(&mut self) -> Result<(), FeedError> {
        let mut session = tokio::select! {
            () = self.cancel.cancelled() => return Err(SessionError::Cancelled.into()),
            result = StreamSession::connect(&self.options) => result?,
        };

        let outcome = self.drive(&mut session).await;
        session.dispose().await;
        outcome
    }

    /// Recovery (on reconnects) followed by the live receive loop.
    async fn drive(&mut self, session: &mut StreamSession) -> Result<(), FeedError> {
        if self.attempts > 1 {
            self.transition(SupervisorState::Recovering);

            let since_ms = self.ctx.watermark.get();
            let latest_ms = self
                .recovery
                .recover(&mut self.ctx, &mut self.sink, since_ms, &self.cancel)
                .await?;

            // The recovered timestamp becomes the new watermark even when
            // nothing was recovered: the window up to it has been checked.
            self.ctx.watermark.advance(latest_ms);
        }

        self.transition(SupervisorState::Streaming);
        session
            .stream(&mut self.ctx, &mut self.sink, &self.cancel)
            .await?;

        Ok(())
    }

    fn transition(&mut self, next: SupervisorState) {
        if self.state != next {
            tracing::debug!(
                from = self.state.as_str(),
                to = next.as_str(),
                "supervisor state change"
            );
            self.state = next;
        }
    }
}
