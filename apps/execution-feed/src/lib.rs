#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Execution Feed - Bybit Private Stream Client
//!
//! A resilient client for Bybit's private execution stream. It delivers
//! every trade fill to a downstream sink exactly once (no duplicates, no
//! silent gaps) and survives connection loss by reconciling the missed
//! window over REST before resuming the stream.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Delivery state with no external dependencies
//!   - `execution`: The execution event record
//!   - `dedup`: Idempotency guard over execution identifiers
//!   - `watermark`: Last-delivered-execution timestamp
//!
//! - **Application**: Port definitions
//!   - `ports`: The `ExecutionSink` consumer contract
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `bybit`: WebSocket session, REST recovery, supervision
//!   - `config`: Environment-driven settings
//!   - `telemetry`: Tracing setup
//!
//! # Data Flow
//!
//! ```text
//!  Bybit private WS ──► Stream Session ──┐
//!                                        ├──► Dedup Guard ──► Sink
//!  Bybit REST ───────► Gap Recovery  ────┘         │
//!                            ▲                     ▼
//!                            └───────────────  Watermark
//! ```
//!
//! The supervisor serializes the two data paths: recovery runs to
//! completion before streaming resumes, and both share one dedup guard, so
//! the merged sequence is duplicate-free.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Delivery state with no external dependencies.
pub mod domain;

/// Application layer - Port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::{DedupGuard, ExecutionEvent, FeedContext, Side, Watermark};

// Consumer port
pub use application::ports::ExecutionSink;

// Infrastructure config
pub use infrastructure::config::{
    BackoffSettings, ConfigError, ConnectionOptions, Credentials, FeedConfig, RecoverySettings,
};

// Bybit adapters (for integration tests)
pub use infrastructure::bybit::{
    BackoffPolicy, ConnectionSupervisor, FeedError, GapRecovery, RecoveryError, SessionError,
    StreamSession, SupervisorState,
};

// Telemetry
pub use infrastructure::telemetry::init as init_telemetry;
