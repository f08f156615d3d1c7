//! Port Interfaces
//!
//! Driven port for the downstream execution consumer, following the
//! Hexagonal Architecture pattern. The live stream and the recovery path
//! both deliver through this port, which is what the exactly-once guarantee
//! is stated against: `deliver` is invoked in delivery order, at most once
//! per distinct execution identifier, and awaited before the next event is
//! processed.

use async_trait::async_trait;

use crate::domain::ExecutionEvent;

/// Downstream consumer of deduplicated execution events.
///
/// Implementations may perform I/O and may suspend; the core awaits each
/// delivery before processing the next event. A returned error is treated
/// as a failure of the active data path and surfaces at the supervisor,
/// which tears the connection down and retries.
#[async_trait]
pub trait ExecutionSink: Send {
    /// Deliver one execution event.
    async fn deliver(&mut self, event: &ExecutionEvent) -> anyhow::Result<()>;
}
