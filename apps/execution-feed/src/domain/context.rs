//! Shared Delivery Context
//!
//! Bundles the state that must survive across connections: the dedup guard
//! and the watermark. The supervisor owns one `FeedContext` for the life of
//! the process and lends it mutably to whichever data path is currently
//! active. Neither subordinate retains it past its own scope, which keeps
//! the single-writer guarantee without ambient globals.

use super::dedup::DedupGuard;
use super::watermark::Watermark;

/// Delivery state shared between the live stream and gap recovery.
#[derive(Debug, Default)]
pub struct FeedContext {
    /// Identifiers already delivered to the sink.
    pub seen: DedupGuard,
    /// Timestamp of the most recently delivered execution.
    pub watermark: Watermark,
}

impl FeedContext {
    /// Create a fresh context with no delivery history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
