//! Tracing Initialization
//!
//! Installs the global tracing subscriber for structured console logging.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter directives (default: `info`)

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the tracing subscriber.
///
/// Honors `RUST_LOG` when set, defaulting to `info` otherwise. Safe to call
/// once at process startup; subsequent calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
