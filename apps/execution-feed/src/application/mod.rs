//! Application Layer - Port definitions.
//!
//! Defines the contract between the delivery core and the downstream
//! consumer. The core has no opinion about where executions end up
//! (console, queue, database); it only requires an `ExecutionSink`.

/// Port interfaces for downstream consumers.
pub mod ports;
