//! Bybit Adapters
//!
//! Implements the exchange-facing side of the feed client:
//!
//! - **auth**: HMAC-SHA256 signing for stream auth and REST queries
//! - **messages**: wire types for both interfaces
//! - **codec**: inbound frame classification and decoding
//! - **session**: one live WebSocket connection's lifecycle
//! - **recovery**: post-reconnect reconciliation over REST
//! - **reconnect**: backoff schedule between attempts
//! - **supervisor**: the reconnect/recover/stream control loop

pub mod auth;
pub mod codec;
pub mod messages;
pub mod reconnect;
pub mod recovery;
pub mod session;
pub mod supervisor;

pub use auth::{build_auth_frame, sign};
pub use codec::{CodecError, Frame, FrameCodec};
pub use messages::{
    AuthFrame, ControlFrame, ExecutionDataFrame, ExecutionEntry, ExecutionListResponse,
    ExecutionListResult, SubscribeFrame, TOPIC_EXECUTION,
};
pub use reconnect::BackoffPolicy;
pub use recovery::{GapRecovery, RecoveryError};
pub use session::{SessionError, StreamSession};
pub use supervisor::{ConnectionSupervisor, FeedError, SupervisorState};
