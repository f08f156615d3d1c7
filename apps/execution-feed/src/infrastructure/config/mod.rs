//! Configuration Module
//!
//! Environment-driven settings for the execution feed client.

mod settings;

pub use settings::{
    BackoffSettings, ConfigError, ConnectionOptions, Credentials, FeedConfig, RecoverySettings,
};
