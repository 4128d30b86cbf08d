//! # Telemetry Relay Core
//!
//! Shared infrastructure for the relay process: configuration, the status
//! cache and watcher registry, the two session kinds and the relay engine
//! that accepts connections for them.

pub mod cache;
pub mod common;
pub mod config;
pub mod metrics;
pub mod registry;
pub mod sessions;
pub mod state;

// Re-export commonly used types
pub use cache::StatusCache;
pub use common::client::{ClientManager, ConnectionId};
pub use common::Relay;
pub use config::*;
pub use metrics::*;
pub use registry::{WatcherHandle, WatcherRegistry};
pub use sessions::{run_ingest_session, run_watcher_session};
pub use state::RelayState;

/// Relay-specific errors
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for relay operations
pub type RelayResult<T> = std::result::Result<T, RelayError>;
