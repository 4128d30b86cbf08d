//! # Client Connection Management
//!
//! Allocates connection ids for both listeners and keeps the connection gauges
//! in [`RelayMetrics`] in step with session lifetimes.

use crate::metrics::{ConnectionRole, RelayMetrics};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unique identifier for client connections, shared by both listeners
pub type ConnectionId = u64;

#[derive(Clone)]
pub struct ClientManager {
    /// Connection counter for unique IDs
    connection_counter: Arc<AtomicU64>,
    metrics: Arc<RelayMetrics>,
}

impl ClientManager {
    pub fn new(metrics: Arc<RelayMetrics>) -> Self {
        Self {
            connection_counter: Arc::new(AtomicU64::new(1)),
            metrics,
        }
    }

    /// Add a new connection and return its ID
    pub fn add_connection(&self, role: ConnectionRole) -> ConnectionId {
        let id = self.connection_counter.fetch_add(1, Ordering::SeqCst);
        self.metrics.connection_opened(role);
        id
    }

    pub fn remove_connection(&self, role: ConnectionRole) {
        self.metrics.connection_closed(role);
    }
}
