//! Shared relay state handed to every session

use crate::cache::StatusCache;
use crate::registry::WatcherRegistry;
use crate::metrics::RelayMetrics;
use std::sync::Arc;

/// Status cache, watcher registry and metrics for one relay instance
///
/// Cloning is cheap; every clone refers to the same state.
#[derive(Debug, Clone, Default)]
pub struct RelayState {
    pub cache: Arc<StatusCache>,
    pub watchers: Arc<WatcherRegistry>,
    pub metrics: Arc<RelayMetrics>,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }
}
