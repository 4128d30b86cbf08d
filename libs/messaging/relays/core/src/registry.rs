//! # Watcher Registry
//!
//! The set of watchers that receive live notifications, kept in registration
//! order.
//!
//! ## Delivery Model
//! - Membership is guarded by a `parking_lot` mutex that is held only long
//!   enough to clone the member list; no lock is held across an `.await`.
//! - Each watcher's output half sits behind its own async mutex. All lines of
//!   one report are written under that lock, so two concurrent broadcasts never
//!   interleave on a watcher.
//! - Recipients are written sequentially. A slow watcher delays the
//!   broadcasting ingest session.
//! - A failed write is logged and counted; the watcher stays registered until
//!   its own session notices the disconnect.

use crate::common::client::ConnectionId;
use crate::metrics::BroadcastReport;
use bytes::Bytes;
use codec::render_field_lines;
use parking_lot::Mutex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use types::InboxMessage;

type WatcherSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Shared handle to one watcher's output half
///
/// Identity is the connection id alone.
#[derive(Clone)]
pub struct WatcherHandle {
    id: ConnectionId,
    sink: Arc<tokio::sync::Mutex<WatcherSink>>,
}

impl WatcherHandle {
    pub fn new<W>(id: ConnectionId, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            id,
            sink: Arc::new(tokio::sync::Mutex::new(Box::new(writer))),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Write all lines and flush while holding this watcher's write lock
    pub async fn send_lines(&self, lines: &[Bytes]) -> io::Result<()> {
        let mut sink = self.sink.lock().await;
        for line in lines {
            sink.write_all(line).await?;
        }
        sink.flush().await
    }
}

impl PartialEq for WatcherHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WatcherHandle {}

impl Hash for WatcherHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle").field("id", &self.id).finish()
    }
}

#[derive(Debug, Default)]
pub struct WatcherRegistry {
    members: Mutex<Vec<WatcherHandle>>,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a watcher; re-adding a known id is a no-op
    pub fn add(&self, handle: WatcherHandle) {
        let mut members = self.members.lock();
        if !members.contains(&handle) {
            members.push(handle);
        }
    }

    /// Returns whether the watcher was registered
    pub fn remove(&self, handle: &WatcherHandle) -> bool {
        let mut members = self.members.lock();
        let before = members.len();
        members.retain(|member| member != handle);
        members.len() != before
    }

    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Send one notification line per field of `message` to every watcher
    /// registered at the time of the call
    pub async fn broadcast(&self, message: &InboxMessage) -> BroadcastReport {
        let lines = render_field_lines(message);
        let recipients = self.members.lock().clone();

        let mut report = BroadcastReport::default();
        for watcher in &recipients {
            match watcher.send_lines(&lines).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        connection_id = watcher.id(),
                        error = %e,
                        "Failed to notify watcher"
                    );
                    report.failed += 1;
                }
            }
        }

        debug!(
            source = %message.source_name,
            lines = lines.len(),
            delivered = report.delivered,
            failed = report.failed,
            "Broadcast report"
        );
        report
    }
}
