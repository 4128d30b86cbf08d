//! # Relay Metrics
//!
//! Process-wide counters shared by every session. Updates are lock-free
//! atomics; [`RelayMetrics::snapshot`] produces a plain serializable copy for
//! logging.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Which listener a connection arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRole {
    Ingest,
    Watcher,
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ingest => "ingest",
            Self::Watcher => "watcher",
        })
    }
}

/// Outcome of delivering one report to the registered watchers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Live counters
#[derive(Debug)]
pub struct RelayMetrics {
    reports_accepted: AtomicU64,
    reports_rejected: AtomicU64,
    broadcasts: AtomicU64,
    broadcast_failures: AtomicU64,
    ingest_connections_total: AtomicU64,
    ingest_connections_active: AtomicU64,
    watcher_connections_total: AtomicU64,
    watcher_connections_active: AtomicU64,
    started_at: Instant,
}

/// Point-in-time copy of [`RelayMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub reports_accepted: u64,
    pub reports_rejected: u64,
    /// Successful per-watcher deliveries
    pub broadcasts: u64,
    pub broadcast_failures: u64,
    pub ingest_connections_total: u64,
    pub ingest_connections_active: u64,
    pub watcher_connections_total: u64,
    pub watcher_connections_active: u64,
    pub uptime_seconds: u64,
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self {
            reports_accepted: AtomicU64::new(0),
            reports_rejected: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            broadcast_failures: AtomicU64::new(0),
            ingest_connections_total: AtomicU64::new(0),
            ingest_connections_active: AtomicU64::new(0),
            watcher_connections_total: AtomicU64::new(0),
            watcher_connections_active: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn record_accepted(&self) {
        self.reports_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.reports_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_broadcast(&self, report: BroadcastReport) {
        self.broadcasts
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.broadcast_failures
            .fetch_add(report.failed as u64, Ordering::Relaxed);
    }

    pub fn connection_opened(&self, role: ConnectionRole) {
        let (total, active) = self.connection_counters(role);
        total.fetch_add(1, Ordering::Relaxed);
        active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self, role: ConnectionRole) {
        let (_, active) = self.connection_counters(role);
        // gauge never goes below zero
        let _ = active.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    fn connection_counters(&self, role: ConnectionRole) -> (&AtomicU64, &AtomicU64) {
        match role {
            ConnectionRole::Ingest => (
                &self.ingest_connections_total,
                &self.ingest_connections_active,
            ),
            ConnectionRole::Watcher => (
                &self.watcher_connections_total,
                &self.watcher_connections_active,
            ),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reports_accepted: self.reports_accepted.load(Ordering::Relaxed),
            reports_rejected: self.reports_rejected.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            broadcast_failures: self.broadcast_failures.load(Ordering::Relaxed),
            ingest_connections_total: self.ingest_connections_total.load(Ordering::Relaxed),
            ingest_connections_active: self.ingest_connections_active.load(Ordering::Relaxed),
            watcher_connections_total: self.watcher_connections_total.load(Ordering::Relaxed),
            watcher_connections_active: self.watcher_connections_active.load(Ordering::Relaxed),
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }
}

impl MetricsSnapshot {
    /// Accepted reports / all reports
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.reports_accepted + self.reports_rejected;
        if total == 0 {
            0.0
        } else {
            self.reports_accepted as f64 / total as f64
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelayMetrics {{ reports: {}/{} accepted ({}%), deliveries: {} ok / {} failed, sources: {} active, watchers: {} active, uptime: {}s }}",
            self.reports_accepted,
            self.reports_accepted + self.reports_rejected,
            (self.acceptance_rate() * 100.0) as u32,
            self.broadcasts,
            self.broadcast_failures,
            self.ingest_connections_active,
            self.watcher_connections_active,
            self.uptime_seconds
        )
    }
}

impl fmt::Display for RelayMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}
