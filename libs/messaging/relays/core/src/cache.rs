//! Latest status per source
//!
//! Process-lifetime map from source name to its most recent accepted report.
//! Entries are only ever inserted or overwritten.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use types::{SourceStatistics, SourceStatus};

#[derive(Debug, Default)]
pub struct StatusCache {
    entries: RwLock<BTreeMap<String, SourceStatistics>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted report, replacing any previous entry for `name`
    pub fn upsert(&self, name: &str, status: SourceStatus, message_number: u16, timestamp_ms: i64) {
        let stats = SourceStatistics::new(name, status, message_number, timestamp_ms);
        self.entries.write().insert(name.to_owned(), stats);
    }

    /// Copy of every entry, ordered by source name
    pub fn snapshot(&self) -> Vec<SourceStatistics> {
        self.entries.read().values().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<SourceStatistics> {
        self.entries.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_upsert_overwrites() {
        let cache = StatusCache::new();
        assert!(cache.is_empty());

        cache.upsert("ALPHA", SourceStatus::Idle, 1, 100);
        cache.upsert("ALPHA", SourceStatus::Recharge, 2, 200);

        assert_eq!(cache.len(), 1);
        let alpha = cache.get("ALPHA").unwrap();
        assert_eq!(alpha.status, SourceStatus::Recharge);
        assert_eq!(alpha.last_message_number, 2);
        assert_eq!(alpha.last_message_timestamp_ms, 200);
    }

    #[test]
    fn test_snapshot_sorted_by_name() {
        let cache = StatusCache::new();
        cache.upsert("charlie", SourceStatus::Idle, 1, 0);
        cache.upsert("ALPHA", SourceStatus::Active, 1, 0);
        cache.upsert("bravo", SourceStatus::Idle, 1, 0);

        let names: Vec<_> = cache.snapshot().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["ALPHA", "bravo", "charlie"]);
    }

    #[test]
    fn test_concurrent_upserts() {
        let cache = Arc::new(StatusCache::new());
        let writers: Vec<_> = (0..8u16)
            .map(|n| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.upsert(&format!("src{n}"), SourceStatus::Active, i, i64::from(i));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(cache.len(), 8);
        assert!(cache
            .snapshot()
            .iter()
            .all(|s| s.last_message_number == 99));
    }
}
