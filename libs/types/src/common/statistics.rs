//! Latest known state of a telemetry source

use crate::protocol::status::SourceStatus;

/// Snapshot kept per source name; overwritten by every accepted report
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceStatistics {
    pub name: String,
    pub status: SourceStatus,
    pub last_message_number: u16,
    /// Milliseconds since the Unix epoch
    pub last_message_timestamp_ms: i64,
}

impl SourceStatistics {
    pub fn new(
        name: impl Into<String>,
        status: SourceStatus,
        last_message_number: u16,
        last_message_timestamp_ms: i64,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            last_message_number,
            last_message_timestamp_ms,
        }
    }

    /// Milliseconds elapsed since the last report, clamped at zero for clock skew
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.last_message_timestamp_ms).max(0)
    }
}
