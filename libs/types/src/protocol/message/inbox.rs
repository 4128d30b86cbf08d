//! Inbox report sent by a telemetry source
//!
//! ```text
//! ┌────────┬────────┬─────────────┬────────┬───────┬──────────────────┬──────────┐
//! │ header │ number │ source name │ status │ count │ count × (key,val)│ checksum │
//! │   1    │   2    │      8      │   1    │   1   │      12 each     │    1     │
//! └────────┴────────┴─────────────┴────────┴───────┴──────────────────┴──────────┘
//! ```

use crate::protocol::constants::REPORT_HEADER;
use crate::protocol::status::{ReportedStatus, SourceStatus};

/// One named reading carried by a report
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub key: String,
    pub value: u32,
}

impl Field {
    pub fn new(key: impl Into<String>, value: u32) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A status report as seen by the relay
///
/// `fields_count` is the count declared on the wire and is kept separately
/// from `fields` so that a mismatch can be detected by validation rather than
/// hidden by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxMessage {
    pub header: u8,
    pub message_number: u16,
    pub source_name: String,
    pub source_status: ReportedStatus,
    pub fields_count: u8,
    pub fields: Vec<Field>,
}

impl InboxMessage {
    /// Build a well-formed report with a matching field count
    ///
    /// More than 255 fields cannot be declared on the wire; the count then
    /// saturates and validation will reject the message.
    pub fn report(
        message_number: u16,
        source_name: impl Into<String>,
        status: SourceStatus,
        fields: Vec<Field>,
    ) -> Self {
        let fields_count = u8::try_from(fields.len()).unwrap_or(u8::MAX);
        Self {
            header: REPORT_HEADER,
            message_number,
            source_name: source_name.into(),
            source_status: ReportedStatus::Known(status),
            fields_count,
            fields,
        }
    }

    /// Status if it is one of the known tags
    pub fn status(&self) -> Option<SourceStatus> {
        self.source_status.known()
    }
}
