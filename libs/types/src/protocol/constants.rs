//! Protocol constants and frame geometry
//!
//! These are fundamental values shared by the codec and the relay so that
//! neither has to hard-code offsets or sizes.

/// Header byte every inbox report must carry
pub const REPORT_HEADER: u8 = 0x01;

/// Ack header sent when a report was accepted
pub const ACK_SUCCESS_HEADER: u8 = 0x11;

/// Ack header sent when a report was rejected
pub const ACK_FAIL_HEADER: u8 = 0x12;

/// Message number carried by every fail ack
pub const EMPTY_MESSAGE_NUMBER: u16 = 0;

/// Width of the zero-padded source name and field key columns
pub const NAME_WIDTH: usize = 8;

/// Width of a big-endian field value
pub const FIELD_VALUE_WIDTH: usize = 4;

/// One field entry on the wire: key followed by value
pub const FIELD_ENTRY_SIZE: usize = NAME_WIDTH + FIELD_VALUE_WIDTH;

/// Fixed prefix read before the field entries: header, number, name, status, count
pub const INBOX_PREFIX_SIZE: usize = 1 + 2 + NAME_WIDTH + 1 + 1;

/// Offset of the field count byte inside the prefix
pub const FIELDS_COUNT_OFFSET: usize = INBOX_PREFIX_SIZE - 1;

/// Trailing XOR checksum
pub const CHECKSUM_SIZE: usize = 1;

/// Complete ack frame: header, message number, checksum
pub const OUTBOX_FRAME_SIZE: usize = 1 + 2 + CHECKSUM_SIZE;

/// Default TCP port for report ingestion
pub const DEFAULT_INGEST_PORT: u16 = 8888;

/// Default TCP port for watcher connections
pub const DEFAULT_WATCHER_PORT: u16 = 8889;

/// Total frame length for a report declaring `fields_count` entries
pub const fn inbox_frame_size(fields_count: u8) -> usize {
    INBOX_PREFIX_SIZE + fields_count as usize * FIELD_ENTRY_SIZE + CHECKSUM_SIZE
}
