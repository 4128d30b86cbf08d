//! Watcher text lines
//!
//! Two line formats, both 7-bit ASCII and CR-LF terminated:
//!
//! ```text
//! [<name>] <lastMessageNumber> | <STATUS> | <ageMs>    initial cache dump
//! [<name>] <fieldKey> | <fieldValue>                   live notification
//! ```
//!
//! Non-ASCII characters are dropped, never escaped.

use bytes::Bytes;
use types::{InboxMessage, SourceStatistics};

/// One cache entry as sent to a newly connected watcher
pub fn render_stat_line(stat: &SourceStatistics, now_ms: i64) -> Bytes {
    ascii_line(format!(
        "[{}] {} | {} | {}\r\n",
        stat.name,
        stat.last_message_number,
        stat.status,
        stat.age_ms(now_ms)
    ))
}

/// One notification line per field of an accepted report, in field order
pub fn render_field_lines(message: &InboxMessage) -> Vec<Bytes> {
    message
        .fields
        .iter()
        .map(|field| {
            ascii_line(format!(
                "[{}] {} | {}\r\n",
                message.source_name, field.key, field.value
            ))
        })
        .collect()
}

fn ascii_line(line: String) -> Bytes {
    if line.is_ascii() {
        Bytes::from(line)
    } else {
        Bytes::from(line.chars().filter(char::is_ascii).collect::<String>())
    }
}
