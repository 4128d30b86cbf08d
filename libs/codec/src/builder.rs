//! # Frame Builders
//!
//! Encoding side of the wire protocol:
//! - [`encode_inbox`] / [`ReportBuilder`] for source reports
//! - [`encode_outbox`] / [`decode_outbox`] for the 4-byte acks
//!
//! Checksums are always recomputed on encode; a stored checksum is never
//! copied into a new frame.

use crate::error::{ProtocolError, ProtocolResult};
use crate::validation::checksum::xor_checksum;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use types::{
    AckHeader, Field, InboxMessage, OutboxMessage, SourceStatus, CHECKSUM_SIZE, FIELD_ENTRY_SIZE,
    INBOX_PREFIX_SIZE, NAME_WIDTH, OUTBOX_FRAME_SIZE,
};

/// Encode a report including its trailing checksum
///
/// `fields_count` is written as declared and every entry in `fields` is
/// written after it; the two are not reconciled here.
pub fn encode_inbox(message: &InboxMessage) -> ProtocolResult<Bytes> {
    let mut buf = encode_inbox_body(message)?;
    let checksum = xor_checksum(&buf)?;
    buf.put_u8(checksum);
    Ok(buf.freeze())
}

/// Encode everything of a report that the checksum covers
pub fn encode_inbox_body(message: &InboxMessage) -> ProtocolResult<BytesMut> {
    let mut buf = BytesMut::with_capacity(
        INBOX_PREFIX_SIZE + message.fields.len() * FIELD_ENTRY_SIZE + CHECKSUM_SIZE,
    );

    buf.put_u8(message.header);
    buf.put_u16(message.message_number);
    buf.put_slice(&encode_text(&message.source_name, "source name")?);
    buf.put_u8(message.source_status.code());
    buf.put_u8(message.fields_count);

    for field in &message.fields {
        buf.put_slice(&encode_text(&field.key, "field key")?);
        buf.put_u32(field.value);
    }

    Ok(buf)
}

/// Encode an ack: header, message number, checksum
pub fn encode_outbox(ack: &OutboxMessage) -> Bytes {
    let mut buf = BytesMut::with_capacity(OUTBOX_FRAME_SIZE);
    buf.put_u8(ack.header.into());
    buf.put_u16(ack.message_number);
    // XOR from zero equals the first-byte fold for any non-empty input
    let checksum = buf.iter().fold(0u8, |acc, b| acc ^ b);
    buf.put_u8(checksum);
    buf.freeze()
}

/// Decode an ack as received by a source
pub fn decode_outbox(data: &[u8]) -> ProtocolResult<OutboxMessage> {
    if data.len() != OUTBOX_FRAME_SIZE {
        return Err(ProtocolError::message_too_small(
            OUTBOX_FRAME_SIZE,
            data.len(),
            "outbox frame",
        ));
    }

    let (body, transmitted) = data.split_at(OUTBOX_FRAME_SIZE - CHECKSUM_SIZE);
    let calculated = xor_checksum(body)?;
    if calculated != transmitted[0] {
        return Err(ProtocolError::ChecksumMismatch {
            transmitted: transmitted[0],
            calculated,
        });
    }

    let mut cursor = body;
    let header_byte = cursor.get_u8();
    let header =
        AckHeader::try_from(header_byte).map_err(|_| ProtocolError::UnknownAckHeader(header_byte))?;

    Ok(OutboxMessage {
        header,
        message_number: cursor.get_u16(),
    })
}

/// Encode a fixed-width column: drop non-ASCII characters, zero-pad on the left
fn encode_text(text: &str, column: &'static str) -> ProtocolResult<[u8; NAME_WIDTH]> {
    let ascii: Vec<u8> = text
        .chars()
        .filter(char::is_ascii)
        .map(|c| c as u8)
        .collect();
    if ascii.len() > NAME_WIDTH {
        return Err(ProtocolError::text_too_long(column, text, NAME_WIDTH));
    }

    let mut out = [0u8; NAME_WIDTH];
    out[NAME_WIDTH - ascii.len()..].copy_from_slice(&ascii);
    Ok(out)
}

/// Fluent builder for source-side reports
///
/// ```rust
/// use codec::ReportBuilder;
/// use types::SourceStatus;
///
/// let frame = ReportBuilder::new("ALPHA", SourceStatus::Active)
///     .message_number(7)
///     .field("temp", 21)
///     .build()
///     .unwrap();
/// assert_eq!(frame.len(), 13 + 12 + 1);
/// ```
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    message: InboxMessage,
}

impl ReportBuilder {
    pub fn new(source_name: impl Into<String>, status: SourceStatus) -> Self {
        Self {
            message: InboxMessage::report(0, source_name, status, Vec::new()),
        }
    }

    pub fn message_number(mut self, message_number: u16) -> Self {
        self.message.message_number = message_number;
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: u32) -> Self {
        self.message.fields.push(Field::new(key, value));
        self.message.fields_count = self.message.fields_count.saturating_add(1);
        self
    }

    /// The message as it will be encoded
    pub fn message(&self) -> &InboxMessage {
        &self.message
    }

    pub fn build(&self) -> ProtocolResult<Bytes> {
        encode_inbox(&self.message)
    }
}
