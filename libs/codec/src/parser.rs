//! # Inbox Frame Parser
//!
//! ## Purpose
//!
//! Turns report bytes into [`InboxFrame`]s. Reports are variable length, so a
//! stream read is necessarily two-stage: the fixed 13-byte prefix carries the
//! field count N, after which exactly `12N + 1` more bytes complete the frame.
//!
//! ```text
//! read 13 ──▶ N = prefix[12] ──▶ read 12N + 1 ──▶ decode ──▶ InboxFrame
//! ```
//!
//! Anything that cannot be parsed (short input, length disagreeing with the
//! declared count, non-ASCII name or key bytes, EOF inside a frame) is a
//! *broken* message: a normal outcome for the session loop, not a failure of
//! the connection. Semantic checks (header, checksum, counts, status) belong to
//! [`crate::validation`].

use crate::builder::encode_inbox_body;
use crate::error::{ProtocolError, ProtocolResult};
use crate::validation::checksum::xor_checksum;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;
use types::{
    inbox_frame_size, Field, InboxMessage, ReportedStatus, CHECKSUM_SIZE, FIELDS_COUNT_OFFSET,
    FIELD_ENTRY_SIZE, INBOX_PREFIX_SIZE, NAME_WIDTH,
};

/// Offset of the source name column inside a frame
const SOURCE_NAME_OFFSET: usize = 3;

/// A parsed report together with the exact bytes it arrived as
///
/// `body` is everything before the checksum byte; validation recomputes the
/// checksum over it rather than over a re-encoding of `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxFrame {
    pub message: InboxMessage,
    pub body: Bytes,
    pub checksum: u8,
}

impl InboxFrame {
    /// Frame an outgoing message with a freshly computed checksum
    pub fn from_message(message: InboxMessage) -> ProtocolResult<Self> {
        let body = encode_inbox_body(&message)?.freeze();
        let checksum = xor_checksum(&body)?;
        Ok(Self {
            message,
            body,
            checksum,
        })
    }

    /// Wire bytes: body followed by the checksum byte as stored
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.body.len() + CHECKSUM_SIZE);
        buf.put_slice(&self.body);
        buf.put_u8(self.checksum);
        buf.freeze()
    }

    /// Length of the frame on the wire
    pub fn wire_len(&self) -> usize {
        self.body.len() + CHECKSUM_SIZE
    }
}

/// Outcome of reading one report from a stream
#[derive(Debug)]
pub enum InboxRead {
    /// Peer closed the stream between frames
    Closed,
    Frame(InboxFrame),
    Broken(ProtocolError),
}

/// Read exactly one report from `reader`
///
/// EOF before the first byte is a clean close. EOF anywhere inside the frame
/// yields [`InboxRead::Broken`]. Other I/O errors are returned as-is.
pub async fn read_inbox<R>(reader: &mut R) -> io::Result<InboxRead>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut prefix = [0u8; INBOX_PREFIX_SIZE];
    let filled = read_full(reader, &mut prefix).await?;
    if filled == 0 {
        return Ok(InboxRead::Closed);
    }
    if filled < INBOX_PREFIX_SIZE {
        return Ok(InboxRead::Broken(ProtocolError::message_too_small(
            INBOX_PREFIX_SIZE,
            filled,
            "stream closed inside inbox prefix",
        )));
    }

    let total = inbox_frame_size(prefix[FIELDS_COUNT_OFFSET]);
    let mut frame = BytesMut::with_capacity(total);
    frame.put_slice(&prefix);
    frame.resize(total, 0);

    let remaining = total - INBOX_PREFIX_SIZE;
    let filled = read_full(reader, &mut frame[INBOX_PREFIX_SIZE..]).await?;
    if filled < remaining {
        return Ok(InboxRead::Broken(ProtocolError::message_too_small(
            total,
            INBOX_PREFIX_SIZE + filled,
            "stream closed inside inbox fields",
        )));
    }

    Ok(match decode_inbox_bytes(frame.freeze()) {
        Ok(frame) => InboxRead::Frame(frame),
        Err(err) => InboxRead::Broken(err),
    })
}

/// Fill `buf` unless the stream ends first; returns the number of bytes read
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Decode one complete report frame from a byte slice
pub fn decode_inbox(data: &[u8]) -> ProtocolResult<InboxFrame> {
    decode_inbox_bytes(Bytes::copy_from_slice(data))
}

/// Decode one complete report frame without copying
pub fn decode_inbox_bytes(frame: Bytes) -> ProtocolResult<InboxFrame> {
    if frame.len() < INBOX_PREFIX_SIZE {
        return Err(ProtocolError::message_too_small(
            INBOX_PREFIX_SIZE,
            frame.len(),
            "inbox prefix",
        ));
    }

    let fields_count = frame[FIELDS_COUNT_OFFSET];
    let expected = inbox_frame_size(fields_count);
    if frame.len() != expected {
        return Err(ProtocolError::LengthMismatch {
            fields_count,
            expected,
            got: frame.len(),
        });
    }

    let checksum_offset = expected - CHECKSUM_SIZE;
    let checksum = frame[checksum_offset];
    let body = frame.slice(..checksum_offset);

    let mut cursor = &body[..];
    let header = cursor.get_u8();
    let message_number = cursor.get_u16();
    let source_name = decode_text(&cursor[..NAME_WIDTH], SOURCE_NAME_OFFSET, "source name")?;
    cursor.advance(NAME_WIDTH);
    let source_status = ReportedStatus::from_code(cursor.get_u8());
    let declared = cursor.get_u8();

    let mut fields = Vec::with_capacity(declared as usize);
    for index in 0..declared as usize {
        let offset = INBOX_PREFIX_SIZE + index * FIELD_ENTRY_SIZE;
        let key = decode_text(&cursor[..NAME_WIDTH], offset, "field key")?;
        cursor.advance(NAME_WIDTH);
        fields.push(Field {
            key,
            value: cursor.get_u32(),
        });
    }

    trace!(frame = %hex::encode(&frame), "decoded inbox frame");

    Ok(InboxFrame {
        message: InboxMessage {
            header,
            message_number,
            source_name,
            source_status,
            fields_count: declared,
            fields,
        },
        body,
        checksum,
    })
}

/// Decode a fixed-width column: strip the zero left-padding, require ASCII
fn decode_text(raw: &[u8], offset: usize, column: &'static str) -> ProtocolResult<String> {
    if let Some(pos) = raw.iter().position(|b| !b.is_ascii()) {
        return Err(ProtocolError::NonAsciiText {
            column,
            offset: offset + pos,
            byte: raw[pos],
        });
    }

    let start = raw.iter().position(|&b| b != 0).unwrap_or(raw.len());
    Ok(raw[start..].iter().map(|&b| char::from(b)).collect())
}
