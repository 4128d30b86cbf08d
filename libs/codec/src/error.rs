//! Framing-level errors for report and ack processing
//!
//! A `ProtocolError` means the bytes could not be turned into a frame (or a
//! frame could not be turned into bytes). Semantic rejection of a parsed frame
//! is a separate concern, see [`crate::validation::InboxError`].

use thiserror::Error;

/// Framing and encoding errors with diagnostic context
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not enough bytes for the structure being read
    #[error("Message too small: need {need} bytes, got {got} (context: {context})")]
    MessageTooSmall {
        need: usize,
        got: usize,
        context: String,
    },

    /// Frame length disagrees with the declared field count
    #[error("Frame length mismatch: {fields_count} fields require {expected} bytes, got {got}")]
    LengthMismatch {
        fields_count: u8,
        expected: usize,
        got: usize,
    },

    /// Non-ASCII byte inside a name or key column
    #[error("Non-ASCII byte {byte:#04x} in {column} at offset {offset}")]
    NonAsciiText {
        column: &'static str,
        offset: usize,
        byte: u8,
    },

    /// Name or key does not fit its fixed-width column
    #[error("{column} '{value}' exceeds {limit} ASCII characters")]
    TextTooLong {
        column: &'static str,
        value: String,
        limit: usize,
    },

    /// Transmitted checksum does not match the bytes it covers
    #[error("Checksum mismatch: transmitted {transmitted:#04x}, calculated {calculated:#04x}")]
    ChecksumMismatch { transmitted: u8, calculated: u8 },

    /// Ack header byte is neither success nor fail
    #[error("Unknown ack header {0:#04x}")]
    UnknownAckHeader(u8),

    /// Checksum requested over fewer bytes than the algorithm accepts
    #[error("Checksum input too short: need at least {need} bytes, got {got}")]
    ChecksumInputTooShort { need: usize, got: usize },
}

impl ProtocolError {
    pub fn message_too_small(need: usize, got: usize, context: impl Into<String>) -> Self {
        Self::MessageTooSmall {
            need,
            got,
            context: context.into(),
        }
    }

    pub fn text_too_long(column: &'static str, value: impl Into<String>, limit: usize) -> Self {
        Self::TextTooLong {
            column,
            value: value.into(),
            limit,
        }
    }
}

/// Result type for codec operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
