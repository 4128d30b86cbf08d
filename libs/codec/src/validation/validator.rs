//! # Report Validator
//!
//! Semantic checks on a parsed report, applied in a fixed order and stopping at
//! the first violation:
//!
//! 1. header is the report discriminator → [`InboxError::WrongHeader`]
//! 2. checksum over the received body matches → [`InboxError::WrongChecksum`]
//! 3. declared field count matches decoded fields → [`InboxError::WrongFieldsAmount`]
//! 4. status code is known → [`InboxError::WrongStatus`]
//!
//! Frames that could not be parsed never reach these checks; they surface as
//! [`InboxError::BrokenMessage`] through [`classify`].

use super::checksum::xor_checksum;
use crate::error::ProtocolError;
use crate::parser::InboxFrame;
use thiserror::Error;
use types::{OutboxMessage, ReportedStatus, REPORT_HEADER};

/// Why a report was refused
///
/// Every kind gets the same fail ack; the kind itself is for diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InboxError {
    #[error("Broken message: {0}")]
    BrokenMessage(#[from] ProtocolError),

    #[error("Wrong header: expected {expected:#04x}, got {got:#04x}")]
    WrongHeader { expected: u8, got: u8 },

    #[error("Wrong checksum: transmitted {transmitted:#04x}, calculated {calculated:#04x}")]
    WrongChecksum { transmitted: u8, calculated: u8 },

    #[error("Wrong fields amount: declared {declared}, decoded {decoded}")]
    WrongFieldsAmount { declared: u8, decoded: usize },

    #[error("Wrong status code {0:#04x}")]
    WrongStatus(u8),
}

impl InboxError {
    /// Stable short name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BrokenMessage(_) => "broken_message",
            Self::WrongHeader { .. } => "wrong_header",
            Self::WrongChecksum { .. } => "wrong_checksum",
            Self::WrongFieldsAmount { .. } => "wrong_fields_amount",
            Self::WrongStatus(_) => "wrong_status",
        }
    }
}

/// Run the ordered checks against a parsed frame
pub fn validate_inbox(frame: &InboxFrame) -> Result<(), InboxError> {
    let message = &frame.message;

    if message.header != REPORT_HEADER {
        return Err(InboxError::WrongHeader {
            expected: REPORT_HEADER,
            got: message.header,
        });
    }

    let calculated = xor_checksum(&frame.body)?;
    if calculated != frame.checksum {
        return Err(InboxError::WrongChecksum {
            transmitted: frame.checksum,
            calculated,
        });
    }

    if usize::from(message.fields_count) != message.fields.len() {
        return Err(InboxError::WrongFieldsAmount {
            declared: message.fields_count,
            decoded: message.fields.len(),
        });
    }

    if let ReportedStatus::Unknown(code) = message.source_status {
        return Err(InboxError::WrongStatus(code));
    }

    Ok(())
}

/// Fold a decode outcome and validation into one verdict
pub fn classify(decoded: Result<InboxFrame, ProtocolError>) -> Result<InboxFrame, InboxError> {
    let frame = decoded?;
    validate_inbox(&frame)?;
    Ok(frame)
}

/// The ack a source receives for a verdict
pub fn ack_for(verdict: &Result<InboxFrame, InboxError>) -> OutboxMessage {
    match verdict {
        Ok(frame) => OutboxMessage::success(frame.message.message_number),
        Err(_) => OutboxMessage::fail(),
    }
}
