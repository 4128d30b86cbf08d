//! Acknowledgement returned to a source for every report

use crate::protocol::constants::EMPTY_MESSAGE_NUMBER;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Ack discriminator, see `ACK_SUCCESS_HEADER` / `ACK_FAIL_HEADER`
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum AckHeader {
    Success = 0x11,
    Fail = 0x12,
}

/// Ack frame body; the checksum is computed by the codec on encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboxMessage {
    pub header: AckHeader,
    pub message_number: u16,
}

impl OutboxMessage {
    /// Accepted report: echo its message number
    pub fn success(message_number: u16) -> Self {
        Self {
            header: AckHeader::Success,
            message_number,
        }
    }

    /// Rejected report: the message number is always zero
    pub fn fail() -> Self {
        Self {
            header: AckHeader::Fail,
            message_number: EMPTY_MESSAGE_NUMBER,
        }
    }

    pub fn is_success(&self) -> bool {
        self.header == AckHeader::Success
    }
}
