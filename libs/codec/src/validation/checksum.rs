//! XOR Checksum
//!
//! Single-byte XOR fold used by both report and ack frames. The fold starts
//! from the first byte and XORs in every following byte; at least two bytes
//! are required.

use crate::error::{ProtocolError, ProtocolResult};

/// Smallest input the checksum is defined for
pub const MIN_CHECKSUM_INPUT: usize = 2;

/// Calculate the XOR checksum of a frame body (everything before the checksum byte)
pub fn xor_checksum(data: &[u8]) -> ProtocolResult<u8> {
    match data.split_first() {
        Some((&first, rest)) if !rest.is_empty() => Ok(rest.iter().fold(first, |acc, b| acc ^ b)),
        _ => Err(ProtocolError::ChecksumInputTooShort {
            need: MIN_CHECKSUM_INPUT,
            got: data.len(),
        }),
    }
}

/// Verify a transmitted checksum against the body it was sent with
pub fn verify_checksum(body: &[u8], transmitted: u8) -> bool {
    matches!(xor_checksum(body), Ok(calculated) if calculated == transmitted)
}
