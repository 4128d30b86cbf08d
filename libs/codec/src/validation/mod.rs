//! # Report Validation
//!
//! - [`checksum`]: the XOR fold shared by reports and acks
//! - [`validator`]: ordered semantic checks producing an [`InboxError`]

pub mod checksum;
pub mod validator;

pub use checksum::{verify_checksum, xor_checksum, MIN_CHECKSUM_INPUT};
pub use validator::{ack_for, classify, validate_inbox, InboxError};
