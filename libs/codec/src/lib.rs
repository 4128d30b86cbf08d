//! # Telemetry Relay Codec
//!
//! ## Purpose
//!
//! The "Rules" layer of the relay: everything that turns bytes into reports,
//! reports into verdicts, and verdicts and reports back into bytes.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → relays/core
//!     ↑           ↓            ↓
//! Pure Data   Framing       Sessions
//! Structures  Validation    Cache/Registry
//! ```
//!
//! ## What This Crate Contains
//! - Two-stage report reader and slice decoder ([`read_inbox`], [`decode_inbox`])
//! - Report and ack encoders ([`encode_inbox`], [`encode_outbox`], [`ReportBuilder`])
//! - XOR checksum and the ordered validator ([`validate_inbox`], [`InboxError`])
//! - Watcher text lines ([`render_stat_line`], [`render_field_lines`])
//!
//! ## What This Crate Does NOT Contain
//! - Listeners, sessions or any shared state (belongs in relays/core)
//! - Raw data structure definitions (belongs in libs/types)

pub mod builder;
pub mod error;
pub mod parser;
pub mod render;
pub mod validation;

pub use builder::{decode_outbox, encode_inbox, encode_inbox_body, encode_outbox, ReportBuilder};
pub use error::{ProtocolError, ProtocolResult};
pub use parser::{decode_inbox, decode_inbox_bytes, read_inbox, InboxFrame, InboxRead};
pub use render::{render_field_lines, render_stat_line};
pub use validation::{
    ack_for, classify, validate_inbox, verify_checksum, xor_checksum, InboxError,
};
