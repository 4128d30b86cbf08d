//! Message shapes exchanged with sources
//!
//! ```text
//! source ──InboxMessage──▶ relay
//! source ◀──OutboxMessage── relay
//! ```

pub mod inbox;
pub mod outbox;

pub use inbox::{Field, InboxMessage};
pub use outbox::{AckHeader, OutboxMessage};
