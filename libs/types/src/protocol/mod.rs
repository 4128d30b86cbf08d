//! Protocol layer types for the telemetry relay
//!
//! Constants describing the binary frame layout, the source status table and
//! the inbox/outbox message shapes.

pub mod constants;
pub mod message;
pub mod status;

pub use constants::*;
pub use message::{AckHeader, Field, InboxMessage, OutboxMessage};
pub use status::{ReportedStatus, SourceStatus};
