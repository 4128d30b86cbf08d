//! # Telemetry Relay Types
//!
//! Shared type definitions for the telemetry status relay: wire-level protocol
//! constants, the report and acknowledgement messages exchanged with sources,
//! and the per-source statistics kept by the relay.
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Field, InboxMessage, SourceStatus};
//!
//! let report = InboxMessage::report(
//!     7,
//!     "ALPHA",
//!     SourceStatus::Active,
//!     vec![Field::new("temp", 21), Field::new("load", 87)],
//! );
//! assert_eq!(report.fields_count, 2);
//! ```
//!
//! Encoding, decoding and validation of these types live in the `codec` crate;
//! this crate only describes the data.

pub mod common;
pub mod protocol;

pub use common::statistics::SourceStatistics;
pub use common::time::now_millis;
pub use protocol::*;
