//! Source status table
//!
//! The mapping between wire codes and symbolic tags is fixed, so it is an enum
//! with both lookup directions generated by `num_enum`.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// Operating status reported by a source
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum SourceStatus {
    Idle = 1,
    Active = 2,
    Recharge = 3,
}

impl SourceStatus {
    /// Wire code for this status
    pub fn code(self) -> u8 {
        self.into()
    }

    /// Tag used in watcher text lines
    pub fn as_str(self) -> &'static str {
        match self {
            SourceStatus::Idle => "IDLE",
            SourceStatus::Active => "ACTIVE",
            SourceStatus::Recharge => "RECHARGE",
        }
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status as it arrived in a report
///
/// Decoding never fails on the status byte. Unrecognized codes are kept so the
/// validator can reject them and the codec can re-encode them unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportedStatus {
    Known(SourceStatus),
    Unknown(u8),
}

impl ReportedStatus {
    pub fn from_code(code: u8) -> Self {
        SourceStatus::try_from(code)
            .map(ReportedStatus::Known)
            .unwrap_or(ReportedStatus::Unknown(code))
    }

    pub fn code(self) -> u8 {
        match self {
            ReportedStatus::Known(status) => status.code(),
            ReportedStatus::Unknown(code) => code,
        }
    }

    pub fn known(self) -> Option<SourceStatus> {
        match self {
            ReportedStatus::Known(status) => Some(status),
            ReportedStatus::Unknown(_) => None,
        }
    }
}

impl From<SourceStatus> for ReportedStatus {
    fn from(status: SourceStatus) -> Self {
        ReportedStatus::Known(status)
    }
}
