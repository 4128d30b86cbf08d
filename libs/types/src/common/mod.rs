//! Relay-side bookkeeping types shared between crates

pub mod statistics;
pub mod time;
