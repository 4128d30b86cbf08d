//! # Connection Sessions
//!
//! One async task per accepted connection:
//! - [`ingest`]: read report, validate, ack, then update cache and notify watchers
//! - [`watcher`]: dump the cache, register, wait for disconnect
//!
//! Both are generic over the byte stream so they run the same over TCP and
//! in-memory test streams.

pub mod ingest;
pub mod watcher;

pub use ingest::run_ingest_session;
pub use watcher::run_watcher_session;
