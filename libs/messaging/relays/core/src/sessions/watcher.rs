//! # Watcher Session
//!
//! `Connected → Dumping → Registered → Disconnected`
//!
//! A new watcher first receives one stat line per cached source, then joins
//! the registry for live notifications. Inbound bytes are read and discarded
//! only to detect the disconnect. A failed dump ends the session before
//! registration.

use crate::common::client::ConnectionId;
use crate::registry::WatcherHandle;
use crate::state::RelayState;
use codec::render_stat_line;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument};
use types::now_millis;

#[instrument(name = "watcher", skip(stream, state))]
pub async fn run_watcher_session<S>(
    stream: S,
    connection_id: ConnectionId,
    state: RelayState,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut reader, mut writer) = tokio::io::split(stream);

    let snapshot = state.cache.snapshot();
    for stat in &snapshot {
        writer
            .write_all(&render_stat_line(stat, now_millis()))
            .await?;
    }
    writer.flush().await?;
    debug!(sources = snapshot.len(), "Sent status dump");

    let handle = WatcherHandle::new(connection_id, writer);
    state.watchers.add(handle.clone());
    info!(watchers = state.watchers.len(), "Watcher registered");

    let drained = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
    state.watchers.remove(&handle);

    match drained {
        Ok(bytes) => debug!(discarded = bytes, "Watcher disconnected"),
        Err(e) => debug!(error = %e, "Watcher read failed"),
    }
    Ok(())
}
