//! # Ingest Session
//!
//! Per-source request/response loop:
//!
//! ```text
//! AwaitingFrame → Decoding → Validating → Acking ─┬─ accepted → UpdatingAndBroadcasting ─┐
//!       ↑                                         └─ rejected ───────────────────────────┤
//!       └────────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exactly one ack is written and flushed per frame before anything else
//! happens; only then is an accepted report applied to the cache and fanned
//! out. Frames are never pipelined. Stream closure between frames ends the
//! session with `Ok(())`.

use crate::common::client::ConnectionId;
use crate::state::RelayState;
use codec::{ack_for, classify, encode_outbox, read_inbox, InboxRead};
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};
use types::{now_millis, InboxMessage};

#[instrument(name = "ingest", skip(stream, state))]
pub async fn run_ingest_session<S>(
    mut stream: S,
    connection_id: ConnectionId,
    state: RelayState,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let mut frames = 0u64;

    loop {
        let verdict = match read_inbox(&mut stream).await? {
            InboxRead::Closed => {
                debug!(frames, "Source closed connection");
                return Ok(());
            }
            InboxRead::Frame(frame) => classify(Ok(frame)),
            InboxRead::Broken(err) => classify(Err(err)),
        };
        frames += 1;

        let ack = ack_for(&verdict);
        stream.write_all(&encode_outbox(&ack)).await?;
        stream.flush().await?;

        match verdict {
            Ok(frame) => apply_report(&state, frame.message).await,
            Err(err) => {
                state.metrics.record_rejected();
                warn!(kind = err.kind(), error = %err, "Rejected report");
            }
        }
    }
}

/// Update the cache, then notify watchers
async fn apply_report(state: &RelayState, message: InboxMessage) {
    // validated reports always carry a known status
    let Some(status) = message.status() else {
        return;
    };

    state.cache.upsert(
        &message.source_name,
        status,
        message.message_number,
        now_millis(),
    );
    state.metrics.record_accepted();
    debug!(
        source = %message.source_name,
        message_number = message.message_number,
        %status,
        fields = message.fields.len(),
        "Accepted report"
    );

    let report = state.watchers.broadcast(&message).await;
    state.metrics.record_broadcast(report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::WatcherHandle;
    use codec::ReportBuilder;
    use tokio::io::AsyncReadExt;
    use tokio_test::io::Builder;
    use types::SourceStatus;

    const FAIL_ACK: [u8; 4] = [0x12, 0x00, 0x00, 0x12];

    fn alpha(message_number: u16) -> Vec<u8> {
        ReportBuilder::new("ALPHA", SourceStatus::Active)
            .message_number(message_number)
            .field("temp", 21)
            .field("load", 87)
            .build()
            .unwrap()
            .to_vec()
    }

    fn success_ack(message_number: u16) -> [u8; 4] {
        let [hi, lo] = message_number.to_be_bytes();
        [0x11, hi, lo, 0x11 ^ hi ^ lo]
    }

    #[tokio::test]
    async fn test_valid_report_is_acked_and_cached() {
        let state = RelayState::new();
        let stream = Builder::new()
            .read(&alpha(29))
            .write(&[0x11, 0x00, 0x1d, 0x0c])
            .build();

        run_ingest_session(stream, 1, state.clone()).await.unwrap();

        let cached = state.cache.get("ALPHA").unwrap();
        assert_eq!(cached.status, SourceStatus::Active);
        assert_eq!(cached.last_message_number, 29);
        assert_eq!(state.metrics.snapshot().reports_accepted, 1);
    }

    #[tokio::test]
    async fn test_bad_checksum_gets_fail_ack_and_session_continues() {
        let state = RelayState::new();
        let mut corrupted = alpha(5);
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0xff;

        let stream = Builder::new()
            .read(&corrupted)
            .write(&FAIL_ACK)
            .read(&alpha(6))
            .write(&success_ack(6))
            .build();

        run_ingest_session(stream, 1, state.clone()).await.unwrap();

        assert_eq!(state.cache.get("ALPHA").unwrap().last_message_number, 6);
        let metrics = state.metrics.snapshot();
        assert_eq!(metrics.reports_rejected, 1);
        assert_eq!(metrics.reports_accepted, 1);
    }

    #[tokio::test]
    async fn test_truncated_frame_gets_fail_ack_then_closes() {
        let state = RelayState::new();
        let frame = alpha(1);
        let (mut source, relay_side) = tokio::io::duplex(1024);
        let session = tokio::spawn(run_ingest_session(relay_side, 1, state.clone()));

        source.write_all(&frame[..20]).await.unwrap();
        source.shutdown().await.unwrap();

        let mut ack = [0u8; 4];
        source.read_exact(&mut ack).await.unwrap();
        assert_eq!(ack, FAIL_ACK);

        session.await.unwrap().unwrap();
        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_status_not_cached() {
        let state = RelayState::new();
        let mut frame = alpha(1);
        frame[11] = 0x07;
        let last = frame.len() - 1;
        frame[last] ^= 0x02 ^ 0x07;

        let stream = Builder::new().read(&frame).write(&FAIL_ACK).build();

        run_ingest_session(stream, 1, state.clone()).await.unwrap();
        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_accepted_report_reaches_watchers() {
        let state = RelayState::new();
        let (watcher_side, mut watcher_peer) = tokio::io::duplex(1024);
        state.watchers.add(WatcherHandle::new(9, watcher_side));

        let stream = Builder::new()
            .read(&alpha(3))
            .write(&success_ack(3))
            .build();
        run_ingest_session(stream, 1, state.clone()).await.unwrap();

        let expected = b"[ALPHA] temp | 21\r\n[ALPHA] load | 87\r\n";
        let mut buf = vec![0u8; expected.len()];
        watcher_peer.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf[..], &expected[..]);
        assert_eq!(state.metrics.snapshot().broadcasts, 1);
    }

    #[tokio::test]
    async fn test_ack_write_failure_ends_session() {
        let state = RelayState::new();
        let stream = Builder::new()
            .read(&alpha(1))
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            .build();

        let err = run_ingest_session(stream, 1, state.clone())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(state.cache.is_empty());
    }
}
