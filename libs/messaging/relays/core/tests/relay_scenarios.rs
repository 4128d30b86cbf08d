//! # Relay End-to-End Scenarios
//!
//! Runs a full relay on loopback ephemeral ports and drives it with real TCP
//! sources and watchers.

use codec::ReportBuilder;
use relay_core::{ListenerConfig, Relay, RelayConfig, RelayState};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::time::timeout;
use types::SourceStatus;

const STEP: Duration = Duration::from_secs(5);

struct TestRelay {
    ingest: SocketAddr,
    watcher: SocketAddr,
    state: RelayState,
    _shutdown: oneshot::Sender<()>,
}

async fn start_relay() -> TestRelay {
    let loopback = || ListenerConfig {
        address: "127.0.0.1".into(),
        port: 0,
    };
    let config = RelayConfig {
        ingest: loopback(),
        watcher: loopback(),
        ..RelayConfig::default()
    };

    let relay = Relay::bind(config).await.unwrap();
    let ingest = relay.ingest_addr().unwrap();
    let watcher = relay.watcher_addr().unwrap();
    let state = relay.state().clone();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(relay.run_until(async move {
        let _ = rx.await;
    }));

    TestRelay {
        ingest,
        watcher,
        state,
        _shutdown: tx,
    }
}

async fn send_report(source: &mut TcpStream, frame: &[u8]) -> [u8; 4] {
    source.write_all(frame).await.unwrap();
    let mut ack = [0u8; 4];
    timeout(STEP, source.read_exact(&mut ack))
        .await
        .expect("ack timed out")
        .unwrap();
    ack
}

async fn connect_watcher(addr: SocketAddr) -> (Lines<BufReader<OwnedReadHalf>>, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read, write) = stream.into_split();
    (BufReader::new(read).lines(), write)
}

async fn next_line(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> String {
    timeout(STEP, lines.next_line())
        .await
        .expect("watcher line timed out")
        .unwrap()
        .expect("watcher stream closed")
}

async fn wait_for_watchers(state: &RelayState, count: usize) {
    timeout(STEP, async {
        while state.watchers.len() != count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {count} watchers, got {}", state.watchers.len()));
}

/// Acks go out before the cache is updated
async fn wait_for_source(state: &RelayState, name: &str) {
    timeout(STEP, async {
        while state.cache.get(name).is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("source {name} never cached"));
}

fn alpha_report(message_number: u16) -> Vec<u8> {
    ReportBuilder::new("ALPHA", SourceStatus::Active)
        .message_number(message_number)
        .field("temp", 21)
        .field("load", 87)
        .build()
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_valid_report_gets_success_ack() {
    let relay = start_relay().await;
    let mut source = TcpStream::connect(relay.ingest).await.unwrap();

    let ack = send_report(&mut source, &alpha_report(29)).await;
    assert_eq!(ack, [0x11, 0x00, 0x1d, 0x0c]);

    wait_for_source(&relay.state, "ALPHA").await;
    let cached = relay.state.cache.get("ALPHA").unwrap();
    assert_eq!(cached.last_message_number, 29);
}

#[tokio::test]
async fn test_corrupted_checksum_gets_fail_ack() {
    let relay = start_relay().await;
    let mut source = TcpStream::connect(relay.ingest).await.unwrap();

    let mut frame = alpha_report(3);
    let last = frame.len() - 1;
    frame[last] ^= 0x01;

    assert_eq!(send_report(&mut source, &frame).await, [0x12, 0x00, 0x00, 0x12]);
    assert!(relay.state.cache.is_empty());

    // same connection keeps working
    let ack = send_report(&mut source, &alpha_report(4)).await;
    assert_eq!(ack[0], 0x11);
}

#[tokio::test]
async fn test_new_watcher_receives_cache_dump_first() {
    let relay = start_relay().await;
    let mut source = TcpStream::connect(relay.ingest).await.unwrap();
    send_report(&mut source, &alpha_report(1)).await;
    wait_for_source(&relay.state, "ALPHA").await;

    let (mut lines, _write) = connect_watcher(relay.watcher).await;
    let first = next_line(&mut lines).await;
    assert!(first.starts_with("[ALPHA] 1 | ACTIVE | "), "{first}");

    wait_for_watchers(&relay.state, 1).await;
    send_report(&mut source, &alpha_report(2)).await;
    assert_eq!(next_line(&mut lines).await, "[ALPHA] temp | 21");
}

#[tokio::test]
async fn test_report_fans_out_to_all_watchers_in_field_order() {
    let relay = start_relay().await;
    let mut source = TcpStream::connect(relay.ingest).await.unwrap();
    send_report(&mut source, &alpha_report(1)).await;
    wait_for_source(&relay.state, "ALPHA").await;

    let (mut w1, _h1) = connect_watcher(relay.watcher).await;
    let (mut w2, _h2) = connect_watcher(relay.watcher).await;
    next_line(&mut w1).await;
    next_line(&mut w2).await;
    wait_for_watchers(&relay.state, 2).await;

    assert_eq!(send_report(&mut source, &alpha_report(2)).await[0], 0x11);

    for watcher in [&mut w1, &mut w2] {
        assert_eq!(next_line(watcher).await, "[ALPHA] temp | 21");
        assert_eq!(next_line(watcher).await, "[ALPHA] load | 87");
    }
}

#[tokio::test]
async fn test_disconnected_watcher_is_removed() {
    let relay = start_relay().await;
    let mut source = TcpStream::connect(relay.ingest).await.unwrap();

    let (leaving, leaving_write) = connect_watcher(relay.watcher).await;
    let (mut staying, _write) = connect_watcher(relay.watcher).await;
    wait_for_watchers(&relay.state, 2).await;

    drop(leaving);
    drop(leaving_write);
    wait_for_watchers(&relay.state, 1).await;

    assert_eq!(send_report(&mut source, &alpha_report(8)).await[0], 0x11);
    assert_eq!(next_line(&mut staying).await, "[ALPHA] temp | 21");
    assert_eq!(next_line(&mut staying).await, "[ALPHA] load | 87");

    let metrics = relay.state.metrics.snapshot();
    assert_eq!(metrics.watcher_connections_total, 2);
    assert_eq!(metrics.reports_accepted, 1);
}
