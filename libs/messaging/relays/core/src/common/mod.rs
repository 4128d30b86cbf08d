//! # Relay Engine
//!
//! Binds the two listeners and runs one accept loop over both:
//!
//! ```text
//!  sources ──▶ ingest listener ──▶ run_ingest_session ──┐
//!                                                       ├──▶ RelayState (cache, watchers, metrics)
//! watchers ──▶ watcher listener ─▶ run_watcher_session ─┘
//! ```
//!
//! Every accepted connection gets its own task. A failing session is logged
//! and affects only its own connection; accept errors are logged and the loop
//! keeps going.

pub mod client;

use crate::common::client::{ClientManager, ConnectionId};
use crate::config::RelayConfig;
use crate::metrics::ConnectionRole;
use crate::sessions::{run_ingest_session, run_watcher_session};
use crate::state::RelayState;
use crate::{RelayError, RelayResult};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

pub struct Relay {
    config: RelayConfig,
    state: RelayState,
    client_manager: ClientManager,
    ingest_listener: TcpListener,
    watcher_listener: TcpListener,
}

impl Relay {
    /// Validate `config` and bind both listeners with fresh state
    pub async fn bind(config: RelayConfig) -> RelayResult<Self> {
        Self::bind_with_state(config, RelayState::new()).await
    }

    pub async fn bind_with_state(config: RelayConfig, state: RelayState) -> RelayResult<Self> {
        config.validate()?;

        let ingest_listener = bind_listener(&config, ConnectionRole::Ingest).await?;
        let watcher_listener = bind_listener(&config, ConnectionRole::Watcher).await?;
        let client_manager = ClientManager::new(state.metrics.clone());

        Ok(Self {
            config,
            state,
            client_manager,
            ingest_listener,
            watcher_listener,
        })
    }

    pub fn state(&self) -> &RelayState {
        &self.state
    }

    /// Bound ingest address (resolves port 0)
    pub fn ingest_addr(&self) -> RelayResult<SocketAddr> {
        Ok(self.ingest_listener.local_addr()?)
    }

    /// Bound watcher address (resolves port 0)
    pub fn watcher_addr(&self) -> RelayResult<SocketAddr> {
        Ok(self.watcher_listener.local_addr()?)
    }

    /// Serve until the process ends
    pub async fn run(self) -> RelayResult<()> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Serve until `shutdown` resolves
    ///
    /// Sessions already running are not cancelled; they end with their
    /// connections or with the runtime.
    pub async fn run_until<F>(self, shutdown: F) -> RelayResult<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            ingest = %self.ingest_addr()?,
            watcher = %self.watcher_addr()?,
            "Relay listening"
        );

        let mut metrics_ticker = self.config.report_interval().map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(metrics = %self.state.metrics, "Relay shutting down");
                    return Ok(());
                }
                accepted = self.ingest_listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_session(ConnectionRole::Ingest, stream, peer),
                    Err(e) => error!(error = %e, "Failed to accept ingest connection"),
                },
                accepted = self.watcher_listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_session(ConnectionRole::Watcher, stream, peer),
                    Err(e) => error!(error = %e, "Failed to accept watcher connection"),
                },
                _ = tick(&mut metrics_ticker) => {
                    info!(metrics = %self.state.metrics, "Relay metrics");
                }
            }
        }
    }

    fn spawn_session(&self, role: ConnectionRole, stream: TcpStream, peer: SocketAddr) {
        let connection_id = self.client_manager.add_connection(role);
        info!(connection_id, %peer, %role, "Connection established");

        if let Err(e) = stream.set_nodelay(true) {
            debug!(connection_id, error = %e, "Failed to set TCP_NODELAY");
        }

        let state = self.state.clone();
        let client_manager = self.client_manager.clone();
        tokio::spawn(async move {
            let result = match role {
                ConnectionRole::Ingest => run_ingest_session(stream, connection_id, state).await,
                ConnectionRole::Watcher => run_watcher_session(stream, connection_id, state).await,
            };
            finish_session(connection_id, role, result);
            client_manager.remove_connection(role);
        });
    }
}

fn finish_session(connection_id: ConnectionId, role: ConnectionRole, result: std::io::Result<()>) {
    match result {
        Ok(()) => info!(connection_id, %role, "Connection closed"),
        Err(e) => warn!(connection_id, %role, error = %e, "Connection ended with error"),
    }
}

async fn bind_listener(config: &RelayConfig, role: ConnectionRole) -> RelayResult<TcpListener> {
    let listener_config = match role {
        ConnectionRole::Ingest => &config.ingest,
        ConnectionRole::Watcher => &config.watcher,
    };
    let addr = listener_config.socket_addr()?;

    TcpListener::bind(addr)
        .await
        .map_err(|e| {
            RelayError::Transport(format!("Failed to bind {} listener on {}: {}", role, addr, e))
        })
}

/// Next metrics tick, or never when reporting is disabled
async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
