use crate::config::ServerConfig;
use crate::game::Opponent;
use crate::messages::wire::{WireConfig, DEFAULT_WRITE_TIMEOUT};
use crate::network::{Connection, SessionHandler};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// How long running sessions may continue after shutdown is requested
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    opponent_seed: Option<u64>,
    shutdown_grace: Duration,
}

impl Server {
    pub async fn bind(config: Arc<ServerConfig>) -> Result<Self> {
        Self::bind_to(config.bind_addr(), config).await
    }

    /// Bind to `addr` instead of the configured address, e.g. port 0 in tests
    pub async fn bind_to(addr: SocketAddr, config: Arc<ServerConfig>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind server to address: {}", addr))?;

        info!("Server successfully bound to address: {}", listener.local_addr()?);
        debug!(
            "Board {}x{}, {} in a row, move timeout {:?}, max sessions {}",
            config.field_size,
            config.field_size,
            config.win_length,
            config.move_timeout,
            config.max_sessions
        );

        Ok(Self {
            listener,
            config,
            opponent_seed: None,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        })
    }

    /// Seed the opponent of every session, making its choices reproducible
    pub fn with_opponent_seed(mut self, seed: u64) -> Self {
        self.opponent_seed = Some(seed);
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Accept connections forever
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Running sessions then get the shutdown grace period to finish; any still
    /// open after it, typically waiting on an idle client, are aborted.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        info!("Starting server on address: {:?}", self.listener.local_addr()?);
        tokio::pin!(shutdown);

        // Track active sessions for the connection limit and shutdown
        let mut active_sessions: HashMap<usize, JoinHandle<()>> = HashMap::new();
        let mut connection_counter = 0usize;

        loop {
            let (stream, peer_addr) = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        continue;
                    }
                },
            };

            connection_counter += 1;
            let connection_id = connection_counter;

            active_sessions.retain(|id, handle| {
                if handle.is_finished() {
                    debug!("Cleaning up completed connection {}", id);
                    false
                } else {
                    true
                }
            });

            if active_sessions.len() >= self.config.max_sessions {
                warn!(
                    "Session limit reached ({}), rejecting connection from {}",
                    self.config.max_sessions, peer_addr
                );
                // Dropping the stream closes the connection
                drop(stream);
                continue;
            }

            info!("Accepted new connection {} from {}", connection_id, peer_addr);

            let config = Arc::clone(&self.config);
            let opponent = match self.opponent_seed {
                Some(seed) => Opponent::with_seed(seed),
                None => Opponent::new(),
            };

            let handle = task::spawn(async move {
                if let Err(e) =
                    Self::handle_connection(stream, peer_addr, config, opponent, connection_id)
                        .await
                {
                    error!("Connection {} failed: {:#}", connection_id, e);
                }
            });
            active_sessions.insert(connection_id, handle);
        }

        if !active_sessions.is_empty() {
            info!(
                "Waiting up to {:?} for {} running sessions",
                self.shutdown_grace,
                active_sessions.len()
            );
        }
        let deadline = tokio::time::Instant::now() + self.shutdown_grace;
        for (id, mut handle) in active_sessions {
            let result = match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Aborting session {} after shutdown grace period", id);
                    handle.abort();
                    handle.await
                }
            };
            match result {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => debug!("Session {} aborted", id),
                Err(e) => error!("Session task {} ended abnormally: {}", id, e),
            }
        }

        info!("Server stopped");
        Ok(())
    }

    /// Handle individual connection lifecycle
    #[instrument(
        skip(stream, peer_addr, config, opponent),
        fields(session_id = %Uuid::new_v4(), peer = %peer_addr)
    )]
    async fn handle_connection(
        stream: TcpStream,
        peer_addr: SocketAddr,
        config: Arc<ServerConfig>,
        opponent: Opponent,
        connection_id: usize,
    ) -> Result<()> {
        stream
            .set_nodelay(true)
            .context("Failed to configure client socket")?;

        let wire_config = WireConfig::new(config.move_timeout, DEFAULT_WRITE_TIMEOUT);
        let connection = Connection::new(stream, wire_config);
        let board = config
            .new_board()
            .context("Configured board dimensions are invalid")?;

        let outcome = SessionHandler::new(connection, board, config.max_malformed, opponent)
            .with_move_limit(config.number_of_moves)
            .run()
            .await;

        info!("Connection {} finished: {}", connection_id, outcome);
        Ok(())
    }
}
