//! Drives one [`GameSession`] over one client connection.
//!
//! The client is always seated as player-1; player-2 is the built-in
//! [`Opponent`]. The handler owns the session, so the board is released
//! exactly once, when the handler finishes.

use super::connection::{Connection, ConnectionError};
use crate::game::{
    Board, ForfeitReason, GameSession, Opponent, Outcome, Player, Position, SessionFault,
    SessionState, Transition,
};
use crate::messages::{ErrorCode, Message};
use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

/// What the client sent, or why it will send nothing more
#[derive(Debug)]
enum ClientEvent {
    Message(Message),
    Malformed(ConnectionError),
    Gone(SessionFault),
}

pub struct SessionHandler {
    connection: Connection,
    session: GameSession,
    opponent: Opponent,
    seat: Player,
}

impl SessionHandler {
    pub fn new(connection: Connection, board: Board, max_malformed: u32, opponent: Opponent) -> Self {
        Self {
            connection,
            session: GameSession::with_malformed_limit(board, max_malformed),
            opponent,
            seat: Player::One,
        }
    }

    /// Limit the number of moves each side may make
    pub fn with_move_limit(mut self, limit: u32) -> Self {
        self.session = self.session.with_move_limit(limit);
        self
    }

    /// Play the game to completion and close the connection.
    ///
    /// Transport failures while writing end the game as a disconnect forfeit.
    pub async fn run(mut self) -> Outcome {
        if let Err(e) = self.play().await {
            warn!(error = %e, "Session aborted");
            self.session.forfeit(self.seat, ForfeitReason::Disconnected);
        }

        if let Err(e) = self.connection.close().await {
            debug!(error = %e, "Error while closing connection");
        }

        let seat = self.seat;
        match self.session.into_outcome() {
            Some(outcome) => outcome,
            // play() only returns once the session is finished
            None => Outcome::Forfeit {
                loser: seat,
                reason: ForfeitReason::Disconnected,
            },
        }
    }

    async fn play(&mut self) -> Result<()> {
        if !self.await_hello().await? {
            return self.finish().await;
        }

        let board = self.session.board();
        let welcome = Message::Welcome {
            size: board.size(),
            win_length: board.win_length(),
            seat: self.seat,
        };
        self.connection.send_message(&welcome).await?;
        self.connection
            .send_message(&Message::Turn { player: Player::One })
            .await?;

        loop {
            match self.session.state() {
                SessionState::Finished(_) => return self.finish().await,
                SessionState::AwaitingMove(player) if player == self.seat => {
                    self.client_turn().await?
                }
                SessionState::AwaitingMove(player) => self.opponent_turn(player).await?,
            }
        }
    }

    /// Wait for the client's `Hello`. Returns false if the session ended first.
    async fn await_hello(&mut self) -> Result<bool> {
        while !self.session.is_finished() {
            match self.next_event().await {
                ClientEvent::Message(Message::Hello { name }) => {
                    info!(player = %name, "Player joined");
                    return Ok(true);
                }
                ClientEvent::Message(other) => {
                    debug!(message_type = other.message_type(), "Expected Hello");
                    self.reject(ErrorCode::Unexpected).await?;
                }
                ClientEvent::Malformed(e) => {
                    debug!(error = %e, "Malformed Hello");
                    self.reject(ErrorCode::Malformed).await?;
                }
                ClientEvent::Gone(fault) => {
                    self.session.forfeit(self.seat, fault.forfeit_reason());
                }
            }
        }
        Ok(false)
    }

    async fn client_turn(&mut self) -> Result<()> {
        match self.next_event().await {
            ClientEvent::Message(Message::Move { position }) => {
                match self.session.submit(self.seat, position) {
                    Ok(transition) => self.announce(self.seat, position, transition).await?,
                    Err(e) => {
                        debug!(%position, error = %e, "Move rejected");
                        let code = ErrorCode::from(&e);
                        self.connection.send_message(&Message::Error { code }).await?;
                    }
                }
            }
            ClientEvent::Message(Message::Resign) => {
                self.session.forfeit(self.seat, ForfeitReason::Resigned);
            }
            ClientEvent::Message(other) => {
                debug!(message_type = other.message_type(), "Unexpected message");
                self.reject(ErrorCode::Unexpected).await?;
            }
            ClientEvent::Malformed(e) => {
                debug!(error = %e, "Malformed message");
                self.reject(ErrorCode::Malformed).await?;
            }
            ClientEvent::Gone(fault) => {
                self.session.forfeit(self.seat, fault.forfeit_reason());
            }
        }
        Ok(())
    }

    async fn opponent_turn(&mut self, player: Player) -> Result<()> {
        let Some(position) = self.opponent.choose(self.session.board(), player) else {
            // a full board is always evaluated as a draw before this point
            error!("Opponent found no empty cell");
            self.session.forfeit(player, ForfeitReason::Resigned);
            return Ok(());
        };

        let transition = self
            .session
            .submit(player, position)
            .context("Opponent chose an illegal move")?;
        self.announce(player, position, transition).await
    }

    async fn announce(
        &mut self,
        player: Player,
        position: Position,
        transition: Transition,
    ) -> Result<()> {
        debug!(%player, %position, "Move applied");
        self.connection
            .send_message(&Message::Moved { player, position })
            .await?;

        if let Transition::Continue { next } = transition {
            self.connection
                .send_message(&Message::Turn { player: next })
                .await?;
        }
        Ok(())
    }

    /// Answer a bad message with an `Error` and count it against the client
    async fn reject(&mut self, code: ErrorCode) -> Result<()> {
        self.connection.send_message(&Message::Error { code }).await?;
        match self.session.record_malformed(self.seat) {
            Ok(remaining) => debug!(remaining, "Malformed message tolerated"),
            Err(fault) => warn!(%fault, "Disconnecting client"),
        }
        Ok(())
    }

    /// Report the final status to the client, unless it is already gone
    async fn finish(&mut self) -> Result<()> {
        let Some(outcome) = self.session.outcome() else {
            return Ok(());
        };

        let status = outcome.status_for(self.seat);
        let opponent_status = outcome.status_for(self.seat.opponent());
        info!(%outcome, client = %status, opponent = %opponent_status, "Game over");

        let gone = matches!(
            outcome,
            Outcome::Forfeit {
                reason: ForfeitReason::Disconnected,
                ..
            }
        );
        if !gone {
            self.connection
                .send_message(&Message::Status { status })
                .await?;
        }
        Ok(())
    }

    async fn next_event(&mut self) -> ClientEvent {
        match self.connection.receive_message().await {
            Ok(message) => ClientEvent::Message(message),
            Err(e) if e.is_recoverable() => ClientEvent::Malformed(e),
            Err(e) if e.is_timeout() => {
                let fault = SessionFault::Timeout {
                    timeout: self.connection.wire_config().read_timeout,
                };
                info!(%fault, "Client timed out");
                ClientEvent::Gone(fault)
            }
            Err(ConnectionError::ConnectionClosed) => {
                info!("Client disconnected");
                ClientEvent::Gone(SessionFault::Disconnected)
            }
            Err(e) => {
                warn!(error = %e, "Connection lost");
                ClientEvent::Gone(SessionFault::Disconnected)
            }
        }
    }
}
