//! Turn-order state machine for a single game.
//!
//! The session owns its [`Board`] and is the only path through which the board
//! is mutated. It performs no I/O: the network layer feeds it moves and
//! protocol faults, and turns the returned [`Transition`]s into notifications.

use super::{Board, ForfeitReason, GameStatus, Outcome, Player, Position};
use super::{SessionError, SessionFault};
use tracing::{debug, info, warn};

/// Consecutive malformed messages tolerated before the sender is disconnected
pub const DEFAULT_MAX_MALFORMED: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingMove(Player),
    Finished(Outcome),
}

/// Result of an accepted move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The game goes on and `next` is to move
    Continue { next: Player },
    /// The move ended the game
    Finished(Outcome),
}

#[derive(Debug)]
pub struct GameSession {
    board: Board,
    state: SessionState,
    moves: Vec<(Player, Position)>,
    malformed_streak: u32,
    max_malformed: u32,
    move_limit: Option<u32>,
}

impl GameSession {
    /// Start a new game on `board` with player-1 to move
    pub fn new(board: Board) -> Self {
        Self::with_malformed_limit(board, DEFAULT_MAX_MALFORMED)
    }

    pub fn with_malformed_limit(board: Board, max_malformed: u32) -> Self {
        Self {
            board,
            state: SessionState::AwaitingMove(Player::One),
            moves: Vec::new(),
            malformed_streak: 0,
            max_malformed,
            move_limit: None,
        }
    }

    /// Limit each player to `limit` moves. A player who uses the last one
    /// without ending the game loses.
    pub fn with_move_limit(mut self, limit: u32) -> Self {
        self.move_limit = Some(limit);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Moves applied so far, in order
    pub fn moves(&self) -> &[(Player, Position)] {
        &self.moves
    }

    /// Moves `player` may still make, or `None` without a limit
    pub fn moves_left(&self, player: Player) -> Option<u32> {
        let made = self.moves.iter().filter(|(p, _)| *p == player).count() as u32;
        self.move_limit.map(|limit| limit.saturating_sub(made))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            SessionState::AwaitingMove(_) => None,
            SessionState::Finished(outcome) => Some(outcome),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    /// Status of the game from `player`'s point of view
    pub fn status_for(&self, player: Player) -> GameStatus {
        self.outcome()
            .map_or(GameStatus::Next, |outcome| outcome.status_for(player))
    }

    /// Apply a move for `player`.
    ///
    /// Rejections leave the board, the turn owner and the state untouched.
    pub fn submit(&mut self, player: Player, position: Position) -> Result<Transition, SessionError> {
        let expected = match self.state {
            SessionState::Finished(_) => return Err(SessionError::GameOver),
            SessionState::AwaitingMove(expected) => expected,
        };

        // a well-formed message arrived, whatever happens to the move itself
        self.malformed_streak = 0;

        if player != expected {
            debug!(%expected, got = %player, "Move out of turn");
            return Err(SessionError::NotYourTurn {
                expected,
                got: player,
            });
        }

        self.board.apply_move(player, position)?;
        self.moves.push((player, position));

        let transition = match self.board.evaluate() {
            GameStatus::Next if self.moves_left(player) == Some(0) => {
                let outcome = Outcome::Forfeit {
                    loser: player,
                    reason: ForfeitReason::OutOfMoves,
                };
                self.state = SessionState::Finished(outcome);
                info!(%player, moves = self.moves.len(), "Move limit reached");
                Transition::Finished(outcome)
            }
            GameStatus::Next => {
                let next = player.opponent();
                self.state = SessionState::AwaitingMove(next);
                Transition::Continue { next }
            }
            GameStatus::Win => {
                let outcome = Outcome::Won(player);
                self.state = SessionState::Finished(outcome);
                info!(%player, %position, moves = self.moves.len(), "Winning move");
                Transition::Finished(outcome)
            }
            GameStatus::Draw => {
                self.state = SessionState::Finished(Outcome::Draw);
                info!(moves = self.moves.len(), "Board full, game drawn");
                Transition::Finished(Outcome::Draw)
            }
            GameStatus::Lose => unreachable!("board evaluation is never from a loser's view"),
        };

        Ok(transition)
    }

    /// Count a message that failed to decode.
    ///
    /// Returns the number of further malformed messages that will still be
    /// tolerated. Once the limit is exceeded the session finishes with a
    /// forfeit for `sender` and the fault is returned.
    pub fn record_malformed(&mut self, sender: Player) -> Result<u32, SessionFault> {
        self.malformed_streak += 1;
        if self.malformed_streak > self.max_malformed {
            warn!(%sender, count = self.malformed_streak, "Malformed message limit exceeded");
            self.forfeit(sender, ForfeitReason::Malformed);
            return Err(SessionFault::TooManyMalformed {
                count: self.malformed_streak,
            });
        }
        Ok(self.max_malformed - self.malformed_streak)
    }

    /// End the game with `loser` forfeiting.
    ///
    /// Has no effect on a finished session; the existing outcome is returned.
    pub fn forfeit(&mut self, loser: Player, reason: ForfeitReason) -> Outcome {
        match self.state {
            SessionState::Finished(outcome) => outcome,
            SessionState::AwaitingMove(_) => {
                let outcome = Outcome::Forfeit { loser, reason };
                info!(%loser, %reason, "Session forfeited");
                self.state = SessionState::Finished(outcome);
                outcome
            }
        }
    }

    /// Close the session, dropping its board
    pub fn into_outcome(self) -> Option<Outcome> {
        self.outcome()
    }
}
