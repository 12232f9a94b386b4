use super::{ForfeitReason, Player, Position};
use std::time::Duration;
use thiserror::Error;

/// Rejections raised by the board itself. A rejected move never changes the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Invalid board size {size}: must be between {min} and {max}")]
    InvalidSize { size: u8, min: u8, max: u8 },

    #[error("Invalid win length {win_length} for a {size}x{size} board")]
    InvalidWinLength { win_length: u8, size: u8 },

    #[error("Position {position} is outside the {size}x{size} board")]
    OutOfRange { position: Position, size: u8 },

    #[error("Position {position} is already taken by {owner}")]
    Occupied { position: Position, owner: Player },
}

/// Rejections raised by the session for a single submitted move.
///
/// All of these are recoverable: the session keeps its state and the same
/// player keeps the turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Invalid move: {0}")]
    InvalidMove(#[from] BoardError),

    #[error("Not your turn: {expected} is to move, got a move from {got}")]
    NotYourTurn { expected: Player, got: Player },

    #[error("Game is already over")]
    GameOver,
}

/// Failures that end a session. The client forfeits whenever one of these occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionFault {
    #[error("Peer disconnected")]
    Disconnected,

    #[error("No message received within {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Too many malformed messages ({count})")]
    TooManyMalformed { count: u32 },
}

impl SessionFault {
    pub fn forfeit_reason(&self) -> ForfeitReason {
        match self {
            SessionFault::Disconnected => ForfeitReason::Disconnected,
            SessionFault::Timeout { .. } => ForfeitReason::Timeout,
            SessionFault::TooManyMalformed { .. } => ForfeitReason::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_fault_keeps_sub_second_precision() {
        let fault = SessionFault::Timeout {
            timeout: Duration::from_millis(200),
        };
        assert_eq!(fault.to_string(), "No message received within 200ms");
        assert_eq!(fault.forfeit_reason(), ForfeitReason::Timeout);
    }
}
