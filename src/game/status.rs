use super::Player;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Game state as seen by one player.
///
/// `Draw` extends the classic NEXT/WIN/LOSE triple so that a full board with no
/// line can be reported as a terminal state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Next,
    Win,
    Lose,
    Draw,
}

impl GameStatus {
    /// Wire code for this status
    pub fn code(&self) -> u8 {
        match self {
            GameStatus::Next => 0,
            GameStatus::Win => 1,
            GameStatus::Lose => 2,
            GameStatus::Draw => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(GameStatus::Next),
            1 => Some(GameStatus::Win),
            2 => Some(GameStatus::Lose),
            3 => Some(GameStatus::Draw),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Next)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Next => write!(f, "Next move"),
            GameStatus::Win => write!(f, "You win"),
            GameStatus::Lose => write!(f, "You lose"),
            GameStatus::Draw => write!(f, "Draw"),
        }
    }
}

/// Why a player forfeited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForfeitReason {
    Disconnected,
    Timeout,
    Malformed,
    Resigned,
    OutOfMoves,
}

impl fmt::Display for ForfeitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForfeitReason::Disconnected => write!(f, "disconnected"),
            ForfeitReason::Timeout => write!(f, "timed out"),
            ForfeitReason::Malformed => write!(f, "sent too many malformed messages"),
            ForfeitReason::Resigned => write!(f, "resigned"),
            ForfeitReason::OutOfMoves => write!(f, "ran out of moves"),
        }
    }
}

/// Terminal result of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Won(Player),
    Draw,
    Forfeit { loser: Player, reason: ForfeitReason },
}

impl Outcome {
    /// The status reported to `player` for this outcome
    pub fn status_for(&self, player: Player) -> GameStatus {
        match *self {
            Outcome::Won(winner) if winner == player => GameStatus::Win,
            Outcome::Won(_) => GameStatus::Lose,
            Outcome::Draw => GameStatus::Draw,
            Outcome::Forfeit { loser, .. } if loser == player => GameStatus::Lose,
            Outcome::Forfeit { .. } => GameStatus::Win,
        }
    }

    pub fn winner(&self) -> Option<Player> {
        match *self {
            Outcome::Won(winner) => Some(winner),
            Outcome::Draw => None,
            Outcome::Forfeit { loser, .. } => Some(loser.opponent()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Won(player) => write!(f, "{} won", player),
            Outcome::Draw => write!(f, "draw"),
            Outcome::Forfeit { loser, reason } => write!(f, "{} forfeited ({})", loser, reason),
        }
    }
}
