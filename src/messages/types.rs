use crate::game::{BoardError, GameStatus, Player, Position, SessionError};
use std::fmt;

/// Longest player name accepted in a `Hello`
pub const MAX_NAME_LEN: usize = 9;

/// Reason carried by an `Error` notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Malformed,
    OutOfRange,
    Occupied,
    NotYourTurn,
    GameOver,
    Unexpected,
}

impl ErrorCode {
    pub fn code(&self) -> u8 {
        match self {
            ErrorCode::Malformed => 1,
            ErrorCode::OutOfRange => 2,
            ErrorCode::Occupied => 3,
            ErrorCode::NotYourTurn => 4,
            ErrorCode::GameOver => 5,
            ErrorCode::Unexpected => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ErrorCode::Malformed),
            2 => Some(ErrorCode::OutOfRange),
            3 => Some(ErrorCode::Occupied),
            4 => Some(ErrorCode::NotYourTurn),
            5 => Some(ErrorCode::GameOver),
            6 => Some(ErrorCode::Unexpected),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Malformed => write!(f, "Malformed message"),
            ErrorCode::OutOfRange => write!(f, "Invalid move: off the board"),
            ErrorCode::Occupied => write!(f, "Invalid move: cell already taken"),
            ErrorCode::NotYourTurn => write!(f, "Not your turn"),
            ErrorCode::GameOver => write!(f, "Game is over"),
            ErrorCode::Unexpected => write!(f, "Unexpected message"),
        }
    }
}

impl From<&SessionError> for ErrorCode {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::InvalidMove(BoardError::Occupied { .. }) => ErrorCode::Occupied,
            SessionError::InvalidMove(_) => ErrorCode::OutOfRange,
            SessionError::NotYourTurn { .. } => ErrorCode::NotYourTurn,
            SessionError::GameOver => ErrorCode::GameOver,
        }
    }
}

/// Every message exchanged between client and server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Client introduces itself
    Hello { name: String },
    /// Server accepts the client and assigns its seat
    Welcome { size: u8, win_length: u8, seat: Player },
    /// Client plays a cell
    Move { position: Position },
    /// A move was applied to the board
    Moved { player: Player, position: Position },
    /// `player` is now to move
    Turn { player: Player },
    /// Final status, from the receiver's point of view
    Status { status: GameStatus },
    /// The last client message was rejected
    Error { code: ErrorCode },
    /// Client gives up
    Resign,
}

impl Message {
    pub fn new_hello(name: impl Into<String>) -> Self {
        Message::Hello { name: name.into() }
    }

    pub fn new_move(row: u8, col: u8) -> Self {
        Message::Move {
            position: Position::new(row, col),
        }
    }

    /// Get the message type as a string
    pub fn message_type(&self) -> &'static str {
        match self {
            Message::Hello { .. } => "Hello",
            Message::Welcome { .. } => "Welcome",
            Message::Move { .. } => "Move",
            Message::Moved { .. } => "Moved",
            Message::Turn { .. } => "Turn",
            Message::Status { .. } => "Status",
            Message::Error { .. } => "Error",
            Message::Resign => "Resign",
        }
    }

    /// Whether this message ends the exchange
    pub fn is_terminal(&self) -> bool {
        matches!(self, Message::Status { status } if status.is_terminal())
    }
}
