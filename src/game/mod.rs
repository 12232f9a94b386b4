// Re-export all public items
pub use self::board::{Board, MAX_BOARD_SIZE, MIN_BOARD_SIZE, MIN_WIN_LENGTH};
pub use self::error::{BoardError, SessionError, SessionFault};
pub use self::opponent::Opponent;
pub use self::player::{Cell, Player};
pub use self::position::{ParsePositionError, Position};
pub use self::session::{GameSession, SessionState, Transition, DEFAULT_MAX_MALFORMED};
pub use self::status::{ForfeitReason, GameStatus, Outcome};

// Define submodules
pub mod board;
mod error;
pub mod opponent;
mod player;
mod position;
pub mod session;
mod status;
