pub mod commands;
pub mod display;

pub use commands::{Cli, Commands};
pub use display::{display_board, display_game_status, format_board, format_status};
