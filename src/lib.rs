pub mod cli;
pub mod config;
pub mod game;
pub mod messages;
pub mod network;
pub mod parse;

// Re-export key types for easy testing
pub use config::{ClientConfig, ServerConfig};
pub use game::{Board, GameSession, GameStatus, Player, Position};
pub use messages::{ErrorCode, Message};
pub use network::{Client, Connection, Server};
