pub mod client;
pub mod connection;
pub mod handler;
pub mod server;

pub use client::{Client, GameEvent};
pub use connection::{Connection, ConnectionError};
pub use handler::SessionHandler;
pub use server::Server;
