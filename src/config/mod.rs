pub mod client;
pub mod error;
pub mod option;
pub mod server;

pub use client::{ClientConfig, CLIENT_SCHEMA};
pub use error::ConfigError;
pub use option::{ConfigOption, ConfigSchema, OptionKind, OptionValue, RawOptions, ResolvedOptions};
pub use server::{ServerConfig, SERVER_SCHEMA};
