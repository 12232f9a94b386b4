use super::error::{ConfigError, Result};
use super::option::{ConfigOption, ConfigSchema, OptionKind, RawOptions};
use crate::game::{Board, BoardError, MAX_BOARD_SIZE, MIN_BOARD_SIZE, MIN_WIN_LENGTH};
use directories::ProjectDirs;
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const SERVER_OPTIONS: &[ConfigOption] = &[
    ConfigOption {
        name: "server_address",
        kind: OptionKind::Address,
        default: Some("127.0.0.1"),
    },
    ConfigOption {
        name: "server_port",
        kind: OptionKind::Int {
            min: 1,
            max: u16::MAX as u64,
        },
        default: Some("8080"),
    },
    ConfigOption {
        name: "field_size",
        kind: OptionKind::Int {
            min: MIN_BOARD_SIZE as u64,
            max: MAX_BOARD_SIZE as u64,
        },
        default: Some("3"),
    },
    ConfigOption {
        name: "win_length",
        kind: OptionKind::Int {
            min: MIN_WIN_LENGTH as u64,
            max: MAX_BOARD_SIZE as u64,
        },
        default: Some("3"),
    },
    // 0 allows one move per cell
    ConfigOption {
        name: "number_of_moves",
        kind: OptionKind::Int {
            min: 0,
            max: (MAX_BOARD_SIZE as u64).pow(2),
        },
        default: Some("0"),
    },
    ConfigOption {
        name: "max_malformed",
        kind: OptionKind::Int { min: 0, max: 100 },
        default: Some("3"),
    },
    ConfigOption {
        name: "move_timeout",
        kind: OptionKind::Int { min: 1, max: 3600 },
        default: Some("60"),
    },
    ConfigOption {
        name: "max_sessions",
        kind: OptionKind::Int { min: 1, max: 10_000 },
        default: Some("10"),
    },
];

pub const SERVER_SCHEMA: ConfigSchema = ConfigSchema::new(SERVER_OPTIONS);

/// On-disk form of [`ServerConfig`], keyed by option name
#[derive(Debug, Serialize)]
struct ServerConfigFile {
    server_address: String,
    server_port: u16,
    field_size: u8,
    win_length: u8,
    number_of_moves: u32,
    max_malformed: u32,
    move_timeout: u64,
    max_sessions: usize,
}

impl From<&ServerConfig> for ServerConfigFile {
    fn from(config: &ServerConfig) -> Self {
        Self {
            server_address: config.host.to_string(),
            server_port: config.port,
            field_size: config.field_size,
            win_length: config.win_length,
            number_of_moves: config.number_of_moves,
            max_malformed: config.max_malformed,
            move_timeout: config.move_timeout.as_secs(),
            max_sessions: config.max_sessions,
        }
    }
}

/// Validated server settings. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub field_size: u8,
    pub win_length: u8,
    /// Moves each player may make before losing
    pub number_of_moves: u32,
    pub max_malformed: u32,
    pub move_timeout: Duration,
    pub max_sessions: usize,
}

impl ServerConfig {
    pub fn from_raw(raw: &RawOptions) -> Result<Self> {
        let resolved = SERVER_SCHEMA.resolve(raw)?;
        let field_size = resolved.int("field_size")? as u8;
        let number_of_moves = match resolved.int("number_of_moves")? as u32 {
            0 => u32::from(field_size).pow(2),
            moves => moves,
        };

        let config = Self {
            host: resolved.address("server_address")?,
            port: resolved.int("server_port")? as u16,
            field_size,
            win_length: resolved.int("win_length")? as u8,
            number_of_moves,
            max_malformed: resolved.int("max_malformed")? as u32,
            move_timeout: Duration::from_secs(resolved.int("move_timeout")?),
            max_sessions: resolved.int("max_sessions")? as usize,
        };

        if config.win_length > config.field_size {
            return Err(ConfigError::Inconsistent {
                option: "win_length".to_string(),
                reason: format!(
                    "{} exceeds field_size {}",
                    config.win_length, config.field_size
                ),
            });
        }

        debug!(?config, "Server configuration resolved");
        Ok(config)
    }

    /// Load from `path` (or the default config file if it exists), then apply `overrides`
    pub fn load(path: Option<&Path>, overrides: RawOptions) -> Result<Self> {
        let base = match path {
            Some(path) => RawOptions::from_file(path)?,
            None => match Self::default_config_file() {
                Ok(default) if default.exists() => {
                    info!("Using config file {}", default.display());
                    RawOptions::from_file(&default)?
                }
                _ => RawOptions::new(),
            },
        };

        Self::from_raw(&base.merge(overrides))
    }

    /// Get the default config file path
    pub fn default_config_file() -> Result<PathBuf> {
        ProjectDirs::from("dev", "gridlock", "gridlock")
            .map(|dirs| dirs.config_dir().join("server.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&ServerConfigFile::from(self))?)
    }

    /// Write the configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(io_err)?;

        info!("Configuration written to {}", path.display());
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// A fresh, empty board with the configured dimensions
    pub fn new_board(&self) -> std::result::Result<Board, BoardError> {
        Board::new(self.field_size, self.win_length)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            field_size: 3,
            win_length: 3,
            number_of_moves: 9,
            max_malformed: 3,
            move_timeout: Duration::from_secs(60),
            max_sessions: 10,
        }
    }
}
