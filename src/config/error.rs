use crate::parse::ParseError;
use thiserror::Error;

/// Startup configuration failures. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required option '{option}'")]
    Missing { option: String },

    #[error("Unknown option '{option}'")]
    UnknownOption { option: String },

    #[error("Invalid value for '{option}': {source}")]
    Invalid {
        option: String,
        #[source]
        source: ParseError,
    },

    #[error("Invalid address for '{option}': '{value}'")]
    InvalidAddress { option: String, value: String },

    #[error("Unsupported value type for '{option}': expected an integer or a string")]
    UnsupportedValue { option: String },

    #[error("Inconsistent option '{option}': {reason}")]
    Inconsistent { option: String, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine the config directory")]
    NoConfigDir,
}

impl ConfigError {
    /// Name of the offending option, when the error concerns one
    pub fn option(&self) -> Option<&str> {
        match self {
            ConfigError::Missing { option }
            | ConfigError::UnknownOption { option }
            | ConfigError::Invalid { option, .. }
            | ConfigError::InvalidAddress { option, .. }
            | ConfigError::UnsupportedValue { option }
            | ConfigError::Inconsistent { option, .. } => Some(option),
            ConfigError::Io { .. }
            | ConfigError::Toml(_)
            | ConfigError::Serialize(_)
            | ConfigError::NoConfigDir => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
