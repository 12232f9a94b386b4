//! Descriptor-driven option resolution.
//!
//! A [`ConfigSchema`] is a static list of [`ConfigOption`]s. Raw name/value
//! pairs from files and flags are checked against it in one pass; either every
//! option resolves or nothing does.

use super::error::{ConfigError, Result};
use crate::parse::{parse_int, parse_string};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;
use tracing::debug;

// Long enough for any textual IPv6 address
const MAX_ADDRESS_LEN: usize = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Non-negative integer within `min..=max`
    Int { min: u64, max: u64 },
    /// Single printable token of at most `max_len` characters
    Text { max_len: usize },
    /// IPv4 or IPv6 address
    Address,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigOption {
    pub name: &'static str,
    pub kind: OptionKind,
    /// Used when no raw value is supplied. Options without a default are required.
    pub default: Option<&'static str>,
}

impl ConfigOption {
    fn resolve(&self, raw: &str) -> Result<OptionValue> {
        match self.kind {
            OptionKind::Int { min, max } => parse_int(raw, min..=max)
                .map(OptionValue::Int)
                .map_err(|source| ConfigError::Invalid {
                    option: self.name.to_string(),
                    source,
                }),
            OptionKind::Text { max_len } => parse_string(raw, max_len)
                .map(OptionValue::Text)
                .map_err(|source| ConfigError::Invalid {
                    option: self.name.to_string(),
                    source,
                }),
            OptionKind::Address => parse_string(raw, MAX_ADDRESS_LEN)
                .ok()
                .and_then(|s| s.parse::<IpAddr>().ok())
                .map(OptionValue::Address)
                .ok_or_else(|| ConfigError::InvalidAddress {
                    option: self.name.to_string(),
                    value: raw.trim_end().to_string(),
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Int(u64),
    Text(String),
    Address(IpAddr),
}

/// Unvalidated name -> value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    values: BTreeMap<String, String>,
}

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Insert only when a value is present; convenient for optional CLI flags
    pub fn insert_opt<V: ToString>(&mut self, name: &str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(name, value.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of `self`; values from `other` win
    pub fn merge(mut self, other: RawOptions) -> Self {
        self.values.extend(other.values);
        self
    }

    /// Read a flat TOML table. Integers and booleans are kept in their textual form.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = content.parse()?;
        let mut raw = RawOptions::new();
        for (name, value) in table {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                _ => return Err(ConfigError::UnsupportedValue { option: name }),
            };
            raw.insert(name, text);
        }
        Ok(raw)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Loaded config file {}", path.display());
        Self::from_toml_str(&content)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawOptions {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut raw = RawOptions::new();
        for (name, value) in iter {
            raw.insert(name, value);
        }
        raw
    }
}

/// Validated values, one per schema option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    values: BTreeMap<&'static str, OptionValue>,
}

impl ResolvedOptions {
    pub fn int(&self, name: &str) -> Result<u64> {
        match self.values.get(name) {
            Some(OptionValue::Int(v)) => Ok(*v),
            _ => Err(ConfigError::Missing {
                option: name.to_string(),
            }),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str> {
        match self.values.get(name) {
            Some(OptionValue::Text(v)) => Ok(v.as_str()),
            _ => Err(ConfigError::Missing {
                option: name.to_string(),
            }),
        }
    }

    pub fn address(&self, name: &str) -> Result<IpAddr> {
        match self.values.get(name) {
            Some(OptionValue::Address(v)) => Ok(*v),
            _ => Err(ConfigError::Missing {
                option: name.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSchema {
    options: &'static [ConfigOption],
}

impl ConfigSchema {
    pub const fn new(options: &'static [ConfigOption]) -> Self {
        Self { options }
    }

    pub fn option(&self, name: &str) -> Option<&'static ConfigOption> {
        self.options.iter().find(|opt| opt.name == name)
    }

    /// Validate `raw` against every descriptor
    pub fn resolve(&self, raw: &RawOptions) -> Result<ResolvedOptions> {
        if let Some(unknown) = raw.names().find(|name| self.option(name).is_none()) {
            return Err(ConfigError::UnknownOption {
                option: unknown.to_string(),
            });
        }

        let mut values = BTreeMap::new();
        for option in self.options {
            let raw_value = raw
                .get(option.name)
                .or(option.default)
                .ok_or_else(|| ConfigError::Missing {
                    option: option.name.to_string(),
                })?;
            values.insert(option.name, option.resolve(raw_value)?);
        }

        Ok(ResolvedOptions { values })
    }
}
