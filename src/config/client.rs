use super::error::Result;
use super::option::{ConfigOption, ConfigSchema, OptionKind, RawOptions};
use crate::messages::MAX_NAME_LEN;
use std::net::{IpAddr, SocketAddr};

const CLIENT_OPTIONS: &[ConfigOption] = &[
    ConfigOption {
        name: "name",
        kind: OptionKind::Text {
            max_len: MAX_NAME_LEN,
        },
        default: None,
    },
    ConfigOption {
        name: "host",
        kind: OptionKind::Address,
        default: Some("127.0.0.1"),
    },
    ConfigOption {
        name: "port",
        kind: OptionKind::Int {
            min: 1,
            max: u16::MAX as u64,
        },
        default: Some("8080"),
    },
];

pub const CLIENT_SCHEMA: ConfigSchema = ConfigSchema::new(CLIENT_OPTIONS);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub name: String,
    pub host: IpAddr,
    pub port: u16,
}

impl ClientConfig {
    pub fn from_raw(raw: &RawOptions) -> Result<Self> {
        let resolved = CLIENT_SCHEMA.resolve(raw)?;
        Ok(Self {
            name: resolved.text("name")?.to_string(),
            host: resolved.address("host")?,
            port: resolved.int("port")? as u16,
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
