use crate::messages::{FramedMessage, Message, WireConfig, WireProtocolError};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Wire protocol error: {0}")]
    WireProtocol(WireProtocolError),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<WireProtocolError> for ConnectionError {
    fn from(err: WireProtocolError) -> Self {
        match err {
            WireProtocolError::ConnectionClosed => ConnectionError::ConnectionClosed,
            other => ConnectionError::WireProtocol(other),
        }
    }
}

impl ConnectionError {
    /// The frame was bad but the stream is still usable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConnectionError::WireProtocol(e) if e.is_recoverable())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ConnectionError::WireProtocol(e) if e.is_timeout())
    }
}

/// A TCP stream speaking framed messages
pub struct Connection {
    stream: TcpStream,
    framed: FramedMessage,
}

impl Connection {
    pub fn new(stream: TcpStream, wire_config: WireConfig) -> Self {
        Self {
            stream,
            framed: FramedMessage::new(wire_config),
        }
    }

    pub async fn connect(
        addr: impl ToSocketAddrs,
        wire_config: WireConfig,
    ) -> Result<Self, ConnectionError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream, wire_config))
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr().ok()
    }

    pub fn wire_config(&self) -> &WireConfig {
        self.framed.wire_config()
    }

    #[instrument(level = "debug", skip(self, message), fields(message_type = message.message_type()))]
    pub async fn send_message(&mut self, message: &Message) -> Result<(), ConnectionError> {
        self.framed
            .write_message_with_default_timeout(&mut self.stream, message)
            .await?;
        Ok(())
    }

    /// Receive one message, waiting at most the configured read timeout
    pub async fn receive_message(&mut self) -> Result<Message, ConnectionError> {
        let message = self
            .framed
            .read_message_with_default_timeout(&mut self.stream)
            .await?;
        debug!(message_type = message.message_type(), "Received message");
        Ok(message)
    }

    /// Shut down the write half; the peer sees EOF
    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
