use super::codec::{self, CodecError, BUF_MESSAGE_SIZE};
use super::Message;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, instrument, trace, warn};

// Wire protocol constants
pub const LENGTH_PREFIX_SIZE: usize = 1; // one byte, a frame never exceeds BUF_MESSAGE_SIZE
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeouts applied to framed reads and writes
#[derive(Debug, Clone)]
pub struct WireConfig {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl WireConfig {
    pub fn new(read_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            read_timeout,
            write_timeout,
        }
    }

    /// Create a WireConfig with a single timeout for both read and write operations
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, timeout)
    }
}

/// Custom error types for wire protocol operations
#[derive(Error, Debug)]
pub enum WireProtocolError {
    #[error("Invalid length prefix: {length}")]
    InvalidLength { length: u8 },

    #[error("Read operation timed out after {timeout:?}")]
    ReadTimeout { timeout: Duration },

    #[error("Write operation timed out after {timeout:?}")]
    WriteTimeout { timeout: Duration },

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Unexpected end of file while reading {operation}")]
    UnexpectedEof { operation: String },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireProtocolError {
    /// A recoverable error consumed exactly one frame and left the stream in sync
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WireProtocolError::Codec(_) | WireProtocolError::InvalidLength { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            WireProtocolError::ReadTimeout { .. } | WireProtocolError::WriteTimeout { .. }
        )
    }
}

/// Length-prefixed framing for encoded [`Message`]s.
///
/// Each frame is a single length byte `L` followed by `L` bytes of encoded
/// message. Frames longer than [`BUF_MESSAGE_SIZE`] are drained through a fixed
/// scratch buffer and reported as a codec error, so the reader never holds
/// more than one bounded message.
#[derive(Debug, Clone, Default)]
pub struct FramedMessage {
    wire_config: WireConfig,
}

impl FramedMessage {
    pub fn new(wire_config: WireConfig) -> Self {
        Self { wire_config }
    }

    /// Get the current wire protocol configuration
    pub fn wire_config(&self) -> &WireConfig {
        &self.wire_config
    }

    #[instrument(level = "debug", skip(self, writer, message), fields(message_type = message.message_type()))]
    pub async fn write_message(
        &self,
        writer: &mut (impl AsyncWrite + Unpin),
        message: &Message,
    ) -> Result<(), WireProtocolError> {
        let bytes = codec::encode(message).map_err(|e| {
            error!(error = %e, "Refusing to send unencodable message");
            e
        })?;

        let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + bytes.len());
        frame.push(bytes.len() as u8);
        frame.extend_from_slice(&bytes);

        writer.write_all(&frame).await?;
        writer.flush().await?;

        trace!(frame_size = frame.len(), "Frame written");
        Ok(())
    }

    /// Read one frame and decode it.
    ///
    /// A clean EOF before the length byte is reported as `ConnectionClosed`.
    #[instrument(level = "debug", skip(self, reader))]
    pub async fn read_message(
        &self,
        reader: &mut (impl AsyncRead + Unpin),
    ) -> Result<Message, WireProtocolError> {
        let mut length_buffer = [0u8; LENGTH_PREFIX_SIZE];
        if reader.read(&mut length_buffer).await? == 0 {
            return Err(WireProtocolError::ConnectionClosed);
        }

        let length = length_buffer[0];
        if length == 0 {
            warn!("Received zero-length frame");
            return Err(WireProtocolError::InvalidLength { length });
        }

        let length = length as usize;
        if length > BUF_MESSAGE_SIZE {
            warn!(length, max = BUF_MESSAGE_SIZE, "Oversized frame, discarding body");
            let mut scratch = [0u8; u8::MAX as usize];
            Self::read_exact_or_eof(reader, &mut scratch[..length], "oversized frame").await?;
            return Err(CodecError::TooLarge {
                size: length,
                max: BUF_MESSAGE_SIZE,
            }
            .into());
        }

        let mut body = [0u8; BUF_MESSAGE_SIZE];
        Self::read_exact_or_eof(reader, &mut body[..length], "message body").await?;

        let message = codec::decode(&body[..length])?;
        debug!(message_type = message.message_type(), "Frame decoded");
        Ok(message)
    }

    /// Read a message, failing with `ReadTimeout` if none arrives within `timeout_duration`
    #[instrument(level = "debug", skip(self, reader), fields(timeout_ms = timeout_duration.as_millis() as u64))]
    pub async fn read_message_with_timeout(
        &self,
        reader: &mut (impl AsyncRead + Unpin),
        timeout_duration: Duration,
    ) -> Result<Message, WireProtocolError> {
        match tokio::time::timeout(timeout_duration, self.read_message(reader)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                debug!(timeout = ?timeout_duration, "Read operation timed out");
                Err(WireProtocolError::ReadTimeout {
                    timeout: timeout_duration,
                })
            }
        }
    }

    #[instrument(level = "debug", skip(self, writer, message), fields(timeout_ms = timeout_duration.as_millis() as u64))]
    pub async fn write_message_with_timeout(
        &self,
        writer: &mut (impl AsyncWrite + Unpin),
        message: &Message,
        timeout_duration: Duration,
    ) -> Result<(), WireProtocolError> {
        match tokio::time::timeout(timeout_duration, self.write_message(writer, message)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                error!(timeout = ?timeout_duration, "Write operation timed out");
                Err(WireProtocolError::WriteTimeout {
                    timeout: timeout_duration,
                })
            }
        }
    }

    /// Read a message using the configured default timeout
    pub async fn read_message_with_default_timeout(
        &self,
        reader: &mut (impl AsyncRead + Unpin),
    ) -> Result<Message, WireProtocolError> {
        self.read_message_with_timeout(reader, self.wire_config.read_timeout)
            .await
    }

    /// Write a message using the configured default timeout
    pub async fn write_message_with_default_timeout(
        &self,
        writer: &mut (impl AsyncWrite + Unpin),
        message: &Message,
    ) -> Result<(), WireProtocolError> {
        self.write_message_with_timeout(writer, message, self.wire_config.write_timeout)
            .await
    }

    async fn read_exact_or_eof(
        reader: &mut (impl AsyncRead + Unpin),
        buffer: &mut [u8],
        operation: &str,
    ) -> Result<(), WireProtocolError> {
        match reader.read_exact(buffer).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                error!(expected = buffer.len(), operation, "Unexpected EOF inside frame");
                Err(WireProtocolError::UnexpectedEof {
                    operation: operation.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
