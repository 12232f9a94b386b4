//! Versioned text encoding for [`Message`].
//!
//! ```text
//! byte 0    protocol version
//! bytes 1.. ASCII body: <opcode> [field ...], single-space separated
//!
//! H name            Hello
//! W size win seat   Welcome
//! M row col         Move
//! D seat row col    Moved
//! T seat            Turn
//! S status          Status
//! E code            Error
//! R                 Resign
//! ```
//!
//! A complete encoded message never exceeds [`BUF_MESSAGE_SIZE`] bytes.

use super::types::{ErrorCode, Message, MAX_NAME_LEN};
use crate::game::{GameStatus, Player, Position, MAX_BOARD_SIZE};
use crate::parse::{parse_int, parse_string, ParseError};
use thiserror::Error;
use tracing::trace;

/// Upper bound on the size of one encoded message, version byte included
pub const BUF_MESSAGE_SIZE: usize = 15;
/// Smallest valid message: version byte plus a one-letter opcode
pub const MIN_MESSAGE_SIZE: usize = 2;
pub const PROTOCOL_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Message too large: {size} bytes exceeds maximum of {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("Message too small: {size} bytes is below minimum of {min} bytes")]
    TooShort { size: usize, min: usize },

    #[error("Unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    #[error("Message body is not printable ASCII")]
    NotAscii,

    #[error("Unknown opcode {0:?}")]
    UnknownOpcode(String),

    #[error("Opcode {opcode} expects {expected} fields, got {got}")]
    FieldCount { opcode: char, expected: usize, got: usize },

    #[error("Invalid {field}: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("Unknown {field} code {code}")]
    UnknownCode { field: &'static str, code: u8 },

    #[error("Message does not survive a decode round trip")]
    NotCanonical,
}

impl CodecError {
    /// True when the rejection came from a value below zero
    pub fn is_negative_value(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidField {
                source: ParseError::Negative(_),
                ..
            }
        )
    }
}

/// Encode `message`, refusing anything that would not decode back to itself
pub fn encode(message: &Message) -> Result<Vec<u8>, CodecError> {
    let body = match message {
        Message::Hello { name } => format!("H {}", name),
        Message::Welcome { size, win_length, seat } => {
            format!("W {} {} {}", size, win_length, seat.seat())
        }
        Message::Move { position } => format!("M {} {}", position.row, position.col),
        Message::Moved { player, position } => {
            format!("D {} {} {}", player.seat(), position.row, position.col)
        }
        Message::Turn { player } => format!("T {}", player.seat()),
        Message::Status { status } => format!("S {}", status.code()),
        Message::Error { code } => format!("E {}", code.code()),
        Message::Resign => "R".to_string(),
    };

    let mut bytes = Vec::with_capacity(1 + body.len());
    bytes.push(PROTOCOL_VERSION);
    bytes.extend_from_slice(body.as_bytes());

    if bytes.len() > BUF_MESSAGE_SIZE {
        return Err(CodecError::TooLarge {
            size: bytes.len(),
            max: BUF_MESSAGE_SIZE,
        });
    }

    // catch values that would be rejected or altered on the way back in
    if decode(&bytes)? != *message {
        return Err(CodecError::NotCanonical);
    }

    trace!(message_type = message.message_type(), size = bytes.len(), "Encoded message");
    Ok(bytes)
}

/// Decode one message, rejecting anything oversized or malformed
pub fn decode(bytes: &[u8]) -> Result<Message, CodecError> {
    if bytes.len() > BUF_MESSAGE_SIZE {
        return Err(CodecError::TooLarge {
            size: bytes.len(),
            max: BUF_MESSAGE_SIZE,
        });
    }
    if bytes.len() < MIN_MESSAGE_SIZE {
        return Err(CodecError::TooShort {
            size: bytes.len(),
            min: MIN_MESSAGE_SIZE,
        });
    }
    if bytes[0] != PROTOCOL_VERSION {
        return Err(CodecError::UnsupportedVersion(bytes[0]));
    }

    let body = &bytes[1..];
    if !body.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        return Err(CodecError::NotAscii);
    }
    let body = std::str::from_utf8(body).map_err(|_| CodecError::NotAscii)?;

    let mut parts = body.split(' ');
    let opcode = parts.next().unwrap_or_default();
    let fields: Vec<&str> = parts.collect();

    let opcode = match opcode.as_bytes() {
        [single] => *single as char,
        _ => return Err(CodecError::UnknownOpcode(opcode.to_string())),
    };

    let expect = |expected: usize| -> Result<(), CodecError> {
        if fields.len() == expected {
            Ok(())
        } else {
            Err(CodecError::FieldCount {
                opcode,
                expected,
                got: fields.len(),
            })
        }
    };

    let message = match opcode {
        'H' => {
            expect(1)?;
            Message::Hello {
                name: parse_string(fields[0], MAX_NAME_LEN).map_err(field_err("name"))?,
            }
        }
        'W' => {
            expect(3)?;
            Message::Welcome {
                size: board_dimension(fields[0], "size")?,
                win_length: board_dimension(fields[1], "win length")?,
                seat: seat(fields[2])?,
            }
        }
        'M' => {
            expect(2)?;
            Message::Move {
                position: position(fields[0], fields[1])?,
            }
        }
        'D' => {
            expect(3)?;
            Message::Moved {
                player: seat(fields[0])?,
                position: position(fields[1], fields[2])?,
            }
        }
        'T' => {
            expect(1)?;
            Message::Turn {
                player: seat(fields[0])?,
            }
        }
        'S' => {
            expect(1)?;
            let code = small_int(fields[0], "status")?;
            Message::Status {
                status: GameStatus::from_code(code)
                    .ok_or(CodecError::UnknownCode { field: "status", code })?,
            }
        }
        'E' => {
            expect(1)?;
            let code = small_int(fields[0], "error code")?;
            Message::Error {
                code: ErrorCode::from_code(code)
                    .ok_or(CodecError::UnknownCode { field: "error code", code })?,
            }
        }
        'R' => {
            expect(0)?;
            Message::Resign
        }
        other => return Err(CodecError::UnknownOpcode(other.to_string())),
    };

    Ok(message)
}

fn field_err(field: &'static str) -> impl Fn(ParseError) -> CodecError {
    move |source| CodecError::InvalidField { field, source }
}

fn small_int(field: &str, name: &'static str) -> Result<u8, CodecError> {
    parse_int(field, 0..=u8::MAX as u64)
        .map(|v| v as u8)
        .map_err(field_err(name))
}

fn board_dimension(field: &str, name: &'static str) -> Result<u8, CodecError> {
    parse_int(field, 1..=MAX_BOARD_SIZE as u64)
        .map(|v| v as u8)
        .map_err(field_err(name))
}

fn coordinate(field: &str, name: &'static str) -> Result<u8, CodecError> {
    parse_int(field, 0..=(MAX_BOARD_SIZE - 1) as u64)
        .map(|v| v as u8)
        .map_err(field_err(name))
}

fn position(row: &str, col: &str) -> Result<Position, CodecError> {
    Ok(Position::new(coordinate(row, "row")?, coordinate(col, "column")?))
}

fn seat(field: &str) -> Result<Player, CodecError> {
    let code = small_int(field, "seat")?;
    Player::from_seat(code).ok_or(CodecError::UnknownCode { field: "seat", code })
}
