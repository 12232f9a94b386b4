use super::board::MAX_BOARD_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid position '{input}': {reason}")]
pub struct ParsePositionError {
    pub input: String,
    pub reason: String,
}

/// A cell coordinate. Bounds are checked against a concrete board when a move is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    // Column letter, 'A' for column 0
    pub fn col_char(&self) -> char {
        (self.col.min(25) + b'A') as char
    }

    /// Check whether the position lies on a `size`x`size` board
    pub fn within(&self, size: u8) -> bool {
        self.row < size && self.col < size
    }

    /// Step by a signed offset, returning `None` when leaving the non-negative quadrant
    pub(crate) fn offset(&self, d_row: i16, d_col: i16) -> Option<Position> {
        let row = self.row as i16 + d_row;
        let col = self.col as i16 + d_col;
        if row < 0 || col < 0 || row > u8::MAX as i16 || col > u8::MAX as i16 {
            return None;
        }
        Some(Position::new(row as u8, col as u8))
    }
}

/// Human notation: column letter followed by a 1-based row, e.g. `B3`
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.col_char(), self.row as u16 + 1)
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| ParsePositionError {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars
            .next()
            .ok_or_else(|| err("expected a column letter followed by a row number"))?
            .to_ascii_uppercase();

        if !letter.is_ascii_uppercase() || (letter as u8 - b'A') >= MAX_BOARD_SIZE {
            return Err(err("column must be a letter from A to T"));
        }

        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err("row must be a number from 1 to 20"));
        }

        let row: u8 = digits.parse().map_err(|_| err("row must be a number from 1 to 20"))?;
        if row == 0 || row > MAX_BOARD_SIZE {
            return Err(err("row must be a number from 1 to 20"));
        }

        Ok(Position::new(row - 1, letter as u8 - b'A'))
    }
}
