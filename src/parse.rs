//! Field parsers shared by the configuration loader and the wire codec.

use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("value is empty")]
    Empty,

    #[error("'{0}' is not a decimal integer")]
    NotANumber(String),

    #[error("{0} is below zero")]
    Negative(i64),

    #[error("{value} is outside {min}..={max}")]
    OutOfRange { value: u64, min: u64, max: u64 },

    #[error("{len} characters exceeds the limit of {max}")]
    TooLong { len: usize, max: usize },

    #[error("invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Parse a strict decimal integer within `range`.
///
/// Only ASCII digits with an optional leading `-` are accepted. Negative
/// values are always rejected, even when they would parse.
pub fn parse_int(input: &str, range: RangeInclusive<u64>) -> Result<u64, ParseError> {
    let s = strip_line_ending(input);
    if s.is_empty() {
        return Err(ParseError::Empty);
    }

    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::NotANumber(s.to_string()));
    }

    let value: i64 = s.parse().map_err(|_| ParseError::NotANumber(s.to_string()))?;
    if value < 0 {
        return Err(ParseError::Negative(value));
    }

    let value = value as u64;
    if !range.contains(&value) {
        return Err(ParseError::OutOfRange {
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }

    Ok(value)
}

/// Parse a single printable token of at most `max_len` characters.
///
/// A trailing line ending is dropped first. Whitespace and control
/// characters inside the value are rejected.
pub fn parse_string(input: &str, max_len: usize) -> Result<String, ParseError> {
    let s = strip_line_ending(input);
    if s.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(bad) = s.chars().find(|c| !c.is_ascii_graphic()) {
        return Err(ParseError::InvalidCharacter(bad));
    }

    if s.len() > max_len {
        return Err(ParseError::TooLong { len: s.len(), max: max_len });
    }

    Ok(s.to_string())
}

fn strip_line_ending(s: &str) -> &str {
    s.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(s)
}
