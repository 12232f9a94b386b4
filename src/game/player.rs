use super::error::BoardError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// The other player
    pub fn opponent(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Seat number used on the wire (1 or 2)
    pub fn seat(&self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn from_seat(seat: u8) -> Option<Self> {
        match seat {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Board symbol for this player's marks
    pub fn symbol(&self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player-1"),
            Player::Two => write!(f, "player-2"),
        }
    }
}

/// State of a single board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Taken(Player),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn owner(&self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Taken(player) => Some(*player),
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => '*',
            Cell::Taken(player) => player.symbol(),
        }
    }

    /// Marks a cell for `player`, refusing to overwrite an existing mark
    pub(crate) fn claim(&mut self, player: Player, position: super::Position) -> Result<(), BoardError> {
        match *self {
            Cell::Empty => {
                *self = Cell::Taken(player);
                Ok(())
            }
            Cell::Taken(owner) => Err(BoardError::Occupied { position, owner }),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
