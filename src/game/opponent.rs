//! Built-in computer player seated by the server.

use super::{Board, Player, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::trace;

pub struct Opponent {
    rng: StdRng,
}

impl Opponent {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic opponent for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a move for `me`, or `None` if the board is full.
    ///
    /// Completes a line when possible, otherwise blocks the other player's
    /// immediate win, otherwise takes the centre, otherwise a random cell.
    pub fn choose(&mut self, board: &Board, me: Player) -> Option<Position> {
        let empty = board.empty_positions();
        if empty.is_empty() {
            return None;
        }

        if let Some(pos) = empty.iter().copied().find(|p| board.completes_line(me, *p)) {
            trace!(%pos, "Taking winning cell");
            return Some(pos);
        }

        let them = me.opponent();
        if let Some(pos) = empty.iter().copied().find(|p| board.completes_line(them, *p)) {
            trace!(%pos, "Blocking opponent line");
            return Some(pos);
        }

        let centre = Position::new(board.size() / 2, board.size() / 2);
        if empty.contains(&centre) {
            return Some(centre);
        }

        empty.choose(&mut self.rng).copied()
    }
}

impl Default for Opponent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_takes_win_before_block() {
        let mut board = Board::classic();
        board.apply_move(Player::Two, Position::new(0, 0)).unwrap();
        board.apply_move(Player::Two, Position::new(0, 1)).unwrap();
        board.apply_move(Player::One, Position::new(1, 0)).unwrap();
        board.apply_move(Player::One, Position::new(1, 1)).unwrap();

        let mut opponent = Opponent::with_seed(7);
        assert_eq!(opponent.choose(&board, Player::Two), Some(Position::new(0, 2)));
    }

    #[test]
    fn test_blocks_immediate_threat() {
        let mut board = Board::classic();
        board.apply_move(Player::One, Position::new(2, 0)).unwrap();
        board.apply_move(Player::One, Position::new(2, 1)).unwrap();
        board.apply_move(Player::Two, Position::new(1, 1)).unwrap();

        let mut opponent = Opponent::with_seed(7);
        assert_eq!(opponent.choose(&board, Player::Two), Some(Position::new(2, 2)));
    }

    #[test]
    fn test_prefers_centre_then_any_empty_cell() {
        let mut board = Board::classic();
        let mut opponent = Opponent::with_seed(1);
        assert_eq!(opponent.choose(&board, Player::Two), Some(Position::new(1, 1)));

        board.apply_move(Player::One, Position::new(1, 1)).unwrap();
        let pick = opponent.choose(&board, Player::Two).unwrap();
        assert_eq!(board.cell(pick).map(|c| c.is_empty()), Some(true));
    }
}
