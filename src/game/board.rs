use super::{BoardError, Cell, GameStatus, Player, Position};
use tracing::trace;

/// Smallest board that can hold a winning line
pub const MIN_BOARD_SIZE: u8 = 3;
/// Largest board the wire format and notation can address (columns A-T)
pub const MAX_BOARD_SIZE: u8 = 20;
/// Shortest winning line
pub const MIN_WIN_LENGTH: u8 = 3;

// Row/column steps for the four line directions: across, down, and both diagonals
const DIRECTIONS: [(i16, i16); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A square game board owned by exactly one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: u8,
    win_length: u8,
    /// Row-major cells, `cells[row * size + col]`
    cells: Vec<Cell>,
    occupied: usize,
}

impl Board {
    /// Create an empty `size`x`size` board where `win_length` marks in a row win
    pub fn new(size: u8, win_length: u8) -> Result<Self, BoardError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(BoardError::InvalidSize {
                size,
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            });
        }
        if win_length < MIN_WIN_LENGTH || win_length > size {
            return Err(BoardError::InvalidWinLength { win_length, size });
        }

        let cell_count = size as usize * size as usize;
        Ok(Self {
            size,
            win_length,
            cells: vec![Cell::Empty; cell_count],
            occupied: 0,
        })
    }

    /// Classic 3x3 board with a three-in-a-row win
    pub fn classic() -> Self {
        Self {
            size: 3,
            win_length: 3,
            cells: vec![Cell::Empty; 9],
            occupied: 0,
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn win_length(&self) -> u8 {
        self.win_length
    }

    /// Number of taken cells
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    pub fn is_full(&self) -> bool {
        self.occupied == self.cells.len()
    }

    /// Cell at `position`, or `None` when off the board
    pub fn cell(&self, position: Position) -> Option<Cell> {
        self.index(position).map(|idx| self.cells[idx])
    }

    /// Iterate over all positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |row| (0..self.size).map(move |col| Position::new(row, col)))
    }

    pub fn empty_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|pos| self.cell(*pos).is_some_and(|cell| cell.is_empty()))
            .collect()
    }

    /// Mark `position` for `player`.
    ///
    /// Fails without touching the board when the position is off the board or
    /// already taken.
    pub fn apply_move(&mut self, player: Player, position: Position) -> Result<(), BoardError> {
        let idx = self.index(position).ok_or(BoardError::OutOfRange {
            position,
            size: self.size,
        })?;

        self.cells[idx].claim(player, position)?;
        self.occupied += 1;
        trace!(%player, %position, occupied = self.occupied, "Applied move");
        Ok(())
    }

    /// Status of the board after the last move.
    ///
    /// `Win` means a complete line exists (only the player who just moved can
    /// have completed it), `Draw` means the board is full without a line.
    pub fn evaluate(&self) -> GameStatus {
        if self.winner().is_some() {
            GameStatus::Win
        } else if self.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::Next
        }
    }

    /// Owner of the first complete line found, if any
    pub fn winner(&self) -> Option<Player> {
        self.positions().find_map(|start| {
            let owner = self.cell(start)?.owner()?;
            DIRECTIONS
                .iter()
                .any(|&(d_row, d_col)| self.run_length(start, owner, d_row, d_col) >= self.win_length)
                .then_some(owner)
        })
    }

    /// Whether placing `player` at `position` would complete a line
    pub fn completes_line(&self, player: Player, position: Position) -> bool {
        let mut probe = self.clone();
        probe.apply_move(player, position).is_ok() && probe.winner() == Some(player)
    }

    // Count consecutive cells owned by `owner` starting at `start` in one direction
    fn run_length(&self, start: Position, owner: Player, d_row: i16, d_col: i16) -> u8 {
        let mut count = 0;
        let mut current = Some(start);
        while let Some(pos) = current {
            match self.cell(pos) {
                Some(Cell::Taken(p)) if p == owner => count += 1,
                _ => break,
            }
            if count >= self.win_length {
                break;
            }
            current = pos.offset(d_row, d_col);
        }
        count
    }

    fn index(&self, position: Position) -> Option<usize> {
        position
            .within(self.size)
            .then(|| position.row as usize * self.size as usize + position.col as usize)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(board: &mut Board, moves: &[(Player, u8, u8)]) {
        for &(player, row, col) in moves {
            board.apply_move(player, Position::new(row, col)).unwrap();
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(5, 4).unwrap();
        assert_eq!(board.size(), 5);
        assert_eq!(board.win_length(), 4);
        assert_eq!(board.occupied(), 0);
        assert_eq!(board.empty_positions().len(), 25);
        assert_eq!(board.evaluate(), GameStatus::Next);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(matches!(Board::new(2, 3), Err(BoardError::InvalidSize { .. })));
        assert!(matches!(Board::new(21, 3), Err(BoardError::InvalidSize { .. })));
        assert!(matches!(Board::new(4, 5), Err(BoardError::InvalidWinLength { .. })));
        assert!(matches!(Board::new(4, 2), Err(BoardError::InvalidWinLength { .. })));
    }

    #[test]
    fn test_rejected_move_leaves_board_unchanged() {
        let mut board = Board::classic();
        board.apply_move(Player::One, Position::new(1, 1)).unwrap();
        let before = board.clone();

        let occupied = board.apply_move(Player::Two, Position::new(1, 1));
        assert_eq!(
            occupied,
            Err(BoardError::Occupied {
                position: Position::new(1, 1),
                owner: Player::One
            })
        );
        let out_of_range = board.apply_move(Player::Two, Position::new(3, 0));
        assert!(matches!(out_of_range, Err(BoardError::OutOfRange { .. })));

        assert_eq!(board, before);
    }

    #[test]
    fn test_row_win_and_not_before() {
        let mut board = Board::classic();
        play(
            &mut board,
            &[
                (Player::One, 0, 0),
                (Player::Two, 1, 0),
                (Player::One, 0, 1),
                (Player::Two, 1, 1),
            ],
        );
        assert_eq!(board.evaluate(), GameStatus::Next);
        assert_eq!(board.winner(), None);

        play(&mut board, &[(Player::One, 0, 2)]);
        assert_eq!(board.evaluate(), GameStatus::Win);
        assert_eq!(board.winner(), Some(Player::One));
    }

    #[test]
    fn test_column_and_diagonal_wins() {
        let mut column = Board::classic();
        play(&mut column, &[(Player::Two, 0, 2), (Player::Two, 1, 2), (Player::Two, 2, 2)]);
        assert_eq!(column.winner(), Some(Player::Two));

        let mut anti = Board::classic();
        play(&mut anti, &[(Player::One, 0, 2), (Player::One, 1, 1), (Player::One, 2, 0)]);
        assert_eq!(anti.winner(), Some(Player::One));
    }

    #[test]
    fn test_longer_win_length_on_larger_board() {
        let mut board = Board::new(6, 4).unwrap();
        play(&mut board, &[(Player::One, 2, 1), (Player::One, 3, 2), (Player::One, 4, 3)]);
        assert_eq!(board.evaluate(), GameStatus::Next);
        assert!(board.completes_line(Player::One, Position::new(5, 4)));
        assert!(board.completes_line(Player::One, Position::new(1, 0)));
        assert!(!board.completes_line(Player::Two, Position::new(5, 4)));
        // probing never mutates
        assert_eq!(board.occupied(), 3);
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let mut board = Board::classic();
        // X O X
        // X O O
        // O X X
        play(
            &mut board,
            &[
                (Player::One, 0, 0),
                (Player::Two, 0, 1),
                (Player::One, 0, 2),
                (Player::Two, 1, 1),
                (Player::One, 1, 0),
                (Player::Two, 1, 2),
                (Player::One, 2, 1),
                (Player::Two, 2, 0),
                (Player::One, 2, 2),
            ],
        );
        assert!(board.is_full());
        assert_eq!(board.winner(), None);
        assert_eq!(board.evaluate(), GameStatus::Draw);
    }
}
