use crate::game::{Board, GameStatus, Player, Position};
use crate::messages::ErrorCode;
use std::fmt::Write as _;
use std::io::{self, Write};

const TITLE: &str = " GRIDLOCK ";

/// Render the board as text: column letters across the top, 1-based row
/// numbers down the side, `*` for empty cells.
pub fn format_board(board: &Board) -> String {
    let size = board.size() as usize;
    let mut out = String::new();

    // Banner padded to the grid width
    let grid_width = size * 2 + 3;
    let padding = grid_width.saturating_sub(TITLE.len()) / 2;
    let _ = writeln!(out, "{0}{1}{0}", "=".repeat(padding.max(1)), TITLE);
    out.push('\n');

    out.push_str("   ");
    for col in 0..board.size() {
        let _ = write!(out, "{} ", (b'A' + col) as char);
    }
    out.push('\n');

    for row in 0..board.size() {
        let _ = write!(out, "{:2} ", row as u16 + 1);
        for col in 0..board.size() {
            let symbol = board
                .cell(Position::new(row, col))
                .map_or(' ', |cell| cell.symbol());
            let _ = write!(out, "{} ", symbol);
        }
        out.push('\n');
    }

    out
}

pub fn display_board(board: &Board) {
    println!();
    print!("{}", format_board(board));
    println!();
}

pub fn format_status(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Win => "🏆 You won!",
        GameStatus::Lose => "😞 You lost",
        GameStatus::Draw => "🤝 Draw, the board is full",
        GameStatus::Next => "🎮 Game in progress",
    }
}

pub fn display_game_status(status: GameStatus) {
    println!("{}", format_status(status));
}

pub fn display_move(player: Player, position: Position, seat: Player) {
    if player == seat {
        println!("| You played {} ({})", position, player.symbol());
    } else {
        println!("| Opponent played {} ({})", position, player.symbol());
    }
}

pub fn display_rejection(code: ErrorCode) {
    println!("| Server rejected the move: {}", code);
}

pub fn prompt_move() -> io::Result<()> {
    print!("| Enter your move (e.g. b2, or 'quit'): ");
    io::stdout().flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_layout() {
        let mut board = Board::classic();
        board.apply_move(Player::One, Position::new(0, 0)).unwrap();
        board.apply_move(Player::Two, Position::new(1, 2)).unwrap();

        let rendered = format_board(&board);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].contains("GRIDLOCK"));
        assert_eq!(lines[2], "   A B C ");
        assert_eq!(lines[3], " 1 X * * ");
        assert_eq!(lines[4], " 2 * * O ");
        assert_eq!(lines[5], " 3 * * * ");
    }

    #[test]
    fn test_wide_board_labels() {
        let board = Board::new(12, 4).unwrap();
        let rendered = format_board(&board);
        assert!(rendered.contains("A B C D E F G H I J K L"));
        assert!(rendered.lines().any(|line| line.starts_with("12 ")));
    }

    #[test]
    fn test_status_text() {
        assert!(format_status(GameStatus::Win).contains("won"));
        assert!(format_status(GameStatus::Lose).contains("lost"));
        assert!(format_status(GameStatus::Draw).contains("Draw"));
    }
}
