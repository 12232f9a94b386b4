use crate::cli::display;
use crate::config::ClientConfig;
use crate::game::{Board, GameStatus, Player, Position};
use crate::messages::{ErrorCode, Message, WireConfig};
use crate::network::Connection;
use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info, instrument, warn};

/// Server notifications as seen by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Moved { player: Player, position: Position },
    Turn(Player),
    Rejected(ErrorCode),
    Finished(GameStatus),
}

/// Outcome of reading one line of player input
enum MoveInput {
    Play(Position),
    Quit,
}

pub struct Client {
    connection: Connection,
    name: String,
    seat: Player,
    board: Option<Board>,
}

impl Client {
    #[instrument(skip(config), fields(server = %config.server_addr()))]
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let connection = Connection::connect(config.server_addr(), WireConfig::default())
            .await
            .with_context(|| format!("Failed to connect to {}", config.server_addr()))?;
        info!("Connected to server");

        Ok(Self {
            connection,
            name: config.name.clone(),
            seat: Player::One,
            board: None,
        })
    }

    pub fn seat(&self) -> Player {
        self.seat
    }

    /// Local mirror of the server's board, available after [`Client::join`]
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Introduce ourselves and wait for the server to seat us
    pub async fn join(&mut self) -> Result<()> {
        self.connection
            .send_message(&Message::new_hello(self.name.as_str()))
            .await
            .context("Failed to send Hello")?;

        loop {
            let message = self
                .connection
                .receive_message()
                .await
                .context("Server did not answer Hello")?;

            match message {
                Message::Welcome {
                    size,
                    win_length,
                    seat,
                } => {
                    let board = Board::new(size, win_length)
                        .context("Server announced an invalid board")?;
                    info!(size, win_length, %seat, "Joined game");
                    self.seat = seat;
                    self.board = Some(board);
                    return Ok(());
                }
                Message::Error { code } => bail!("Server refused Hello: {}", code),
                Message::Status { status } => bail!("Game ended before it started: {}", status),
                other => warn!(message_type = other.message_type(), "Ignoring message before Welcome"),
            }
        }
    }

    pub async fn send_move(&mut self, position: Position) -> Result<()> {
        self.connection
            .send_message(&Message::Move { position })
            .await
            .context("Failed to send move")
    }

    pub async fn resign(&mut self) -> Result<()> {
        self.connection
            .send_message(&Message::Resign)
            .await
            .context("Failed to resign")
    }

    /// Wait for the next server notification, keeping the local board in step
    pub async fn next_event(&mut self) -> Result<GameEvent> {
        loop {
            let message = self
                .connection
                .receive_message()
                .await
                .context("Lost connection to server")?;

            let event = match message {
                Message::Moved { player, position } => {
                    if let Some(board) = self.board.as_mut() {
                        board
                            .apply_move(player, position)
                            .context("Server reported a move the local board rejects")?;
                    }
                    GameEvent::Moved { player, position }
                }
                Message::Turn { player } => GameEvent::Turn(player),
                Message::Error { code } => GameEvent::Rejected(code),
                Message::Status { status } => GameEvent::Finished(status),
                other => {
                    warn!(message_type = other.message_type(), "Ignoring unexpected message");
                    continue;
                }
            };
            debug!(?event, "Server event");
            return Ok(event);
        }
    }

    /// Interactive game loop. Moves are read from `input`, one per line.
    ///
    /// End of input or `quit` resigns. Returns the final status.
    pub async fn play<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<GameStatus> {
        if self.board.is_none() {
            self.join().await?;
        }
        if let Some(board) = &self.board {
            display::display_board(board);
        }

        let mut lines = input.lines();
        let mut my_turn = false;

        loop {
            match self.next_event().await? {
                GameEvent::Moved { player, position } => {
                    if player == self.seat {
                        my_turn = false;
                    }
                    if let Some(board) = &self.board {
                        display::display_board(board);
                    }
                    display::display_move(player, position, self.seat);
                }
                GameEvent::Turn(player) if player == self.seat => {
                    my_turn = true;
                    self.take_turn(&mut lines).await?;
                }
                GameEvent::Turn(player) => debug!(%player, "Waiting for opponent"),
                GameEvent::Rejected(code) => {
                    display::display_rejection(code);
                    if my_turn {
                        self.take_turn(&mut lines).await?;
                    }
                }
                GameEvent::Finished(status) => {
                    display::display_game_status(status);
                    return Ok(status);
                }
            }
        }
    }

    async fn take_turn<R: AsyncBufRead + Unpin>(&mut self, lines: &mut Lines<R>) -> Result<()> {
        match self.read_move(lines).await? {
            MoveInput::Play(position) => self.send_move(position).await,
            MoveInput::Quit => {
                info!("Resigning");
                self.resign().await
            }
        }
    }

    /// Prompt until the player enters a cell on the board or quits
    async fn read_move<R: AsyncBufRead + Unpin>(&self, lines: &mut Lines<R>) -> Result<MoveInput> {
        let size = self.board.as_ref().map_or(0, Board::size);

        loop {
            display::prompt_move().context("Failed to write prompt")?;
            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                return Ok(MoveInput::Quit);
            };

            let line = line.trim();
            if line.eq_ignore_ascii_case("quit") {
                return Ok(MoveInput::Quit);
            }

            match line.parse::<Position>() {
                Ok(position) if position.within(size) => return Ok(MoveInput::Play(position)),
                Ok(position) => println!("| {} is not on the {}x{} board", position, size, size),
                Err(e) => println!("| {}", e),
            }
        }
    }
}
