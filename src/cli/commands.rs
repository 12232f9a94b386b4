use crate::config::RawOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gridlock")]
#[command(about = "An n-in-a-row game server and terminal client over TCP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the game server
    ///
    /// Values given on the command line override the config file.
    ///
    /// Examples:
    ///   gridlock serve
    ///   gridlock serve --port 9000 --field-size 7 --win-length 4
    ///   gridlock serve --config ./server.toml
    Serve {
        /// TOML config file. Defaults to server.toml in the user config directory
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// IP address to listen on
        #[arg(long)]
        host: Option<String>,
        /// TCP port to listen on
        #[arg(short, long)]
        port: Option<String>,
        /// Width and height of the board (3-20)
        #[arg(long)]
        field_size: Option<String>,
        /// Marks in a row needed to win (3-field size)
        #[arg(long)]
        win_length: Option<String>,
        /// Moves each player may make before losing. Defaults to one per cell
        #[arg(long)]
        number_of_moves: Option<String>,
    },

    /// Write a server config file with the default settings
    ///
    /// Examples:
    ///   gridlock init-config
    ///   gridlock init-config --path ./server.toml --force
    InitConfig {
        /// Where to write the file. Defaults to server.toml in the user config directory
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Connect to a server and play
    ///
    /// Moves are entered as a column letter and a row number, e.g. b2.
    /// Type 'quit' to resign.
    ///
    /// Example: gridlock connect -H 127.0.0.1 -p 8080 -n alice
    Connect {
        /// Server IP address
        #[arg(short = 'H', long)]
        host: Option<String>,
        /// Server port
        #[arg(short, long)]
        port: Option<String>,
        /// Player name (at most 9 characters)
        #[arg(short, long)]
        name: String,
    },
}

impl Commands {
    /// Option overrides given on the command line, keyed by config option name
    pub fn raw_options(&self) -> RawOptions {
        let mut raw = RawOptions::new();
        match self {
            Commands::Serve {
                host,
                port,
                field_size,
                win_length,
                number_of_moves,
                ..
            } => {
                raw.insert_opt("server_address", host.as_deref());
                raw.insert_opt("server_port", port.as_deref());
                raw.insert_opt("field_size", field_size.as_deref());
                raw.insert_opt("win_length", win_length.as_deref());
                raw.insert_opt("number_of_moves", number_of_moves.as_deref());
            }
            Commands::Connect { host, port, name } => {
                raw.insert("name", name.as_str());
                raw.insert_opt("host", host.as_deref());
                raw.insert_opt("port", port.as_deref());
            }
            Commands::InitConfig { .. } => {}
        }
        raw
    }
}
