//! Command-line interface for tictactoe_arena.

use clap::{Parser, Subcommand};
use tictactoe_arena::{Mark, SessionId};

/// Tic-tac-toe arena - persistent sessions and a cumulative scoreboard
#[derive(Parser, Debug)]
#[command(name = "tictactoe_arena")]
#[command(about = "Tic-tac-toe sessions with persistent history and scores", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the database file (created if it doesn't exist).
    /// Falls back to DATABASE_URL, then "arena.db".
    #[arg(long)]
    pub db_path: Option<String>,

    /// Emit machine-readable JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new game session
    New {
        /// Name for the X player (defaults to "Player X")
        #[arg(short = 'x', long)]
        player_x: Option<String>,

        /// Name for the O player (defaults to "Player O")
        #[arg(short = 'o', long)]
        player_o: Option<String>,
    },

    /// Show a session's board and status
    Show {
        /// Session id
        id: SessionId,
    },

    /// Apply one move to a session
    Move {
        /// Session id
        id: SessionId,

        /// Mark making the move (X or O)
        player: Mark,

        /// Board position 0-8, row-major from the top-left
        #[arg(allow_negative_numbers = true)]
        position: i32,
    },

    /// Print a session's move history
    Log {
        /// Session id
        id: SessionId,
    },

    /// List all sessions, newest first
    Games,

    /// Print the scoreboard in standings order
    Scoreboard,

    /// Create a session and auto-play it to completion
    Play {
        /// Name for the X player (defaults to "Player X")
        #[arg(short = 'x', long)]
        player_x: Option<String>,

        /// Name for the O player (defaults to "Player O")
        #[arg(short = 'o', long)]
        player_o: Option<String>,
    },
}
