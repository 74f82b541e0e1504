//! Tic-tac-toe arena - persistent game sessions with a cumulative scoreboard
//!
//! This library runs complete tic-tac-toe matches: rule enforcement, turn
//! alternation, win and draw detection, an append-only move history, and a
//! lifetime win/loss/draw tally per player name, all backed by SQLite.
//!
//! # Architecture
//!
//! - **Game**: pure engine (board, win lines, session state machine)
//! - **Service**: orchestration with per-session locking and scoring
//! - **Db**: diesel-backed storage for sessions, history, and tallies
//! - **Strategy**: automated move pickers for scripted play
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_arena::{GameRepository, GameService, Mark};
//!
//! # fn example() -> anyhow::Result<()> {
//! let repository = GameRepository::new("arena.db".to_string())?;
//! repository.run_migrations()?;
//!
//! let service = GameService::new(repository);
//! let session = service.create_session(Some("Alice"), Some("Bob"))?;
//! let session = service.apply_move(session.id(), Mark::X, 4)?;
//! println!("{}", session.board().display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod db;
mod game;
mod score;
mod service;
mod strategy;

// Crate-level exports - Game engine
pub use game::{
    Board, BoardDecodeError, Cell, GameSession, GameStatus, Mark, MoveError, MoveRecord,
    SessionId, WIN_LINES, normalize_player_name,
};

// Crate-level exports - Database layer
pub use db::{DbError, GameRepository, GameRow, MoveRow, ScoreRow, status_from_db, status_to_db};

// Crate-level exports - Scoreboard
pub use score::{PlayerScore, sort_standings, standings_order};

// Crate-level exports - Service layer
pub use service::{GameService, ServiceError};

// Crate-level exports - Automated play
pub use strategy::{FirstEmpty, Strategy};
