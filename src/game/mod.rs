//! Core tic-tac-toe engine: board representation, win detection, and the
//! session state machine. Pure logic, no storage concerns.

mod board;
mod session;
mod types;

pub use board::{Board, BoardDecodeError, WIN_LINES};
pub use session::{
    GameSession, MoveError, MoveRecord, SessionId, normalize_player_name,
};
pub use types::{Cell, GameStatus, Mark};
