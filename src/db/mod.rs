//! Database persistence layer for game sessions and the scoreboard.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{
    GameRow, MoveRow, NewGameRow, NewMoveRow, NewScoreRow, ScoreRow, status_from_db, status_to_db,
};
pub use repository::GameRepository;
