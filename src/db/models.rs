//! Database row types and conversions to and from the domain model.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbError, schema};
use crate::game::{Board, GameSession, GameStatus, Mark, MoveRecord, SessionId};
use crate::score::PlayerScore;

/// Converts a game status to the string stored in the database.
#[instrument]
pub fn status_to_db(status: GameStatus) -> &'static str {
    match status {
        GameStatus::InProgress => "IN_PROGRESS",
        GameStatus::Won(Mark::X) => "X_WON",
        GameStatus::Won(Mark::O) => "O_WON",
        GameStatus::Draw => "DRAW",
    }
}

/// Parses a game status from the string stored in the database.
///
/// # Errors
///
/// Returns [`DbError`] if the string is not a valid status value.
#[instrument(skip(s), fields(s = %s))]
pub fn status_from_db(s: &str) -> Result<GameStatus, DbError> {
    match s {
        "IN_PROGRESS" => Ok(GameStatus::InProgress),
        "X_WON" => Ok(GameStatus::Won(Mark::X)),
        "O_WON" => Ok(GameStatus::Won(Mark::O)),
        "DRAW" => Ok(GameStatus::Draw),
        _ => Err(DbError::new(format!("Invalid status: '{}'", s))),
    }
}

/// Parses a player mark from the string stored in the database.
///
/// # Errors
///
/// Returns [`DbError`] if the string is not `X` or `O`.
#[instrument(skip(s), fields(s = %s))]
pub fn mark_from_db(s: &str) -> Result<Mark, DbError> {
    s.parse()
        .map_err(|_| DbError::new(format!("Invalid mark: '{}'", s)))
}

/// Game session database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRow {
    id: i32,
    player_x_name: String,
    player_o_name: String,
    current_turn: String,
    board_state: String,
    status: String,
    scored: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl GameRow {
    /// Rebuilds the domain session from this row and its move history.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored board, status, or turn column
    /// does not parse.
    #[instrument(skip(self, moves), fields(game_id = self.id, status = %self.status))]
    pub fn to_session(&self, moves: Vec<MoveRecord>) -> Result<GameSession, DbError> {
        let board = Board::decode(&self.board_state)
            .map_err(|e| DbError::new(format!("Corrupt board for game {}: {}", self.id, e)))?;
        Ok(GameSession::restore(
            self.id,
            self.player_x_name.clone(),
            self.player_o_name.clone(),
            mark_from_db(&self.current_turn)?,
            board,
            status_from_db(&self.status)?,
            self.scored,
            moves,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Insertable game model for creating new sessions.
///
/// All other columns take their schema defaults: empty board, X to move,
/// in progress, unscored.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::games)]
pub struct NewGameRow {
    player_x_name: String,
    player_o_name: String,
}

/// Changeset capturing the column values written by one move transition.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::games)]
pub struct GameTransition {
    current_turn: String,
    board_state: String,
    status: String,
    scored: bool,
    updated_at: NaiveDateTime,
}

impl GameTransition {
    /// Captures the post-move column values from a session.
    ///
    /// A transition that finishes the game persists as already scored,
    /// since the scoreboard update rides in the same transaction.
    pub fn from_session(session: &GameSession) -> Self {
        Self {
            current_turn: session.current_turn().to_string(),
            board_state: session.board().encode(),
            status: status_to_db(session.status()).to_string(),
            scored: session.scored() || session.needs_scoring(),
            updated_at: session.updated_at(),
        }
    }
}

/// Move history database model.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::moves)]
#[diesel(belongs_to(GameRow, foreign_key = game_id))]
pub struct MoveRow {
    id: i32,
    game_id: i32,
    player: String,
    position: i32,
    created_at: NaiveDateTime,
}

impl MoveRow {
    /// Converts to the domain move record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored player column does not parse.
    pub fn to_record(&self) -> Result<MoveRecord, DbError> {
        Ok(MoveRecord::new(
            mark_from_db(&self.player)?,
            self.position,
            self.created_at,
        ))
    }
}

/// Insertable move model for appending to a session's history.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::moves)]
pub struct NewMoveRow {
    game_id: i32,
    player: String,
    position: i32,
    created_at: NaiveDateTime,
}

impl NewMoveRow {
    /// Builds the insertable row from a domain record.
    pub fn from_record(game_id: SessionId, record: &MoveRecord) -> Self {
        Self::new(
            game_id,
            record.player().to_string(),
            record.position(),
            record.created_at(),
        )
    }
}

/// Scoreboard database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::scores)]
pub struct ScoreRow {
    id: i32,
    player_name: String,
    wins: i32,
    losses: i32,
    draws: i32,
}

impl ScoreRow {
    /// Converts to the domain tally.
    pub fn to_score(&self) -> PlayerScore {
        PlayerScore::new(
            self.player_name.clone(),
            self.wins,
            self.losses,
            self.draws,
        )
    }
}

/// Insertable scoreboard model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::scores)]
pub struct NewScoreRow {
    player_name: String,
    wins: i32,
    losses: i32,
    draws: i32,
}

impl NewScoreRow {
    /// Builds the insertable row from a domain tally.
    pub fn from_score(score: &PlayerScore) -> Self {
        Self::new(
            score.player_name().clone(),
            *score.wins(),
            *score.losses(),
            *score.draws(),
        )
    }
}
