//! Database repository for game sessions, move history, and the scoreboard.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::models::{GameTransition, NewGameRow, NewMoveRow, NewScoreRow};
use crate::db::{DbError, GameRow, MoveRow, ScoreRow, schema};
use crate::game::{GameSession, GameStatus, MoveRecord, SessionId};
use crate::score::{PlayerScore, sort_standings};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How a finished game lands on one player's tally.
#[derive(Debug, Clone, Copy)]
enum ScoreDelta {
    Win,
    Loss,
    Draw,
}

/// Database repository for game and scoreboard operations.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository connected to the database at the given path.
    ///
    /// Use `":memory:"` for an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is invalid.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection with foreign keys enforced and a
    /// busy timeout so concurrent writers queue instead of failing.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails to run.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Creates a new game session with the given (already normalized)
    /// player names and returns it with an empty board, X to move.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn create_game(
        &self,
        player_x_name: String,
        player_o_name: String,
    ) -> Result<GameSession, DbError> {
        debug!(player_x = %player_x_name, player_o = %player_o_name, "Creating game");
        let mut conn = self.connection()?;

        let new_game = NewGameRow::new(player_x_name, player_o_name);

        let row = diesel::insert_into(schema::games::table)
            .values(&new_game)
            .returning(GameRow::as_returning())
            .get_result::<GameRow>(&mut conn)?;

        info!(game_id = row.id(), "Game created");
        row.to_session(Vec::new())
    }

    /// Loads a session with its full move history. Returns `None` if no
    /// game has the given id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or the stored row
    /// does not parse.
    #[instrument(skip(self))]
    pub fn load_session(&self, game_id: SessionId) -> Result<Option<GameSession>, DbError> {
        debug!(game_id, "Loading session");
        let mut conn = self.connection()?;

        let row = match schema::games::table
            .filter(schema::games::id.eq(game_id))
            .first::<GameRow>(&mut conn)
            .optional()?
        {
            Some(row) => row,
            None => {
                debug!(game_id, "Session not found");
                return Ok(None);
            }
        };

        let moves = Self::load_moves(&mut conn, game_id)?;
        let session = row.to_session(moves)?;
        debug!(game_id, status = %session.status(), "Session loaded");
        Ok(Some(session))
    }

    /// Lists all game rows, newest first. Histories are not loaded;
    /// use [`load_session`] for a full session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    ///
    /// [`load_session`]: GameRepository::load_session
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Result<Vec<GameRow>, DbError> {
        debug!("Listing all games");
        let mut conn = self.connection()?;

        // Timestamps have second resolution; break ties by id so rapid
        // creates still list deterministically.
        let games = schema::games::table
            .order((schema::games::created_at.desc(), schema::games::id.desc()))
            .load::<GameRow>(&mut conn)?;

        info!(count = games.len(), "Games loaded");
        Ok(games)
    }

    /// Returns the ordered move history for one game, oldest first.
    /// Empty for an unknown game id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn moves_for_game(&self, game_id: SessionId) -> Result<Vec<MoveRecord>, DbError> {
        debug!(game_id, "Loading move history");
        let mut conn = self.connection()?;
        let moves = Self::load_moves(&mut conn, game_id)?;
        info!(game_id, count = moves.len(), "Move history loaded");
        Ok(moves)
    }

    /// Returns all tallies in scoreboard order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_scores(&self) -> Result<Vec<PlayerScore>, DbError> {
        debug!("Listing scoreboard");
        let mut conn = self.connection()?;

        let rows = schema::scores::table.load::<ScoreRow>(&mut conn)?;
        let mut scores: Vec<PlayerScore> = rows.iter().map(ScoreRow::to_score).collect();
        sort_standings(&mut scores);

        info!(count = scores.len(), "Scoreboard loaded");
        Ok(scores)
    }

    /// Gets the tally for one player name. Returns `None` if the player
    /// has no finished games.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn score_for_player(&self, player_name: &str) -> Result<Option<PlayerScore>, DbError> {
        debug!(player_name = %player_name, "Looking up tally");
        let mut conn = self.connection()?;

        let row = schema::scores::table
            .filter(schema::scores::player_name.eq(player_name))
            .first::<ScoreRow>(&mut conn)
            .optional()?;

        Ok(row.map(|r| r.to_score()))
    }

    /// Persists one successful move transition atomically: the game row
    /// update, the appended move row, and, when the move finished the
    /// game, the scoreboard increments.
    ///
    /// The game row update is guarded on `expected_board`, the board
    /// encoding before the move. Returns `Ok(false)` without writing
    /// anything if the stored game no longer matches, meaning another
    /// writer got there first and the caller should reload and retry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(
        skip(self, session, record),
        fields(game_id = session.id(), position = record.position(), status = %session.status())
    )]
    pub fn save_transition(
        &self,
        session: &GameSession,
        record: &MoveRecord,
        expected_board: &str,
    ) -> Result<bool, DbError> {
        debug!("Saving move transition");
        let mut conn = self.connection()?;

        let game_id = session.id();
        let transition = GameTransition::from_session(session);
        let new_move = NewMoveRow::from_record(game_id, record);
        let record_scores = session.needs_scoring();

        let applied = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let updated = diesel::update(
                schema::games::table
                    .filter(schema::games::id.eq(game_id))
                    .filter(schema::games::status.eq("IN_PROGRESS"))
                    .filter(schema::games::board_state.eq(expected_board)),
            )
            .set(&transition)
            .execute(conn)?;

            if updated == 0 {
                return Ok(false);
            }

            diesel::insert_into(schema::moves::table)
                .values(&new_move)
                .execute(conn)?;

            if record_scores {
                Self::record_outcome(conn, session)?;
            }

            Ok(true)
        })?;

        if applied {
            info!(scored = record_scores, "Transition saved");
        } else {
            warn!("Transition conflict: stored game state changed underneath");
        }
        Ok(applied)
    }

    /// Loads the move rows for one game in append order.
    fn load_moves(
        conn: &mut SqliteConnection,
        game_id: SessionId,
    ) -> Result<Vec<MoveRecord>, DbError> {
        let rows = schema::moves::table
            .filter(schema::moves::game_id.eq(game_id))
            .order(schema::moves::id.asc())
            .load::<MoveRow>(conn)?;
        rows.iter().map(MoveRow::to_record).collect()
    }

    /// Applies a finished game to the scoreboard inside the caller's
    /// transaction. Self-play lands both deltas on the single shared
    /// tally.
    fn record_outcome(conn: &mut SqliteConnection, session: &GameSession) -> Result<(), DbError> {
        match session.status() {
            GameStatus::Won(winner) => {
                Self::bump(conn, session.player_name(winner), ScoreDelta::Win)?;
                Self::bump(
                    conn,
                    session.player_name(winner.opponent()),
                    ScoreDelta::Loss,
                )?;
            }
            GameStatus::Draw => {
                Self::bump(conn, session.player_x_name(), ScoreDelta::Draw)?;
                Self::bump(conn, session.player_o_name(), ScoreDelta::Draw)?;
            }
            GameStatus::InProgress => {
                warn!(game_id = session.id(), "Asked to score an unfinished game");
            }
        }
        Ok(())
    }

    /// Read-modify-write for one tally row, creating it on first contact.
    fn bump(
        conn: &mut SqliteConnection,
        player_name: &str,
        delta: ScoreDelta,
    ) -> Result<(), DbError> {
        let existing = schema::scores::table
            .filter(schema::scores::player_name.eq(player_name))
            .first::<ScoreRow>(conn)
            .optional()?;

        let mut score = match &existing {
            Some(row) => row.to_score(),
            None => PlayerScore::zeroed(player_name),
        };
        match delta {
            ScoreDelta::Win => score.record_win(),
            ScoreDelta::Loss => score.record_loss(),
            ScoreDelta::Draw => score.record_draw(),
        }

        match existing {
            Some(row) => {
                diesel::update(schema::scores::table.filter(schema::scores::id.eq(*row.id())))
                    .set((
                        schema::scores::wins.eq(*score.wins()),
                        schema::scores::losses.eq(*score.losses()),
                        schema::scores::draws.eq(*score.draws()),
                    ))
                    .execute(conn)?;
            }
            None => {
                diesel::insert_into(schema::scores::table)
                    .values(&NewScoreRow::from_score(&score))
                    .execute(conn)?;
            }
        }

        debug!(player_name = %player_name, delta = ?delta, "Tally updated");
        Ok(())
    }
}
