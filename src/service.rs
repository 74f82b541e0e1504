//! Game orchestration layer: session lifecycle, serialized move
//! application, and scoreboard queries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use derive_more::{Display, Error};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, GameRepository, GameRow};
use crate::game::{
    GameSession, Mark, MoveError, MoveRecord, SessionId, normalize_player_name,
};
use crate::score::PlayerScore;

/// Reload-and-revalidate attempts before a contended move gives up.
const MAX_MOVE_ATTEMPTS: u32 = 3;

/// Errors surfaced by [`GameService`] operations.
#[derive(Debug, Display, Error)]
pub enum ServiceError {
    /// No session exists with the requested id.
    #[display("Game not found: {id}")]
    SessionNotFound {
        /// The unknown session id.
        id: SessionId,
    },
    /// The move violated a game rule; the session is unchanged.
    #[display("{source}")]
    Rejected {
        /// The violated rule.
        source: MoveError,
    },
    /// Storage failure.
    #[display("{source}")]
    Database {
        /// The underlying database error.
        source: DbError,
    },
    /// The stored session kept changing underneath the move.
    #[display("Game {id} is contended, gave up after {attempts} attempts")]
    Contention {
        /// The contended session id.
        id: SessionId,
        /// How many attempts were made.
        attempts: u32,
    },
}

impl From<DbError> for ServiceError {
    fn from(source: DbError) -> Self {
        Self::Database { source }
    }
}

impl From<MoveError> for ServiceError {
    fn from(source: MoveError) -> Self {
        Self::Rejected { source }
    }
}

/// Service layer for running games end to end.
///
/// Wraps [`GameRepository`] with rule enforcement, per-session mutual
/// exclusion, and at-most-once scoreboard recording. Cloning shares the
/// lock registry, so clones serialize against each other.
#[derive(Debug, Clone)]
pub struct GameService {
    repository: GameRepository,
    session_locks: Arc<Mutex<HashMap<SessionId, Arc<Mutex<()>>>>>,
}

impl GameService {
    /// Creates a new game service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: GameRepository) -> Self {
        info!("Creating GameService");
        Self {
            repository,
            session_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the underlying repository.
    #[instrument(skip(self))]
    pub fn repository(&self) -> &GameRepository {
        &self.repository
    }

    /// Creates a new session. Blank or whitespace-only names fall back
    /// to "Player X" and "Player O".
    #[instrument(skip(self))]
    pub fn create_session(
        &self,
        player_x_name: Option<&str>,
        player_o_name: Option<&str>,
    ) -> Result<GameSession, ServiceError> {
        let x = normalize_player_name(player_x_name.unwrap_or(""), Mark::X);
        let o = normalize_player_name(player_o_name.unwrap_or(""), Mark::O);
        debug!(player_x = %x, player_o = %o, "Creating session");

        let session = self.repository.create_game(x, o)?;
        info!(session_id = session.id(), "Session created");
        Ok(session)
    }

    /// Loads a session with its full move history.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SessionNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn get_session(&self, id: SessionId) -> Result<GameSession, ServiceError> {
        debug!(session_id = id, "Fetching session");
        self.repository
            .load_session(id)?
            .ok_or(ServiceError::SessionNotFound { id })
    }

    /// Applies one move to a session and persists the whole transition:
    /// board, history, status, and scoreboard when the move finishes the
    /// game.
    ///
    /// Moves against the same session are serialized by a per-session
    /// lock, and the persisted update is guarded on the board state the
    /// move was validated against, so two racing writers can never both
    /// claim a cell. A stale read reloads and revalidates.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SessionNotFound`] for an unknown id,
    /// [`ServiceError::Rejected`] when a rule is violated, and
    /// [`ServiceError::Contention`] if the stored state keeps shifting.
    #[instrument(skip(self))]
    pub fn apply_move(
        &self,
        id: SessionId,
        player: Mark,
        position: i32,
    ) -> Result<GameSession, ServiceError> {
        let lock = self.session_lock(id);
        let _guard = lock.lock().unwrap();

        for attempt in 1..=MAX_MOVE_ATTEMPTS {
            let mut session = self.get_session(id)?;
            let expected_board = session.board().encode();
            let record = session.apply_move(position, player)?;

            if self
                .repository
                .save_transition(&session, &record, &expected_board)?
            {
                if session.needs_scoring() {
                    // The persisted transition already recorded the
                    // outcome; sync the returned snapshot.
                    session.mark_scored();
                }
                info!(
                    session_id = id,
                    position,
                    status = %session.status(),
                    "Move applied"
                );
                return Ok(session);
            }

            warn!(session_id = id, attempt, "Retrying move after stale read");
        }

        Err(ServiceError::Contention {
            id,
            attempts: MAX_MOVE_ATTEMPTS,
        })
    }

    /// Returns the ordered move history for a session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SessionNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn move_log(&self, id: SessionId) -> Result<Vec<MoveRecord>, ServiceError> {
        debug!(session_id = id, "Fetching move log");
        Ok(self.get_session(id)?.moves().to_vec())
    }

    /// Lists all sessions, newest first, without move histories.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Result<Vec<GameRow>, ServiceError> {
        debug!("Listing sessions");
        Ok(self.repository.list_games()?)
    }

    /// Returns the scoreboard in standings order.
    #[instrument(skip(self))]
    pub fn list_scores(&self) -> Result<Vec<PlayerScore>, ServiceError> {
        debug!("Fetching scoreboard");
        Ok(self.repository.list_scores()?)
    }

    /// Returns one player's tally, zeroed if they have no finished games.
    #[instrument(skip(self))]
    pub fn player_score(&self, player_name: &str) -> Result<PlayerScore, ServiceError> {
        debug!(player_name = %player_name, "Fetching tally");
        Ok(self
            .repository
            .score_for_player(player_name)?
            .unwrap_or_else(|| PlayerScore::zeroed(player_name)))
    }

    /// Grabs the per-session mutex, creating it on first touch. The
    /// registry lock is held only long enough to clone the handle.
    fn session_lock(&self, id: SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().unwrap();
        locks.entry(id).or_default().clone()
    }
}
