//! Game session state machine: move validation, turn alternation,
//! terminal-state detection, and the scoring handshake.

use chrono::{NaiveDateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::board::Board;
use super::types::{GameStatus, Mark};

/// Unique identifier for a game session, assigned by storage.
pub type SessionId = i32;

/// Typed rejection for an illegal move. Never fatal; the boundary layer
/// renders the message directly.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, Serialize)]
pub enum MoveError {
    /// Position outside 0-8.
    #[display("Invalid position")]
    InvalidPosition {
        /// The out-of-range position as supplied.
        position: i32,
    },
    /// Session already reached a terminal status.
    #[display("Game is already finished")]
    GameFinished,
    /// Mover does not hold the current turn.
    #[display("It's {expected}'s turn")]
    WrongTurn {
        /// The mark whose turn it actually is.
        expected: Mark,
    },
    /// Target cell is already occupied.
    #[display("Position already occupied")]
    PositionOccupied {
        /// The occupied position.
        position: i32,
    },
}

/// One recorded move: who played where, and when.
///
/// Append-only: created once per successful [`GameSession::apply_move`],
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct MoveRecord {
    player: Mark,
    position: i32,
    created_at: NaiveDateTime,
}

impl MoveRecord {
    /// The mark that played this move.
    pub fn player(&self) -> Mark {
        self.player
    }

    /// Board position 0-8.
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Creation timestamp (UTC).
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
}

/// Normalizes a player name: trims whitespace and substitutes the mark's
/// default ("Player X"/"Player O") for blank input.
pub fn normalize_player_name(raw: &str, mark: Mark) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        mark.default_name().to_string()
    } else {
        trimmed.to_string()
    }
}

/// One tic-tac-toe match between two named players.
///
/// States: `InProgress` → {`Won(X)`, `Won(O)`, `Draw`}; terminal states
/// accept no further moves. All mutation goes through [`apply_move`], which
/// either applies the whole transition (board, history, status, turn,
/// timestamp) or nothing.
///
/// [`apply_move`]: GameSession::apply_move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    id: SessionId,
    player_x_name: String,
    player_o_name: String,
    current_turn: Mark,
    board: Board,
    status: GameStatus,
    scored: bool,
    moves: Vec<MoveRecord>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl GameSession {
    /// Creates a fresh session: empty board, X to move.
    ///
    /// Names are normalized with [`normalize_player_name`].
    #[instrument(skip(player_x_name, player_o_name))]
    pub fn new(
        id: SessionId,
        player_x_name: &str,
        player_o_name: &str,
    ) -> Self {
        let now = Utc::now().naive_utc();
        let session = Self {
            id,
            player_x_name: normalize_player_name(player_x_name, Mark::X),
            player_o_name: normalize_player_name(player_o_name, Mark::O),
            current_turn: Mark::X,
            board: Board::new(),
            status: GameStatus::InProgress,
            scored: false,
            moves: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        info!(
            session_id = id,
            player_x = %session.player_x_name,
            player_o = %session.player_o_name,
            "Created game session"
        );
        session
    }

    /// Rebuilds a session from stored state. Used by the storage layer;
    /// the caller is responsible for internal consistency.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: SessionId,
        player_x_name: String,
        player_o_name: String,
        current_turn: Mark,
        board: Board,
        status: GameStatus,
        scored: bool,
        moves: Vec<MoveRecord>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            player_x_name,
            player_o_name,
            current_turn,
            board,
            status,
            scored,
            moves,
            created_at,
            updated_at,
        }
    }

    /// Session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Name of the player holding X.
    pub fn player_x_name(&self) -> &str {
        &self.player_x_name
    }

    /// Name of the player holding O.
    pub fn player_o_name(&self) -> &str {
        &self.player_o_name
    }

    /// Name of the player holding the given mark.
    pub fn player_name(&self, mark: Mark) -> &str {
        match mark {
            Mark::X => &self.player_x_name,
            Mark::O => &self.player_o_name,
        }
    }

    /// Mark whose turn it is. After a terminal move this stays on the
    /// last mover.
    pub fn current_turn(&self) -> Mark {
        self.current_turn
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Ordered move history, oldest first.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Creation timestamp (UTC).
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Last successful-move timestamp (UTC); equals `created_at` before
    /// the first move.
    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Whether this session's outcome has been recorded in the ledger.
    pub fn scored(&self) -> bool {
        self.scored
    }

    /// True exactly when the session is terminal and its outcome has not
    /// yet been recorded, the at-most-once guard for ledger updates.
    pub fn needs_scoring(&self) -> bool {
        self.status.is_terminal() && !self.scored
    }

    /// Marks the outcome as recorded. Called by the service once the
    /// ledger update is part of the persisted transition.
    pub fn mark_scored(&mut self) {
        self.scored = true;
    }

    /// The canonical winning triple, only when the session was won;
    /// `None` while in progress and on a draw.
    pub fn winning_line(&self) -> Option<[usize; 3]> {
        match self.status {
            GameStatus::Won(_) => self.board.winning_line(),
            _ => None,
        }
    }

    /// Validates and applies one move for `player` at `position`.
    ///
    /// Checks run in fixed precedence: position range, finished game,
    /// turn, occupancy. On any rejection nothing is mutated. On success
    /// the mark is placed, a [`MoveRecord`] is appended, termination is
    /// evaluated (win before draw), and the turn flips only if the game
    /// continues.
    ///
    /// # Errors
    ///
    /// Returns the [`MoveError`] describing the first violated rule.
    #[instrument(skip(self), fields(session_id = self.id))]
    pub fn apply_move(
        &mut self,
        position: i32,
        player: Mark,
    ) -> Result<MoveRecord, MoveError> {
        if !(0..=8).contains(&position) {
            warn!(position, "Rejected move: position out of range");
            return Err(MoveError::InvalidPosition { position });
        }
        if self.status.is_terminal() {
            warn!(status = %self.status, "Rejected move: game already finished");
            return Err(MoveError::GameFinished);
        }
        if player != self.current_turn {
            warn!(
                expected = %self.current_turn,
                mover = %player,
                "Rejected move: out of turn"
            );
            return Err(MoveError::WrongTurn {
                expected: self.current_turn,
            });
        }
        let pos = position as usize;
        if !self.board.is_empty(pos) {
            warn!(position, "Rejected move: position occupied");
            return Err(MoveError::PositionOccupied { position });
        }

        // All checks passed; the whole transition happens from here on.
        let now = Utc::now().naive_utc();
        self.board.place(pos, player);
        let record = MoveRecord::new(player, position, now);
        self.moves.push(record.clone());

        if self.board.winning_line().is_some() {
            self.status = GameStatus::Won(player);
            info!(winner = %player, moves = self.moves.len(), "Game won");
        } else if self.board.is_full() {
            self.status = GameStatus::Draw;
            info!(moves = self.moves.len(), "Game drawn");
        } else {
            self.current_turn = player.opponent();
            debug!(position, next = %self.current_turn, "Move applied");
        }
        self.updated_at = now;

        Ok(record)
    }
}

impl std::fmt::Display for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Game {}: {} vs {} - {}",
            self.id, self.player_x_name, self.player_o_name, self.status
        )
    }
}
