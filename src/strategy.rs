//! Automated move pickers for scripted play.

use tracing::debug;

use crate::game::GameSession;

/// A move picker for automated play.
pub trait Strategy {
    /// Chooses a position for the session's current player, or `None`
    /// when the board is full.
    fn pick(&mut self, session: &GameSession) -> Option<i32>;

    /// Name shown when rendering automated games.
    fn name(&self) -> &str;
}

/// Baseline picker that takes the first empty square, scanning 0-8.
///
/// Deterministic and trivially beatable; useful for demos and tests.
pub struct FirstEmpty {
    name: String,
}

impl FirstEmpty {
    /// Creates a new first-empty picker.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Strategy for FirstEmpty {
    fn pick(&mut self, session: &GameSession) -> Option<i32> {
        for pos in 0..9 {
            if session.board().is_empty(pos) {
                debug!(picker = %self.name, position = pos, "Picked first empty square");
                return Some(pos as i32);
            }
        }
        None
    }

    fn name(&self) -> &str {
        &self.name
    }
}
