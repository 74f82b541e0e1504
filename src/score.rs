//! Cumulative standings: per-player win/loss/draw tallies and the
//! scoreboard ordering.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::instrument;

/// Lifetime tally for one player name, accumulated across sessions.
///
/// Keyed by exact name; counters only ever increase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new, Getters)]
pub struct PlayerScore {
    player_name: String,
    wins: i32,
    losses: i32,
    draws: i32,
}

impl PlayerScore {
    /// Fresh tally with every counter at zero.
    pub fn zeroed(player_name: impl Into<String>) -> Self {
        Self::new(player_name.into(), 0, 0, 0)
    }

    /// Total finished games this player appears in.
    pub fn total_games(&self) -> i32 {
        self.wins + self.losses + self.draws
    }

    /// Win rate as a percentage of total games, rounded to one decimal
    /// place; 0.0 for a player with no finished games.
    #[instrument(skip(self))]
    pub fn win_percentage(&self) -> f64 {
        let total = self.total_games();
        if total == 0 {
            0.0
        } else {
            let rate = (self.wins as f64 / total as f64) * 100.0;
            (rate * 10.0).round() / 10.0
        }
    }

    /// Records a won game.
    pub fn record_win(&mut self) {
        self.wins += 1;
    }

    /// Records a lost game.
    pub fn record_loss(&mut self) {
        self.losses += 1;
    }

    /// Records a drawn game.
    pub fn record_draw(&mut self) {
        self.draws += 1;
    }
}

/// Scoreboard ordering: most wins first, then highest win percentage,
/// then name ascending so equal records render in a stable order.
pub fn standings_order(a: &PlayerScore, b: &PlayerScore) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| percentage_tenths(b).cmp(&percentage_tenths(a)))
        .then_with(|| a.player_name.cmp(&b.player_name))
}

/// Sorts tallies into scoreboard order.
#[instrument(skip(scores), fields(count = scores.len()))]
pub fn sort_standings(scores: &mut [PlayerScore]) {
    scores.sort_by(standings_order);
}

// Compare the rounded percentage in integral tenths so equal displayed
// rates always tie.
fn percentage_tenths(score: &PlayerScore) -> i64 {
    (score.win_percentage() * 10.0).round() as i64
}
