//! Statistics calculation engine.
//!
//! Computes derived head-to-head metrics from match snapshots:
//! - Per-rival win/loss, crown and streak records
//! - Standings order for display
//! - Nemesis / rival / domination leaderboard buckets
//! - Match history, circle feed and player summary views
//!
//! Everything here is a pure function of the snapshot it is given.

mod aggregate;
mod classify;
pub mod views;

pub use aggregate::{aggregate, standings};
pub use classify::{classify, leaderboard};

use thiserror::Error;

use crate::models::{BattleId, InvalidTagError, PlayerTag};

/// Errors that abort an aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error(transparent)]
    InvalidTag(#[from] InvalidTagError),

    #[error("Inconsistent match {battle_id}: winner {winner} is neither {player_1} nor {player_2}")]
    InconsistentMatch {
        battle_id: BattleId,
        winner: PlayerTag,
        player_1: PlayerTag,
        player_2: PlayerTag,
    },
}
