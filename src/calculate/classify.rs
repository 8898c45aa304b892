//! Leaderboard classification into nemesis / rivals / domination.

use std::collections::HashMap;

use tracing::warn;

use super::standings;
use crate::models::{
    H2HRecord, Leaderboard, LeaderboardCategory, PerOpponentSummary, PlayerTag, Thresholds,
};

/// Bucket per-opponent summaries by win rate.
///
/// Summaries without any decisive game carry no signal and are left out, as
/// are summaries whose win rate is NaN or outside [0, 1].
/// Each bucket is sorted by games played, most first; equal totals keep
/// input order.
pub fn classify(records: &[PerOpponentSummary], thresholds: &Thresholds) -> Leaderboard {
    let mut board = Leaderboard::default();

    for record in records {
        if record.total() == 0 {
            continue;
        }
        if !(0.0..=1.0).contains(&record.win_rate) {
            warn!(
                "Skipping {} with win rate {} outside [0, 1]",
                record.opponent, record.win_rate
            );
            continue;
        }

        let bucket = match LeaderboardCategory::from_win_rate(record.win_rate, thresholds) {
            LeaderboardCategory::Nemesis => &mut board.nemesis,
            LeaderboardCategory::Rival => &mut board.rivals,
            LeaderboardCategory::Domination => &mut board.domination,
        };
        bucket.push(record.clone());
    }

    for bucket in [&mut board.nemesis, &mut board.rivals, &mut board.domination] {
        bucket.sort_by(|a, b| b.total().cmp(&a.total()));
    }

    board
}

/// Classify aggregated records. Records are fed in standings order so ties
/// inside a bucket resolve the same way the standings do.
pub fn leaderboard(records: &HashMap<PlayerTag, H2HRecord>, thresholds: &Thresholds) -> Leaderboard {
    let summaries: Vec<PerOpponentSummary> = standings(records.values().cloned())
        .iter()
        .map(PerOpponentSummary::from)
        .collect();
    classify(&summaries, thresholds)
}
