//! Head-to-head aggregation over a match snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::AggregateError;
use crate::models::{H2HRecord, MatchRecord, PlayerTag, ResultMark, RivalEntry};

/// Aggregate `matches` into one record per roster entry.
///
/// Every roster entry gets a record, even with no matches against it.
/// Matches that don't involve `self_tag`, or whose opponent is not on the
/// roster, are skipped. The call fails as a whole on an unparseable tag or a
/// winner that is neither participant. `recent` keeps at most
/// `streak_window` decisive results, newest first.
pub fn aggregate(
    matches: &[MatchRecord],
    roster: &[RivalEntry],
    self_tag: &PlayerTag,
    streak_window: usize,
) -> Result<HashMap<PlayerTag, H2HRecord>, AggregateError> {
    let mut records: HashMap<PlayerTag, H2HRecord> = HashMap::with_capacity(roster.len());
    for entry in roster {
        let tag = entry.tag()?;
        if records.contains_key(&tag) {
            debug!("Ignoring duplicate roster entry for {}", tag);
            continue;
        }
        records.insert(tag.clone(), H2HRecord::new(tag, entry.display_name().to_string()));
    }

    let mut timelines: HashMap<PlayerTag, Vec<(DateTime<Utc>, ResultMark)>> = HashMap::new();
    let mut skipped = 0usize;

    for m in matches {
        let (player_1, player_2) = m.participants()?;
        let winner = m.winner()?;

        if let Some(ref w) = winner {
            if *w != player_1 && *w != player_2 {
                return Err(AggregateError::InconsistentMatch {
                    battle_id: m.battle_id.clone(),
                    winner: w.clone(),
                    player_1,
                    player_2,
                });
            }
        }

        let (opponent, own_crowns, their_crowns) = if player_1 == *self_tag {
            (player_2, m.crowns_1, m.crowns_2)
        } else if player_2 == *self_tag {
            (player_1, m.crowns_2, m.crowns_1)
        } else {
            skipped += 1;
            continue;
        };

        if opponent == *self_tag {
            skipped += 1;
            continue;
        }

        let Some(record) = records.get_mut(&opponent) else {
            skipped += 1;
            continue;
        };

        record.crowns_for = record.crowns_for.saturating_add(own_crowns);
        record.crowns_against = record.crowns_against.saturating_add(their_crowns);

        match winner {
            None => record.draws = record.draws.saturating_add(1),
            Some(w) => {
                let mark = if w == *self_tag {
                    record.wins = record.wins.saturating_add(1);
                    ResultMark::Win
                } else {
                    record.losses = record.losses.saturating_add(1);
                    ResultMark::Loss
                };
                timelines
                    .entry(opponent)
                    .or_default()
                    .push((m.battle_time, mark));
            }
        }
    }

    for (tag, mut timeline) in timelines {
        // Stable: equal timestamps keep snapshot order.
        timeline.sort_by(|a, b| b.0.cmp(&a.0));
        if let Some(record) = records.get_mut(&tag) {
            record.recent = timeline
                .into_iter()
                .take(streak_window)
                .map(|(_, mark)| mark)
                .collect();
        }
    }

    debug!(
        "Aggregated {} matches for {} into {} rivals ({} skipped)",
        matches.len(),
        self_tag,
        records.len(),
        skipped
    );

    Ok(records)
}

/// Standings order: wins descending, ties by display name ascending
/// (case-insensitive), then by tag.
pub fn standings(records: impl IntoIterator<Item = H2HRecord>) -> Vec<H2HRecord> {
    let mut sorted: Vec<H2HRecord> = records.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| a.username.to_lowercase().cmp(&b.username.to_lowercase()))
            .then_with(|| a.tag.cmp(&b.tag))
    });
    sorted
}
