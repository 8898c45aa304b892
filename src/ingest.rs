//! Battle-log ingestion.
//!
//! Converts entries from the game's battle-log API into [`MatchRecord`]s and
//! merges them into an existing snapshot without duplicating battles.

use std::collections::HashSet;

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{BattleId, InvalidTagError, MatchRecord, PlayerTag, UNKNOWN_GAME_MODE};

/// Timestamp format used by the battle-log API, e.g. `20250115T181512.000Z`.
pub const BATTLE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.fZ";

/// Errors converting a single battle-log entry.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Battle at {battle_time} has no {side} player")]
    MissingSide {
        battle_time: String,
        side: &'static str,
    },

    #[error("Invalid battle time {value:?}: {source}")]
    InvalidTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    InvalidTag(#[from] InvalidTagError),
}

/// One side's first player in a battle-log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleParticipant {
    pub tag: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub crowns: u32,
}

/// A raw battle-log entry as returned by the game API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleLogEntry {
    pub battle_time: String,

    #[serde(rename = "type", default)]
    pub battle_type: Option<String>,

    #[serde(default)]
    pub team: Vec<BattleParticipant>,

    #[serde(default)]
    pub opponent: Vec<BattleParticipant>,
}

/// Convert one battle-log entry.
///
/// The side with more crowns wins; equal crowns is a draw. Both tags are
/// stored in canonical form.
pub fn match_from_battle(entry: &BattleLogEntry) -> Result<MatchRecord, IngestError> {
    let team = entry.team.first().ok_or_else(|| IngestError::MissingSide {
        battle_time: entry.battle_time.clone(),
        side: "team",
    })?;
    let opponent = entry
        .opponent
        .first()
        .ok_or_else(|| IngestError::MissingSide {
            battle_time: entry.battle_time.clone(),
            side: "opponent",
        })?;

    let team_tag = PlayerTag::normalize(&team.tag)?;
    let opponent_tag = PlayerTag::normalize(&opponent.tag)?;

    let naive = NaiveDateTime::parse_from_str(entry.battle_time.trim(), BATTLE_TIME_FORMAT)
        .map_err(|source| IngestError::InvalidTime {
            value: entry.battle_time.clone(),
            source,
        })?;

    let battle_id =
        BattleId::generate(&entry.battle_time, team_tag.as_str(), opponent_tag.as_str());
    let game_mode = entry
        .battle_type
        .clone()
        .unwrap_or_else(|| UNKNOWN_GAME_MODE.to_string());

    let record = MatchRecord::new(
        battle_id,
        team_tag.to_string(),
        opponent_tag.to_string(),
        Utc.from_utc_datetime(&naive),
    )
    .with_crowns(team.crowns, opponent.crowns)
    .with_game_mode(game_mode);

    let record = if team.crowns > opponent.crowns {
        record.with_winner(team_tag.to_string())
    } else if opponent.crowns > team.crowns {
        record.with_winner(opponent_tag.to_string())
    } else {
        record
    };

    Ok(record)
}

/// Convert a batch, skipping entries that can't be converted.
pub fn convert_battle_log(entries: &[BattleLogEntry]) -> Vec<MatchRecord> {
    let mut records = Vec::with_capacity(entries.len());

    for entry in entries {
        match match_from_battle(entry) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping battle-log entry: {}", e),
        }
    }

    debug!(
        "Converted {} of {} battle-log entries",
        records.len(),
        entries.len()
    );
    records
}

/// Append the incoming matches whose battle id is not already present.
/// Returns how many were added.
pub fn merge_matches(
    existing: &mut Vec<MatchRecord>,
    incoming: impl IntoIterator<Item = MatchRecord>,
) -> usize {
    let mut seen: HashSet<BattleId> = existing.iter().map(|m| m.battle_id.clone()).collect();
    let before = existing.len();

    for record in incoming {
        if seen.insert(record.battle_id.clone()) {
            existing.push(record);
        }
    }

    let added = existing.len() - before;
    info!("Merged {} new matches ({} total)", added, existing.len());
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use pretty_assertions::assert_eq;

    fn participant(tag: &str, crowns: u32) -> BattleParticipant {
        BattleParticipant {
            tag: tag.to_string(),
            name: None,
            crowns,
        }
    }

    fn entry(time: &str, team: (&str, u32), opponent: (&str, u32)) -> BattleLogEntry {
        BattleLogEntry {
            battle_time: time.to_string(),
            battle_type: Some("PvP".to_string()),
            team: vec![participant(team.0, team.1)],
            opponent: vec![participant(opponent.0, opponent.1)],
        }
    }

    #[test]
    fn test_match_from_battle_team_wins() {
        let record =
            match_from_battle(&entry("20250115T181512.000Z", ("#ABC123", 3), ("#XYZ999", 1)))
                .unwrap();

        assert_eq!(record.player_1_tag, "#ABC123");
        assert_eq!(record.player_2_tag, "#XYZ999");
        assert_eq!(record.winner_tag.as_deref(), Some("#ABC123"));
        assert_eq!((record.crowns_1, record.crowns_2), (3, 1));
        assert_eq!(record.game_mode, "PvP");
        assert_eq!(record.battle_time.year(), 2025);
        assert_eq!(record.battle_time.day(), 15);
    }

    #[test]
    fn test_match_from_battle_opponent_wins_and_draw() {
        let lost =
            match_from_battle(&entry("20250115T181512.000Z", ("#ABC123", 0), ("#XYZ999", 2)))
                .unwrap();
        assert_eq!(lost.winner_tag.as_deref(), Some("#XYZ999"));

        let drawn =
            match_from_battle(&entry("20250115T181512.000Z", ("#ABC123", 1), ("#XYZ999", 1)))
                .unwrap();
        assert!(drawn.is_draw());
    }

    #[test]
    fn test_match_from_battle_same_id_from_both_logs() {
        let mine =
            match_from_battle(&entry("20250115T181512.000Z", ("#ABC123", 3), ("#XYZ999", 1)))
                .unwrap();
        let theirs =
            match_from_battle(&entry("20250115T181512.000Z", ("#XYZ999", 1), ("#ABC123", 3)))
                .unwrap();
        assert_eq!(mine.battle_id, theirs.battle_id);
    }

    #[test]
    fn test_match_from_battle_unknown_mode() {
        let mut e = entry("20250115T181512.000Z", ("#A", 1), ("#B", 0));
        e.battle_type = None;
        assert_eq!(match_from_battle(&e).unwrap().game_mode, UNKNOWN_GAME_MODE);
    }

    #[test]
    fn test_match_from_battle_errors() {
        let mut e = entry("20250115T181512.000Z", ("#A", 1), ("#B", 0));
        e.opponent.clear();
        assert!(matches!(
            match_from_battle(&e),
            Err(IngestError::MissingSide { side: "opponent", .. })
        ));

        let e = entry("yesterday", ("#A", 1), ("#B", 0));
        assert!(matches!(
            match_from_battle(&e),
            Err(IngestError::InvalidTime { .. })
        ));
    }

    #[test]
    fn test_battle_log_deserialize_api_shape() {
        let json = r##"[{
            "type": "PvP",
            "battleTime": "20250115T181512.000Z",
            "team": [{"tag": "#ABC123", "name": "Me", "crowns": 2}],
            "opponent": [{"tag": "#XYZ999", "name": "Bob", "crowns": 0}]
        }]"##;

        let entries: Vec<BattleLogEntry> = serde_json::from_str(json).unwrap();
        let records = convert_battle_log(&entries);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].winner_tag.as_deref(), Some("#ABC123"));
    }

    #[test]
    fn test_convert_battle_log_skips_malformed() {
        let mut broken = entry("20250115T181512.000Z", ("#A", 1), ("#B", 0));
        broken.team.clear();
        let entries = vec![
            entry("20250115T181512.000Z", ("#A", 1), ("#B", 0)),
            broken,
            entry("20250115T190000.000Z", ("#A", 0), ("#B", 0)),
        ];

        assert_eq!(convert_battle_log(&entries).len(), 2);
    }

    #[test]
    fn test_convert_battle_log_skips_blank_tags() {
        let entries = vec![
            entry("20250115T181512.000Z", ("#ABC123", 3), ("#XYZ999", 1)),
            entry("20250115T190000.000Z", ("", 1), ("#XYZ999", 0)),
            entry("20250115T200000.000Z", ("#ABC123", 1), ("  # ", 0)),
        ];

        let records = convert_battle_log(&entries);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_1_tag, "#ABC123");

        assert!(matches!(
            match_from_battle(&entries[1]),
            Err(IngestError::InvalidTag(_))
        ));
    }

    #[test]
    fn test_match_from_battle_stores_canonical_tags() {
        let record =
            match_from_battle(&entry("20250115T181512.000Z", (" abc123", 3), ("xyz999", 1)))
                .unwrap();

        assert_eq!(record.player_1_tag, "#ABC123");
        assert_eq!(record.player_2_tag, "#XYZ999");
        assert_eq!(record.winner_tag.as_deref(), Some("#ABC123"));
    }

    #[test]
    fn test_merge_matches_skips_known_battles() {
        let first =
            match_from_battle(&entry("20250115T181512.000Z", ("#A", 1), ("#B", 0))).unwrap();
        let second =
            match_from_battle(&entry("20250115T190000.000Z", ("#A", 0), ("#B", 2))).unwrap();
        let mirrored =
            match_from_battle(&entry("20250115T181512.000Z", ("#B", 0), ("#A", 1))).unwrap();

        let mut existing = vec![first.clone()];
        let added = merge_matches(&mut existing, vec![mirrored, second.clone(), second]);

        assert_eq!(added, 1);
        assert_eq!(existing.len(), 2);
        assert_eq!(existing[0], first);
    }
}
