//! Match history, circle feed and player summary views.
//!
//! These views are lenient: a match with an unparseable tag simply does not
//! match anything. Only the aggregator treats bad data as fatal.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BattleId, InvalidTagError, MatchRecord, PlayerTag, RivalEntry};

/// Outcome of a match from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

/// A match seen from one participant's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
    pub battle_id: BattleId,
    pub battle_time: DateTime<Utc>,
    pub game_mode: String,
    pub opponent_tag: PlayerTag,
    pub own_crowns: u32,
    pub opponent_crowns: u32,
    pub outcome: MatchOutcome,
}

impl MatchView {
    /// `None` when `self_tag` did not play in the match.
    pub fn from_perspective(m: &MatchRecord, self_tag: &PlayerTag) -> Option<Self> {
        let (player_1, player_2) = m.participants().ok()?;
        let (opponent_tag, own_crowns, opponent_crowns) = if player_1 == *self_tag {
            (player_2, m.crowns_1, m.crowns_2)
        } else if player_2 == *self_tag {
            (player_1, m.crowns_2, m.crowns_1)
        } else {
            return None;
        };

        let outcome = match m.winner().ok()? {
            None => MatchOutcome::Draw,
            Some(w) if w == *self_tag => MatchOutcome::Win,
            Some(_) => MatchOutcome::Loss,
        };

        Some(Self {
            battle_id: m.battle_id.clone(),
            battle_time: m.battle_time,
            game_mode: m.game_mode.clone(),
            opponent_tag,
            own_crowns,
            opponent_crowns,
            outcome,
        })
    }
}

/// Overall record of one player across every match in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub total_matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Wins over all matches, draws included (0.0 with no matches)
    pub win_rate: f64,
    pub total_crowns: u32,
}

impl PlayerSummary {
    pub fn from_matches(matches: &[MatchRecord], self_tag: &PlayerTag) -> Self {
        let mut summary = Self::default();

        for view in matches
            .iter()
            .filter_map(|m| MatchView::from_perspective(m, self_tag))
        {
            summary.total_matches += 1;
            summary.total_crowns += view.own_crowns;
            match view.outcome {
                MatchOutcome::Win => summary.wins += 1,
                MatchOutcome::Loss => summary.losses += 1,
                MatchOutcome::Draw => summary.draws += 1,
            }
        }

        if summary.total_matches > 0 {
            summary.win_rate = summary.wins as f64 / summary.total_matches as f64;
        }
        summary
    }
}

/// Newest-first matches that `tag` played in, at most `limit`.
pub fn player_history<'a>(
    matches: &'a [MatchRecord],
    tag: &PlayerTag,
    limit: usize,
) -> Vec<&'a MatchRecord> {
    newest_first(matches.iter().filter(|m| m.involves(tag)).collect(), limit)
}

/// Newest-first matches played entirely inside the circle (self plus
/// roster), at most `limit`. A circle of fewer than two players has no feed.
pub fn circle_feed<'a>(
    matches: &'a [MatchRecord],
    self_tag: &PlayerTag,
    roster: &[RivalEntry],
    limit: usize,
) -> Result<Vec<&'a MatchRecord>, InvalidTagError> {
    let mut circle: HashSet<PlayerTag> = HashSet::with_capacity(roster.len() + 1);
    circle.insert(self_tag.clone());
    for entry in roster {
        circle.insert(entry.tag()?);
    }

    if circle.len() < 2 {
        return Ok(Vec::new());
    }

    let in_circle: Vec<&MatchRecord> = matches
        .iter()
        .filter(|m| {
            m.participants()
                .is_ok_and(|(p1, p2)| circle.contains(&p1) && circle.contains(&p2))
        })
        .collect();

    Ok(newest_first(in_circle, limit))
}

fn newest_first(mut matches: Vec<&MatchRecord>, limit: usize) -> Vec<&MatchRecord> {
    matches.sort_by(|a, b| b.battle_time.cmp(&a.battle_time));
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn tag(s: &str) -> PlayerTag {
        PlayerTag::normalize(s).unwrap()
    }

    fn make_match(id: &str, p1: &str, p2: &str, winner: Option<&str>, minute: u32) -> MatchRecord {
        let m = MatchRecord::new(
            BattleId::from(id),
            p1.to_string(),
            p2.to_string(),
            Utc.with_ymd_and_hms(2025, 2, 1, 12, minute, 0).unwrap(),
        )
        .with_crowns(2, 1);
        match winner {
            Some(w) => m.with_winner(w),
            None => m,
        }
    }

    fn ids(matches: &[&MatchRecord]) -> Vec<String> {
        matches.iter().map(|m| m.battle_id.to_string()).collect()
    }

    #[test]
    fn test_match_view_as_player_two() {
        let m = make_match("m1", "#XYZ999", "abc123", Some("#XYZ999"), 0);
        let view = MatchView::from_perspective(&m, &tag("#ABC123")).unwrap();

        assert_eq!(view.opponent_tag, tag("#XYZ999"));
        assert_eq!(view.own_crowns, 1);
        assert_eq!(view.opponent_crowns, 2);
        assert_eq!(view.outcome, MatchOutcome::Loss);
    }

    #[test]
    fn test_match_view_draw_and_absent_player() {
        let m = make_match("m1", "#ABC123", "#XYZ999", None, 0);
        let view = MatchView::from_perspective(&m, &tag("#ABC123")).unwrap();
        assert_eq!(view.outcome, MatchOutcome::Draw);

        assert!(MatchView::from_perspective(&m, &tag("#QQQ000")).is_none());
    }

    #[test]
    fn test_player_summary() {
        let matches = vec![
            make_match("m1", "#ABC123", "#XYZ999", Some("#abc123"), 0),
            make_match("m2", "#XYZ999", "#ABC123", Some("#XYZ999"), 1),
            make_match("m3", "#ABC123", "#QQQ000", None, 2),
            make_match("m4", "#ABC123", "#QQQ000", Some("#ABC123"), 3),
            make_match("other", "#DEF000", "#QQQ000", Some("#DEF000"), 4),
        ];

        let summary = PlayerSummary::from_matches(&matches, &tag("#ABC123"));

        assert_eq!(summary.total_matches, 4);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses, 1);
        assert_eq!(summary.draws, 1);
        assert!((summary.win_rate - 0.5).abs() < 1e-9);
        // 2 + 1 + 2 + 2
        assert_eq!(summary.total_crowns, 7);
    }

    #[test]
    fn test_player_summary_empty() {
        let summary = PlayerSummary::from_matches(&[], &tag("#ABC123"));
        assert_eq!(summary, PlayerSummary::default());
    }

    #[test]
    fn test_player_history_newest_first_with_limit() {
        let matches = vec![
            make_match("m1", "#ABC123", "#XYZ999", None, 0),
            make_match("m3", "#ABC123", "#XYZ999", None, 20),
            make_match("other", "#DEF000", "#XYZ999", None, 30),
            make_match("m2", "#xyz999", "abc123", None, 10),
        ];

        let history = player_history(&matches, &tag("#ABC123"), 2);
        assert_eq!(ids(&history), vec!["m3", "m2"]);

        let history = player_history(&matches, &tag("#ABC123"), 50);
        assert_eq!(ids(&history), vec!["m3", "m2", "m1"]);
    }

    #[test]
    fn test_circle_feed_both_participants_in_circle() {
        let roster = vec![RivalEntry::new("#XYZ999", "Bob"), RivalEntry::new("#QQQ000", "Carol")];
        let matches = vec![
            make_match("self-bob", "#ABC123", "#XYZ999", None, 0),
            make_match("bob-carol", "#XYZ999", "qqq000", None, 10),
            make_match("bob-stranger", "#XYZ999", "#DEF000", None, 20),
        ];

        let feed = circle_feed(&matches, &tag("#ABC123"), &roster, 50).unwrap();
        assert_eq!(ids(&feed), vec!["bob-carol", "self-bob"]);
    }

    #[test]
    fn test_circle_feed_needs_two_members() {
        let matches = vec![make_match("m1", "#ABC123", "#XYZ999", None, 0)];
        let feed = circle_feed(&matches, &tag("#ABC123"), &[], 50).unwrap();
        assert!(feed.is_empty());

        // A roster holding only self is still a circle of one.
        let roster = vec![RivalEntry::new("abc123", "Me")];
        let feed = circle_feed(&matches, &tag("#ABC123"), &roster, 50).unwrap();
        assert!(feed.is_empty());
    }

    #[test]
    fn test_circle_feed_invalid_roster_tag() {
        let roster = vec![RivalEntry::new("", "Ghost")];
        assert!(circle_feed(&[], &tag("#ABC123"), &roster, 50).is_err());
    }
}
