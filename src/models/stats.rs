//! Derived head-to-head statistics models.

use serde::{Deserialize, Serialize};

use super::PlayerTag;

/// A decisive result from self's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultMark {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

impl std::fmt::Display for ResultMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultMark::Win => write!(f, "W"),
            ResultMark::Loss => write!(f, "L"),
        }
    }
}

/// Head-to-head record against one rival. Recomputed on every
/// aggregation pass, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct H2HRecord {
    /// Rival tag
    pub tag: PlayerTag,

    /// Rival display name
    pub username: String,

    /// Matches self won against this rival
    pub wins: u32,

    /// Matches self lost against this rival
    pub losses: u32,

    /// Matches without a winner
    pub draws: u32,

    /// Crowns scored by self
    pub crowns_for: u32,

    /// Crowns scored by the rival
    pub crowns_against: u32,

    /// Latest decisive results, most recent first
    pub recent: Vec<ResultMark>,
}

impl H2HRecord {
    /// A zeroed record, used for rivals with no matches yet.
    pub fn new(tag: PlayerTag, username: String) -> Self {
        Self {
            tag,
            username,
            wins: 0,
            losses: 0,
            draws: 0,
            crowns_for: 0,
            crowns_against: 0,
            recent: Vec::new(),
        }
    }

    pub fn decisive(&self) -> u64 {
        u64::from(self.wins) + u64::from(self.losses)
    }

    pub fn games_played(&self) -> u64 {
        self.decisive() + u64::from(self.draws)
    }

    /// Wins over decisive matches; 0.0 when nothing was decided.
    pub fn win_rate(&self) -> f64 {
        decisive_win_rate(self.wins, self.losses)
    }

    pub fn crown_differential(&self) -> i64 {
        i64::from(self.crowns_for) - i64::from(self.crowns_against)
    }

    /// Self's share of all crowns scored in this rivalry (0.5 when none).
    pub fn crown_share(&self) -> f64 {
        let total = u64::from(self.crowns_for) + u64::from(self.crowns_against);
        if total == 0 {
            0.5
        } else {
            self.crowns_for as f64 / total as f64
        }
    }
}

/// Win rate over decisive games; 0.0 when there were none.
pub fn decisive_win_rate(wins: u32, losses: u32) -> f64 {
    let total = u64::from(wins) + u64::from(losses);
    if total == 0 {
        0.0
    } else {
        f64::from(wins) / total as f64
    }
}

/// Win-rate thresholds for leaderboard buckets.
///
/// Rates at or below `nemesis_max` are nemeses, rates at or above
/// `domination_min` are dominations, everything between is a rivalry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_nemesis_max")]
    pub nemesis_max: f64,

    #[serde(default = "default_domination_min")]
    pub domination_min: f64,
}

fn default_nemesis_max() -> f64 {
    0.4
}

fn default_domination_min() -> f64 {
    0.6
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            nemesis_max: default_nemesis_max(),
            domination_min: default_domination_min(),
        }
    }
}

/// Leaderboard classification based on win rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardCategory {
    /// Self mostly loses
    Nemesis,
    /// Near-even
    Rival,
    /// Self mostly wins
    Domination,
}

impl LeaderboardCategory {
    /// Classify a win rate.
    pub fn from_win_rate(win_rate: f64, thresholds: &Thresholds) -> Self {
        if win_rate <= thresholds.nemesis_max {
            LeaderboardCategory::Nemesis
        } else if win_rate >= thresholds.domination_min {
            LeaderboardCategory::Domination
        } else {
            LeaderboardCategory::Rival
        }
    }
}

impl std::fmt::Display for LeaderboardCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaderboardCategory::Nemesis => write!(f, "nemesis"),
            LeaderboardCategory::Rival => write!(f, "rival"),
            LeaderboardCategory::Domination => write!(f, "domination"),
        }
    }
}

/// Per-opponent record fed to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerOpponentSummary {
    /// Opponent identifier
    pub opponent: String,

    /// Display name, if known
    #[serde(default)]
    pub username: Option<String>,

    pub wins: u32,

    pub losses: u32,

    /// Win rate (0.0 to 1.0)
    pub win_rate: f64,
}

impl PerOpponentSummary {
    /// Build a summary, computing the win rate from the counts.
    pub fn new(opponent: impl Into<String>, wins: u32, losses: u32) -> Self {
        Self {
            opponent: opponent.into(),
            username: None,
            wins,
            losses,
            win_rate: decisive_win_rate(wins, losses),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn total(&self) -> u64 {
        u64::from(self.wins) + u64::from(self.losses)
    }
}

impl From<&H2HRecord> for PerOpponentSummary {
    fn from(record: &H2HRecord) -> Self {
        Self::new(record.tag.to_string(), record.wins, record.losses)
            .with_username(record.username.clone())
    }
}

/// Categorized leaderboard buckets, each sorted for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub nemesis: Vec<PerOpponentSummary>,
    pub rivals: Vec<PerOpponentSummary>,
    pub domination: Vec<PerOpponentSummary>,
}

impl Leaderboard {
    /// Entries in a specific category.
    pub fn in_category(&self, category: LeaderboardCategory) -> &[PerOpponentSummary] {
        match category {
            LeaderboardCategory::Nemesis => &self.nemesis,
            LeaderboardCategory::Rival => &self.rivals,
            LeaderboardCategory::Domination => &self.domination,
        }
    }

    pub fn len(&self) -> usize {
        self.nemesis.len() + self.rivals.len() + self.domination.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> PlayerTag {
        PlayerTag::normalize(s).unwrap()
    }

    #[test]
    fn test_category_from_win_rate() {
        let t = Thresholds::default();
        assert_eq!(LeaderboardCategory::from_win_rate(0.0, &t), LeaderboardCategory::Nemesis);
        assert_eq!(LeaderboardCategory::from_win_rate(0.4, &t), LeaderboardCategory::Nemesis);
        assert_eq!(LeaderboardCategory::from_win_rate(0.41, &t), LeaderboardCategory::Rival);
        assert_eq!(LeaderboardCategory::from_win_rate(0.5, &t), LeaderboardCategory::Rival);
        assert_eq!(LeaderboardCategory::from_win_rate(0.6, &t), LeaderboardCategory::Domination);
        assert_eq!(LeaderboardCategory::from_win_rate(1.0, &t), LeaderboardCategory::Domination);
    }

    #[test]
    fn test_category_display_and_serde() {
        assert_eq!(format!("{}", LeaderboardCategory::Nemesis), "nemesis");
        let json = serde_json::to_string(&LeaderboardCategory::Domination).unwrap();
        assert_eq!(json, "\"domination\"");
    }

    #[test]
    fn test_result_mark_serializes_as_letter() {
        let json = serde_json::to_string(&vec![ResultMark::Loss, ResultMark::Win]).unwrap();
        assert_eq!(json, r#"["L","W"]"#);
        assert_eq!(format!("{}", ResultMark::Win), "W");
    }

    #[test]
    fn test_h2h_record_zeroed() {
        let record = H2HRecord::new(tag("#XYZ999"), "Bob".to_string());
        assert_eq!(record.games_played(), 0);
        assert_eq!(record.win_rate(), 0.0);
        assert_eq!(record.crown_share(), 0.5);
        assert!(record.recent.is_empty());
    }

    #[test]
    fn test_h2h_record_derived_values() {
        let mut record = H2HRecord::new(tag("#XYZ999"), "Bob".to_string());
        record.wins = 3;
        record.losses = 1;
        record.draws = 2;
        record.crowns_for = 6;
        record.crowns_against = 9;

        assert_eq!(record.decisive(), 4);
        assert_eq!(record.games_played(), 6);
        assert!((record.win_rate() - 0.75).abs() < 1e-9);
        assert_eq!(record.crown_differential(), -3);
        assert!((record.crown_share() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_summary_from_record() {
        let mut record = H2HRecord::new(tag("#XYZ999"), "Bob".to_string());
        record.wins = 1;
        record.losses = 3;

        let summary = PerOpponentSummary::from(&record);
        assert_eq!(summary.opponent, "#XYZ999");
        assert_eq!(summary.username.as_deref(), Some("Bob"));
        assert_eq!(summary.total(), 4);
        assert!((summary.win_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_decisive_win_rate() {
        assert!((decisive_win_rate(5, 1) - 0.833).abs() < 0.01);
        assert_eq!(decisive_win_rate(0, 0), 0.0);
        assert_eq!(decisive_win_rate(3, 3), 0.5);
        assert_eq!(decisive_win_rate(0, 4), 0.0);
    }

    #[test]
    fn test_counts_near_u32_max_do_not_overflow() {
        let mut record = H2HRecord::new(tag("#XYZ999"), "Bob".to_string());
        record.wins = u32::MAX;
        record.losses = u32::MAX;
        record.draws = u32::MAX;
        record.crowns_for = u32::MAX;
        record.crowns_against = u32::MAX;

        assert_eq!(record.decisive(), 2 * u64::from(u32::MAX));
        assert_eq!(record.games_played(), 3 * u64::from(u32::MAX));
        assert!((record.win_rate() - 0.5).abs() < 1e-9);
        assert!((record.crown_share() - 0.5).abs() < 1e-9);

        let summary = PerOpponentSummary::new("A", u32::MAX, 1);
        assert_eq!(summary.total(), u64::from(u32::MAX) + 1);
        assert!(summary.win_rate > 0.99);
    }

    #[test]
    fn test_summary_new_zero_games() {
        let summary = PerOpponentSummary::new("A", 0, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_leaderboard_in_category() {
        let board = Leaderboard {
            nemesis: vec![PerOpponentSummary::new("A", 1, 9)],
            rivals: vec![],
            domination: vec![PerOpponentSummary::new("C", 9, 1)],
        };

        assert_eq!(board.len(), 2);
        assert!(!board.is_empty());
        assert_eq!(board.in_category(LeaderboardCategory::Nemesis)[0].opponent, "A");
        assert!(board.in_category(LeaderboardCategory::Rival).is_empty());
    }
}
