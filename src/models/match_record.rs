//! Match model: a single battle between two players.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BattleId, InvalidTagError, PlayerTag};

/// Game mode recorded when the source does not report one.
pub const UNKNOWN_GAME_MODE: &str = "Unknown";

/// A single battle between two players, as stored by the backend.
///
/// Tags are kept exactly as the backend reported them; comparisons go
/// through [`PlayerTag`] normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Deterministic battle identifier
    pub battle_id: BattleId,

    /// First participant tag
    pub player_1_tag: String,

    /// Second participant tag
    pub player_2_tag: String,

    /// Winner tag; absent for a draw
    #[serde(default)]
    pub winner_tag: Option<String>,

    /// When the battle was played
    pub battle_time: DateTime<Utc>,

    /// Game mode label (e.g. "PvP", "friendly")
    #[serde(default = "default_game_mode")]
    pub game_mode: String,

    /// Crowns scored by player 1
    #[serde(default)]
    pub crowns_1: u32,

    /// Crowns scored by player 2
    #[serde(default)]
    pub crowns_2: u32,
}

fn default_game_mode() -> String {
    UNKNOWN_GAME_MODE.to_string()
}

impl MatchRecord {
    /// Create a drawn 0-0 match; use the `with_*` builders to fill it in.
    pub fn new(
        battle_id: BattleId,
        player_1_tag: String,
        player_2_tag: String,
        battle_time: DateTime<Utc>,
    ) -> Self {
        Self {
            battle_id,
            player_1_tag,
            player_2_tag,
            winner_tag: None,
            battle_time,
            game_mode: default_game_mode(),
            crowns_1: 0,
            crowns_2: 0,
        }
    }

    pub fn with_crowns(mut self, crowns_1: u32, crowns_2: u32) -> Self {
        self.crowns_1 = crowns_1;
        self.crowns_2 = crowns_2;
        self
    }

    pub fn with_winner(mut self, winner_tag: impl Into<String>) -> Self {
        self.winner_tag = Some(winner_tag.into());
        self
    }

    pub fn with_game_mode(mut self, game_mode: impl Into<String>) -> Self {
        self.game_mode = game_mode.into();
        self
    }

    /// Both participants, normalized, in stored order.
    pub fn participants(&self) -> Result<(PlayerTag, PlayerTag), InvalidTagError> {
        Ok((
            PlayerTag::normalize(&self.player_1_tag)?,
            PlayerTag::normalize(&self.player_2_tag)?,
        ))
    }

    /// The normalized winner, or `None` for a draw.
    ///
    /// A blank winner string is read as a draw, same as a missing one.
    pub fn winner(&self) -> Result<Option<PlayerTag>, InvalidTagError> {
        match self.winner_tag.as_deref() {
            Some(raw) if !raw.trim().is_empty() => PlayerTag::normalize(raw).map(Some),
            _ => Ok(None),
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner_tag
            .as_deref()
            .map_or(true, |raw| raw.trim().is_empty())
    }

    /// Whether `tag` played in this match. Unparseable participant tags
    /// never match.
    pub fn involves(&self, tag: &PlayerTag) -> bool {
        [&self.player_1_tag, &self.player_2_tag]
            .into_iter()
            .any(|raw| PlayerTag::normalize(raw).is_ok_and(|t| &t == tag))
    }
}
