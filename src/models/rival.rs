//! Roster model: the rivals a user tracks.

use serde::{Deserialize, Serialize};

use super::{InvalidTagError, PlayerTag};

/// Display name used when a rival has none.
pub const DEFAULT_RIVAL_NAME: &str = "Rival";

/// A tracked rival. Owned by the backend; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivalEntry {
    /// Rival's player tag, as stored
    pub player_tag: String,

    /// Rival's display name
    #[serde(default)]
    pub username: String,
}

impl RivalEntry {
    pub fn new(player_tag: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            player_tag: player_tag.into(),
            username: username.into(),
        }
    }

    /// The normalized tag.
    pub fn tag(&self) -> Result<PlayerTag, InvalidTagError> {
        PlayerTag::normalize(&self.player_tag)
    }

    /// The username, or [`DEFAULT_RIVAL_NAME`] when blank.
    pub fn display_name(&self) -> &str {
        let name = self.username.trim();
        if name.is_empty() {
            DEFAULT_RIVAL_NAME
        } else {
            name
        }
    }
}
