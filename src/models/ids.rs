//! Deterministic battle ID generation using SHA256 hashing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A deterministic battle identifier derived from content hash.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleId(String);

impl BattleId {
    /// Generate a BattleId for a battle between two players.
    ///
    /// Both players' battle logs report the same battle with the sides
    /// swapped, so the tags are stripped of `#`, upper-cased and sorted
    /// before hashing. Takes the first 16 hex characters.
    pub fn generate(battle_time: &str, tag_a: &str, tag_b: &str) -> Self {
        let mut tags = [clean_tag(tag_a), clean_tag(tag_b)];
        tags.sort();

        let mut hasher = Sha256::new();
        hasher.update(battle_time.trim().as_bytes());
        for tag in &tags {
            hasher.update(b"|");
            hasher.update(tag.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn clean_tag(tag: &str) -> String {
    tag.replace('#', "").trim().to_uppercase()
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BattleId({})", self.0)
    }
}

impl From<String> for BattleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BattleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
