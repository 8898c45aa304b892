//! Player tag normalization.
//!
//! Tags arrive from the game API, from roster entries typed by users and from
//! URL paths, with inconsistent casing, padding and `#` prefixes. Everything
//! that compares tags goes through [`PlayerTag`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a raw string cannot be turned into a tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid player tag {raw:?}: tag is empty")]
pub struct InvalidTagError {
    pub raw: String,
}

/// A canonical player tag: upper-case, trimmed, exactly one leading `#`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerTag(String);

impl PlayerTag {
    /// Normalize a raw tag.
    ///
    /// Surrounding whitespace is trimmed, letters are upper-cased and any
    /// run of leading `#` markers collapses to a single one, so
    /// `"  #abc123 "`, `"ABC123"` and `"##Abc123"` all become `#ABC123`.
    pub fn normalize(raw: &str) -> Result<Self, InvalidTagError> {
        let body = raw.trim().trim_start_matches('#').trim();
        if body.is_empty() {
            return Err(InvalidTagError {
                raw: raw.to_string(),
            });
        }

        Ok(Self(format!("#{}", body.to_uppercase())))
    }

    /// The canonical form, including the `#`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical form without the `#`, as used in file names and URLs.
    pub fn bare(&self) -> &str {
        &self.0[1..]
    }
}

/// Free-function form of [`PlayerTag::normalize`].
pub fn normalize(raw: &str) -> Result<PlayerTag, InvalidTagError> {
    PlayerTag::normalize(raw)
}

impl fmt::Display for PlayerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PlayerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerTag({})", self.0)
    }
}

impl TryFrom<String> for PlayerTag {
    type Error = InvalidTagError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::normalize(&s)
    }
}

impl TryFrom<&str> for PlayerTag {
    type Error = InvalidTagError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::normalize(s)
    }
}

impl From<PlayerTag> for String {
    fn from(tag: PlayerTag) -> Self {
        tag.0
    }
}

impl std::str::FromStr for PlayerTag {
    type Err = InvalidTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}
