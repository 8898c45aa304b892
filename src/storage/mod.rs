//! Filesystem snapshot store.
//!
//! Match and roster snapshots live as JSONL files under a data directory:
//! - `matches.jsonl`: every known match
//! - `rosters/<TAG>.jsonl`: the rivals tracked by one player

mod jsonl;

pub use jsonl::*;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::PlayerTag;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn matches_path(&self) -> PathBuf {
        self.data_dir.join("matches.jsonl")
    }

    pub fn rosters_dir(&self) -> PathBuf {
        self.data_dir.join("rosters")
    }

    /// Roster file for a player, named by the tag without `#`.
    pub fn roster_path(&self, tag: &PlayerTag) -> PathBuf {
        self.rosters_dir().join(format!("{}.jsonl", tag.bare()))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
