//! JSONL (JSON Lines) storage.
//!
//! Each line is a valid JSON object representing one match or roster entry.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::models::{MatchRecord, PlayerTag, RivalEntry};

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        info!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all entities from the file. A missing file reads as empty;
    /// lines that fail to parse are logged and skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

/// Read the match snapshot.
pub fn read_matches(config: &StorageConfig) -> Result<Vec<MatchRecord>, StorageError> {
    JsonlReader::new(config.matches_path()).read_all()
}

/// Replace the match snapshot, ordered newest first.
pub fn write_matches(
    config: &StorageConfig,
    matches: &mut [MatchRecord],
) -> Result<usize, StorageError> {
    matches.sort_by(|a, b| b.battle_time.cmp(&a.battle_time));
    JsonlWriter::new(config.matches_path()).write_all(matches)
}

/// Read one player's roster. A player without a roster file has no rivals.
pub fn read_roster(
    config: &StorageConfig,
    tag: &PlayerTag,
) -> Result<Vec<RivalEntry>, StorageError> {
    JsonlReader::new(config.roster_path(tag)).read_all()
}

/// Replace one player's roster.
pub fn write_roster(
    config: &StorageConfig,
    tag: &PlayerTag,
    roster: &[RivalEntry],
) -> Result<usize, StorageError> {
    JsonlWriter::new(config.roster_path(tag)).write_all(roster)
}

/// Players that have a roster file, sorted.
pub fn list_rosters(config: &StorageConfig) -> Result<Vec<PlayerTag>, StorageError> {
    let dir = config.rosters_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut tags = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match PlayerTag::normalize(stem) {
            Ok(tag) => tags.push(tag),
            Err(e) => warn!("Ignoring roster file {:?}: {}", path, e),
        }
    }

    tags.sort();
    Ok(tags)
}
