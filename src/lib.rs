//! # Rivalry Tracker
//!
//! Head-to-head statistics for a player and the friends they battle.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (tags, matches, rosters, derived records)
//! - **calculate**: Aggregation, standings, leaderboard classification, match views
//! - **ingest**: Battle-log conversion and snapshot merging
//! - **storage**: JSONL snapshot files
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod storage;

pub use models::*;
