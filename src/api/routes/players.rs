use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::views::{circle_feed, player_history, MatchView, PlayerSummary};
use crate::calculate::{aggregate, leaderboard as classify_records, standings as sort_standings};
use crate::models::{
    H2HRecord, Leaderboard, LeaderboardCategory, MatchRecord, PlayerTag, Thresholds,
};
use crate::storage::{read_matches, read_roster};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn resolve(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct RivalStanding {
    #[serde(flatten)]
    pub record: H2HRecord,
    pub win_rate: f64,
    pub crown_differential: i64,
    pub crown_share: f64,
    /// `None` until at least one decisive game
    pub category: Option<LeaderboardCategory>,
}

#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub player: PlayerTag,
    pub rivals: Vec<RivalStanding>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub player: PlayerTag,
    pub thresholds: Thresholds,
    #[serde(flatten)]
    pub leaderboard: Leaderboard,
}

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub player: PlayerTag,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub player: PlayerTag,
    pub matches: Vec<MatchRecord>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub player: PlayerTag,
    #[serde(flatten)]
    pub summary: PlayerSummary,
}

fn aggregated(
    state: &AppState,
    tag: &PlayerTag,
) -> Result<HashMap<PlayerTag, H2HRecord>, ApiError> {
    let matches = read_matches(&state.storage)?;
    let roster = read_roster(&state.storage, tag)?;
    Ok(aggregate(&matches, &roster, tag, state.config.engine.streak_window)?)
}

pub async fn standings(
    State(state): State<AppState>,
    Path(raw_tag): Path<String>,
) -> Result<Json<StandingsResponse>, ApiError> {
    let tag = PlayerTag::normalize(&raw_tag)?;
    let thresholds = &state.config.leaderboard;

    let rivals = sort_standings(aggregated(&state, &tag)?.into_values())
        .into_iter()
        .map(|record| {
            let category = (record.decisive() > 0)
                .then(|| LeaderboardCategory::from_win_rate(record.win_rate(), thresholds));
            RivalStanding {
                win_rate: record.win_rate(),
                crown_differential: record.crown_differential(),
                crown_share: record.crown_share(),
                category,
                record,
            }
        })
        .collect();

    Ok(Json(StandingsResponse { player: tag, rivals }))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Path(raw_tag): Path<String>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let tag = PlayerTag::normalize(&raw_tag)?;
    let thresholds = state.config.leaderboard;

    let records = aggregated(&state, &tag)?;

    Ok(Json(LeaderboardResponse {
        player: tag,
        thresholds,
        leaderboard: classify_records(&records, &thresholds),
    }))
}

pub async fn matches(
    State(state): State<AppState>,
    Path(raw_tag): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<MatchesResponse>, ApiError> {
    let tag = PlayerTag::normalize(&raw_tag)?;
    let all = read_matches(&state.storage)?;

    let matches = player_history(&all, &tag, query.resolve())
        .into_iter()
        .filter_map(|m| MatchView::from_perspective(m, &tag))
        .collect();

    Ok(Json(MatchesResponse {
        player: tag,
        matches,
    }))
}

pub async fn feed(
    State(state): State<AppState>,
    Path(raw_tag): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<FeedResponse>, ApiError> {
    let tag = PlayerTag::normalize(&raw_tag)?;
    let all = read_matches(&state.storage)?;
    let roster = read_roster(&state.storage, &tag)?;

    let matches = circle_feed(&all, &tag, &roster, query.resolve())
        .map_err(ApiError::corrupt_data)?
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(FeedResponse {
        player: tag,
        matches,
    }))
}

pub async fn summary(
    State(state): State<AppState>,
    Path(raw_tag): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let tag = PlayerTag::normalize(&raw_tag)?;
    let all = read_matches(&state.storage)?;

    Ok(Json(SummaryResponse {
        summary: PlayerSummary::from_matches(&all, &tag),
        player: tag,
    }))
}
