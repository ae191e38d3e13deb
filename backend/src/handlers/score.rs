//! HTTP handlers for score history

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{HistoryWindow, ScoreSnapshot};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::AppState;

/// Latest snapshot, `null` for a farmer who has never been evaluated
pub async fn get_latest_score(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Option<ScoreSnapshot>>> {
    let latest = state
        .history()
        .get_latest_score(current_user.farmer_id())
        .await?;
    Ok(Json(latest))
}

/// Query parameters for score history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// Most recent snapshots, oldest first
pub async fn get_score_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<ScoreSnapshot>>> {
    let window = HistoryWindow::new(query.limit.unwrap_or(state.config.scoring.history_limit));
    let history = state
        .history()
        .get_score_history(current_user.farmer_id(), window)
        .await?;
    Ok(Json(history))
}
