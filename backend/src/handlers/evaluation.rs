//! HTTP handlers for farm evaluations

use axum::{extract::State, http::StatusCode, Json};
use shared::{EvaluationForm, ScoreSnapshot};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::evaluation::{EvaluationPreview, EvaluationService};
use crate::AppState;

/// Score and record an evaluation for the current farmer
pub async fn submit_evaluation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(form): Json<EvaluationForm>,
) -> AppResult<(StatusCode, Json<ScoreSnapshot>)> {
    let service = EvaluationService::new(state.history());
    let snapshot = service.submit(current_user.farmer_id(), &form).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Score a form without recording it
pub async fn preview_evaluation(
    _current_user: CurrentUser,
    Json(form): Json<EvaluationForm>,
) -> AppResult<Json<EvaluationPreview>> {
    Ok(Json(EvaluationService::preview(&form)?))
}
