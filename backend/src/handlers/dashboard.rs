//! HTTP handler for the farmer dashboard

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::{Dashboard, DashboardService};
use crate::AppState;

pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Dashboard>> {
    let service = DashboardService::new(
        state.history(),
        state.weather.clone(),
        state.history_window(),
    );
    let dashboard = service.get_dashboard(current_user.farmer_id()).await?;
    Ok(Json(dashboard))
}
