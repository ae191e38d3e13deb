//! HTTP handler for regional weather

use axum::{
    extract::{Path, State},
    Json,
};
use shared::RegionalWeather;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::AppState;

/// Current conditions and forecast for a region (north, south, east, west)
pub async fn get_regional_weather(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(region): Path<String>,
) -> AppResult<Json<RegionalWeather>> {
    let weather = state.weather.get_regional_weather(&region).await?;
    Ok(Json(weather))
}
