//! HTTP handlers for farmer profiles

use axum::{extract::State, http::StatusCode, Json};
use shared::FarmerProfile;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::profile::{CreateProfileInput, ProfileService, UpdateProfileInput};
use crate::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<FarmerProfile>> {
    let service = ProfileService::new(state.db);
    Ok(Json(service.get_profile(current_user.farmer_id()).await?))
}

pub async fn create_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProfileInput>,
) -> AppResult<(StatusCode, Json<FarmerProfile>)> {
    let service = ProfileService::new(state.db);
    let profile = service.create_profile(current_user.farmer_id(), input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<FarmerProfile>> {
    let service = ProfileService::new(state.db);
    Ok(Json(service.update_profile(current_user.farmer_id(), input).await?))
}
