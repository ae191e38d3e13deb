//! HTTP handlers for credit applications

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::CreditApplication;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::application::{
    ApplicationService, CreateApplicationInput, UpdateApplicationInput,
};
use crate::AppState;

/// List the current farmer's applications
pub async fn list_applications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<CreditApplication>>> {
    let service = ApplicationService::new(state.db);
    let applications = service.list_applications(current_user.farmer_id()).await?;
    Ok(Json(applications))
}

/// File a new application
pub async fn create_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateApplicationInput>,
) -> AppResult<(StatusCode, Json<CreditApplication>)> {
    let service = ApplicationService::new(state.db);
    let application = service
        .create_application(current_user.farmer_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn get_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> AppResult<Json<CreditApplication>> {
    let service = ApplicationService::new(state.db);
    let application = service
        .get_application(current_user.farmer_id(), application_id)
        .await?;
    Ok(Json(application))
}

pub async fn update_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
    Json(input): Json<UpdateApplicationInput>,
) -> AppResult<Json<CreditApplication>> {
    let service = ApplicationService::new(state.db);
    let application = service
        .update_application(current_user.farmer_id(), application_id, input)
        .await?;
    Ok(Json(application))
}

/// Withdraw an application
pub async fn delete_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ApplicationService::new(state.db);
    service
        .delete_application(current_user.farmer_id(), application_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
