//! User profile handlers: listing, password changes and settings.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::dtos::auth::{ChangePasswordRequest, SettingsResponse, UpdateSettingsRequest};
use crate::dtos::{ErrorResponse, MutationResponse};
use crate::models::UserResponse;
use crate::utils::ValidatedJson;
use crate::AppState;

/// All users, sanitized (for assignee pickers)
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Sanitized users", body = [UserResponse])
    ),
    tag = "Users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.auth_service.list_users().await?;
    Ok(Json(users))
}

/// Change the account password
#[utoipa::path(
    post,
    path = "/users/{user_id}/password",
    params(("user_id" = Uuid, Path, description = "User id")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Change outcome", body = MutationResponse)
    ),
    tag = "Users"
)]
pub async fn change_password(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    match state.auth_service.change_password(user_id, req).await {
        Ok(()) => Ok(Json(MutationResponse {
            success: true,
            message: Some("Password updated successfully.".to_string()),
        })),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok(Json(MutationResponse::failure(message)))
        }
    }
}

/// Merge a partial settings document into the stored one
#[utoipa::path(
    patch,
    path = "/users/{user_id}/settings",
    params(("user_id" = Uuid, Path, description = "User id")),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Merged settings", body = SettingsResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state
        .auth_service
        .update_settings(user_id, &req.settings)
        .await?;
    Ok(Json(SettingsResponse {
        success: true,
        settings,
    }))
}
