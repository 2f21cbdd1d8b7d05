//! Handlers for the three privacy-guarded resource surfaces.
//!
//! One handler set serves `/lists`, `/presets` and `/notes`; the router mounts
//! it three times with a kind-specific [`ResourceService`] as state. Business
//! failures come back as `{ success: false, message }` bodies; storage faults
//! surface as 5xx.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::dtos::resources::{
    CreateResourceRequest, DeleteResourceRequest, ListResourcesQuery, ReorderRequest,
    ResourceResponse, RevokeAccessRequest, UpdateResourceRequest, UpdateResourceResponse,
    VerifyPasswordRequest, VerifyPasswordResponse,
};
use crate::dtos::{ErrorResponse, MutationResponse};
use crate::models::UserResponse;
use crate::services::ResourceService;
use crate::utils::ValidatedJson;

/// List resources visible to the caller
#[utoipa::path(
    get,
    path = "/lists",
    params(ListResourcesQuery),
    responses(
        (status = 200, description = "Resources with computed access flags", body = [ResourceResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Resources"
)]
pub async fn list_resources(
    State(svc): State<ResourceService>,
    Query(query): Query<ListResourcesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let resources = svc.list(query.user_id, query.hide_locked).await?;
    Ok(Json(resources))
}

/// Create a resource
#[utoipa::path(
    post,
    path = "/lists",
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Resource created", body = UpdateResourceResponse),
        (status = 200, description = "Rejected with a failure message", body = UpdateResourceResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Resources"
)]
pub async fn create_resource(
    State(svc): State<ResourceService>,
    ValidatedJson(req): ValidatedJson<CreateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    match svc.create(req).await {
        Ok(resource) => Ok((
            StatusCode::CREATED,
            Json(UpdateResourceResponse::ok(resource)),
        )),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok((
                StatusCode::OK,
                Json(UpdateResourceResponse::failure(message)),
            ))
        }
    }
}

/// Update a resource, including privacy transitions
#[utoipa::path(
    patch,
    path = "/lists/{id}",
    params(("id" = Uuid, Path, description = "Resource id")),
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Update outcome", body = UpdateResourceResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Resources"
)]
pub async fn update_resource(
    State(svc): State<ResourceService>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    match svc.update(id, req).await {
        Ok(resource) => Ok(Json(UpdateResourceResponse::ok(resource))),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok(Json(UpdateResourceResponse::failure(message)))
        }
    }
}

/// Delete a resource; private resources demand their password
#[utoipa::path(
    delete,
    path = "/lists/{id}",
    params(("id" = Uuid, Path, description = "Resource id")),
    request_body = DeleteResourceRequest,
    responses(
        (status = 200, description = "Delete outcome", body = MutationResponse)
    ),
    tag = "Resources"
)]
pub async fn delete_resource(
    State(svc): State<ResourceService>,
    Path(id): Path<Uuid>,
    Json(req): Json<DeleteResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    match svc.delete(id, req.password.as_deref(), req.user_id).await {
        Ok(()) => Ok(Json(MutationResponse::ok())),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok(Json(MutationResponse::failure(message)))
        }
    }
}

/// Present a password to unlock a private resource
#[utoipa::path(
    post,
    path = "/lists/{id}/verify-password",
    params(("id" = Uuid, Path, description = "Resource id")),
    request_body = VerifyPasswordRequest,
    responses(
        (status = 200, description = "Unlock outcome; failures are indistinguishable", body = VerifyPasswordResponse)
    ),
    tag = "Resources"
)]
pub async fn verify_password(
    State(svc): State<ResourceService>,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifyPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let success = svc.verify_password(id, &req.password, req.user_id).await?;
    Ok(Json(VerifyPasswordResponse { success }))
}

/// Revoke every grant, keeping only the acting user's
#[utoipa::path(
    post,
    path = "/lists/{id}/revoke-access",
    params(("id" = Uuid, Path, description = "Resource id")),
    request_body = RevokeAccessRequest,
    responses(
        (status = 200, description = "Revoke outcome", body = MutationResponse)
    ),
    tag = "Resources"
)]
pub async fn revoke_access(
    State(svc): State<ResourceService>,
    Path(id): Path<Uuid>,
    Json(req): Json<RevokeAccessRequest>,
) -> Result<impl IntoResponse, AppError> {
    match svc.revoke_all(id, req.user_id).await {
        Ok(()) => Ok(Json(MutationResponse::ok())),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok(Json(MutationResponse::failure(message)))
        }
    }
}

/// Persist a new display order
#[utoipa::path(
    post,
    path = "/lists/reorder",
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Reorder outcome", body = MutationResponse)
    ),
    tag = "Resources"
)]
pub async fn reorder_resources(
    State(svc): State<ResourceService>,
    Json(req): Json<ReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    match svc.reorder(&req.items, req.user_id).await {
        Ok(()) => Ok(Json(MutationResponse::ok())),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok(Json(MutationResponse::failure(message)))
        }
    }
}

/// Users who may be assigned within the resource
#[utoipa::path(
    get,
    path = "/lists/{id}/users",
    params(("id" = Uuid, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Users with access", body = [UserResponse])
    ),
    tag = "Resources"
)]
pub async fn resource_users(
    State(svc): State<ResourceService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let users = svc.users_with_access(id).await?;
    Ok(Json(users))
}
