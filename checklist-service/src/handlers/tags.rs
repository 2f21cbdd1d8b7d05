//! Tag handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::dtos::tags::{
    AssignTagRequest, CreateTagRequest, TagReorderRequest, TagResponse, UpdateTagColorRequest,
};
use crate::dtos::{ErrorResponse, MutationResponse};
use crate::utils::ValidatedJson;
use crate::AppState;

/// All tags in display order
#[utoipa::path(
    get,
    path = "/tags",
    responses(
        (status = 200, description = "Tags", body = [TagResponse])
    ),
    tag = "Tags"
)]
pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tags = state.tag_service.list().await?;
    Ok(Json(tags))
}

/// Create a tag
#[utoipa::path(
    post,
    path = "/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Tags"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tag = state.tag_service.create(req.name, req.color).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// Create-if-missing and attach a tag to a task
#[utoipa::path(
    post,
    path = "/tasks/{id}/tags/assign",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = AssignTagRequest,
    responses(
        (status = 200, description = "Newly created tag, if any", body = TagResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tags"
)]
pub async fn assign_tag_to_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AssignTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state
        .tag_service
        .assign_to_task(id, req.name, req.color)
        .await?;
    Ok(Json(created))
}

/// Create-if-missing and attach a tag to a note
#[utoipa::path(
    post,
    path = "/notes/{id}/tags/assign",
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = AssignTagRequest,
    responses(
        (status = 200, description = "Newly created tag, if any", body = TagResponse),
        (status = 404, description = "Note not found", body = ErrorResponse)
    ),
    tag = "Tags"
)]
pub async fn assign_tag_to_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AssignTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state
        .tag_service
        .assign_to_note(id, req.name, req.color)
        .await?;
    Ok(Json(created))
}

/// Recolor a tag
#[utoipa::path(
    put,
    path = "/tags/{name}/color",
    params(("name" = String, Path, description = "Tag name")),
    request_body = UpdateTagColorRequest,
    responses(
        (status = 200, description = "Updated tag", body = TagResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    tag = "Tags"
)]
pub async fn update_tag_color(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<UpdateTagColorRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tag = state.tag_service.update_color(&name, &req.color).await?;
    Ok(Json(tag))
}

/// Persist a new tag order
#[utoipa::path(
    post,
    path = "/tags/reorder",
    request_body = TagReorderRequest,
    responses(
        (status = 200, description = "Reorder outcome", body = MutationResponse)
    ),
    tag = "Tags"
)]
pub async fn reorder_tags(
    State(state): State<AppState>,
    Json(req): Json<TagReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.tag_service.reorder(&req.items).await?;
    Ok(Json(MutationResponse::ok()))
}

/// Delete a tag, stripping it from every task
#[utoipa::path(
    delete,
    path = "/tags/{name}",
    params(("name" = String, Path, description = "Tag name")),
    responses(
        (status = 200, description = "Delete outcome", body = MutationResponse)
    ),
    tag = "Tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.tag_service.delete(&name).await?;
    Ok(Json(MutationResponse::ok()))
}
