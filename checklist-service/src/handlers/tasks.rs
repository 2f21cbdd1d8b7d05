//! Task and preset-task handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::dtos::tasks::{
    CreatePresetTaskRequest, CreateTaskRequest, DeleteCompletedRequest, ListTasksInListQuery,
    ListTasksQuery, MoveTaskRequest, PresetTaskResponse, TaskReorderRequest, TaskResponse,
    UpdatePresetTaskRequest, UpdateTaskRequest, UpdateTaskTagsRequest,
};
use crate::dtos::{ErrorResponse, MutationResponse};
use crate::services::CompletedScope;
use crate::utils::ValidatedJson;
use crate::AppState;

/// Tasks visible to the caller (inbox + accessible lists)
#[utoipa::path(
    get,
    path = "/tasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "Visible tasks", body = [TaskResponse])
    ),
    tag = "Tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tasks = state.task_service.list_for_user(query.user_id).await?;
    Ok(Json(tasks))
}

/// Tasks of one list, or the inbox when `list_id` is absent
#[utoipa::path(
    get,
    path = "/tasks/list",
    params(ListTasksInListQuery),
    responses(
        (status = 200, description = "Tasks of the list", body = [TaskResponse])
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_in_list(
    State(state): State<AppState>,
    Query(query): Query<ListTasksInListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tasks = state.task_service.list_in_list(query.list_id).await?;
    Ok(Json(tasks))
}

/// Create a task
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let task = state.task_service.create(req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Partially update a task; assignment is gated by the list's privacy
#[utoipa::path(
    patch,
    path = "/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Assignment rejected", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let task = state.task_service.update(id, req).await?;
    Ok(Json(task))
}

/// Replace a task's tag strings
#[utoipa::path(
    put,
    path = "/tasks/{id}/tags",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = UpdateTaskTagsRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskTagsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let task = state.task_service.update_tags(id, req.tags).await?;
    Ok(Json(task))
}

/// Move a task to another list or the inbox
#[utoipa::path(
    post,
    path = "/tasks/{id}/move",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = MoveTaskRequest,
    responses(
        (status = 200, description = "Move outcome", body = MutationResponse)
    ),
    tag = "Tasks"
)]
pub async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.task_service.move_to_list(id, req.list_id).await?;
    Ok(Json(MutationResponse::ok()))
}

/// Persist a new task order
#[utoipa::path(
    post,
    path = "/tasks/reorder",
    request_body = TaskReorderRequest,
    responses(
        (status = 200, description = "Reorder outcome", body = MutationResponse)
    ),
    tag = "Tasks"
)]
pub async fn reorder_tasks(
    State(state): State<AppState>,
    Json(req): Json<TaskReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.task_service.reorder(&req.items).await?;
    Ok(Json(MutationResponse::ok()))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Delete outcome", body = MutationResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.task_service.delete(id).await?;
    Ok(Json(MutationResponse::ok()))
}

/// Purge completed tasks (one list, the inbox, or everywhere)
#[utoipa::path(
    post,
    path = "/tasks/completed/delete",
    request_body = DeleteCompletedRequest,
    responses(
        (status = 200, description = "Purge outcome", body = MutationResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_completed_tasks(
    State(state): State<AppState>,
    Json(req): Json<DeleteCompletedRequest>,
) -> Result<impl IntoResponse, AppError> {
    let scope = if req.all {
        CompletedScope::All
    } else {
        match req.list_id {
            Some(list_id) => CompletedScope::List(list_id),
            None => CompletedScope::Inbox,
        }
    };
    state.task_service.delete_completed(scope).await?;
    Ok(Json(MutationResponse::ok()))
}

// ==================== Preset tasks ====================

/// Tasks of a preset
#[utoipa::path(
    get,
    path = "/presets/{preset_id}/tasks",
    params(("preset_id" = Uuid, Path, description = "Preset id")),
    responses(
        (status = 200, description = "Preset tasks", body = [PresetTaskResponse])
    ),
    tag = "Preset Tasks"
)]
pub async fn list_preset_tasks(
    State(state): State<AppState>,
    Path(preset_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tasks = state.task_service.list_preset_tasks(preset_id).await?;
    Ok(Json(tasks))
}

/// Add a task to a preset
#[utoipa::path(
    post,
    path = "/presets/{preset_id}/tasks",
    params(("preset_id" = Uuid, Path, description = "Preset id")),
    request_body = CreatePresetTaskRequest,
    responses(
        (status = 201, description = "Preset task created", body = PresetTaskResponse),
        (status = 404, description = "Preset not found", body = ErrorResponse)
    ),
    tag = "Preset Tasks"
)]
pub async fn create_preset_task(
    State(state): State<AppState>,
    Path(preset_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CreatePresetTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let task = state
        .task_service
        .create_preset_task(preset_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Partially update a preset task
#[utoipa::path(
    patch,
    path = "/preset-tasks/{id}",
    params(("id" = Uuid, Path, description = "Preset task id")),
    request_body = UpdatePresetTaskRequest,
    responses(
        (status = 200, description = "Updated preset task", body = PresetTaskResponse)
    ),
    tag = "Preset Tasks"
)]
pub async fn update_preset_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePresetTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let task = state.task_service.update_preset_task(id, req).await?;
    Ok(Json(task))
}

/// Delete a preset task
#[utoipa::path(
    delete,
    path = "/preset-tasks/{id}",
    params(("id" = Uuid, Path, description = "Preset task id")),
    responses(
        (status = 200, description = "Delete outcome", body = MutationResponse)
    ),
    tag = "Preset Tasks"
)]
pub async fn delete_preset_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.task_service.delete_preset_task(id).await?;
    Ok(Json(MutationResponse::ok()))
}

/// Uncheck every task of the preset
#[utoipa::path(
    post,
    path = "/presets/{preset_id}/tasks/reset",
    params(("preset_id" = Uuid, Path, description = "Preset id")),
    responses(
        (status = 200, description = "Reset outcome", body = MutationResponse)
    ),
    tag = "Preset Tasks"
)]
pub async fn reset_preset_tasks(
    State(state): State<AppState>,
    Path(preset_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.task_service.reset_preset_tasks(preset_id).await?;
    Ok(Json(MutationResponse::ok()))
}

/// Persist a new preset-task order
#[utoipa::path(
    post,
    path = "/preset-tasks/reorder",
    request_body = TaskReorderRequest,
    responses(
        (status = 200, description = "Reorder outcome", body = MutationResponse)
    ),
    tag = "Preset Tasks"
)]
pub async fn reorder_preset_tasks(
    State(state): State<AppState>,
    Json(req): Json<TaskReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.task_service.reorder_preset_tasks(&req.items).await?;
    Ok(Json(MutationResponse::ok()))
}
