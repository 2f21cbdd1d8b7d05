pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::{get, patch, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::config::ServiceConfig;
use crate::models::ResourceKind;
use crate::services::{
    AuthService, ResourceService, Store, TagService, TaskService, TempTokenStore,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::generate_temp_token,
        handlers::auth::login_with_temp_token,
        handlers::users::list_users,
        handlers::users::change_password,
        handlers::users::update_settings,
        handlers::resources::list_resources,
        handlers::resources::create_resource,
        handlers::resources::update_resource,
        handlers::resources::delete_resource,
        handlers::resources::verify_password,
        handlers::resources::revoke_access,
        handlers::resources::reorder_resources,
        handlers::resources::resource_users,
        handlers::tasks::list_tasks,
        handlers::tasks::list_tasks_in_list,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::update_task_tags,
        handlers::tasks::move_task,
        handlers::tasks::reorder_tasks,
        handlers::tasks::delete_task,
        handlers::tasks::delete_completed_tasks,
        handlers::tasks::list_preset_tasks,
        handlers::tasks::create_preset_task,
        handlers::tasks::update_preset_task,
        handlers::tasks::delete_preset_task,
        handlers::tasks::reset_preset_tasks,
        handlers::tasks::reorder_preset_tasks,
        handlers::tags::list_tags,
        handlers::tags::create_tag,
        handlers::tags::assign_tag_to_task,
        handlers::tags::assign_tag_to_note,
        handlers::tags::update_tag_color,
        handlers::tags::reorder_tags,
        handlers::tags::delete_tag,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::MutationResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::RegisterResponse,
            dtos::auth::LoginRequest,
            dtos::auth::AuthResponse,
            dtos::auth::ChangePasswordRequest,
            dtos::auth::UpdateSettingsRequest,
            dtos::auth::SettingsResponse,
            dtos::auth::TempTokenRequest,
            dtos::auth::TempTokenResponse,
            dtos::auth::TempTokenLoginRequest,
            dtos::resources::CreateResourceRequest,
            dtos::resources::UpdateResourceRequest,
            dtos::resources::DeleteResourceRequest,
            dtos::resources::VerifyPasswordRequest,
            dtos::resources::VerifyPasswordResponse,
            dtos::resources::RevokeAccessRequest,
            dtos::resources::ReorderItem,
            dtos::resources::ReorderRequest,
            dtos::resources::ResourceResponse,
            dtos::resources::UpdateResourceResponse,
            dtos::tasks::CreateTaskRequest,
            dtos::tasks::UpdateTaskRequest,
            dtos::tasks::UpdateTaskTagsRequest,
            dtos::tasks::MoveTaskRequest,
            dtos::tasks::TaskReorderItem,
            dtos::tasks::TaskReorderRequest,
            dtos::tasks::DeleteCompletedRequest,
            dtos::tasks::AssigneeInfo,
            dtos::tasks::TaskResponse,
            dtos::tasks::CreatePresetTaskRequest,
            dtos::tasks::UpdatePresetTaskRequest,
            dtos::tasks::PresetTaskResponse,
            dtos::tags::CreateTagRequest,
            dtos::tags::AssignTagRequest,
            dtos::tags::UpdateTagColorRequest,
            dtos::tags::TagReorderItem,
            dtos::tags::TagReorderRequest,
            dtos::tags::TagResponse,
            models::PrivacyLevel,
            models::UserResponse,
            models::UserSettings,
        )
    ),
    tags(
        (name = "Authentication", description = "Accounts and login tokens"),
        (name = "Users", description = "User profiles and settings"),
        (name = "Resources", description = "Privacy-guarded lists, presets and notes (identical surface under /lists, /presets and /notes)"),
        (name = "Tasks", description = "Tasks and the inbox"),
        (name = "Preset Tasks", description = "Template tasks inside presets"),
        (name = "Tags", description = "Global tag palette"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub store: Arc<dyn Store>,
    pub auth_service: AuthService,
    pub lists: ResourceService,
    pub presets: ResourceService,
    pub notes: ResourceService,
    pub task_service: TaskService,
    pub tag_service: TagService,
}

impl AppState {
    pub fn new(config: ServiceConfig, store: Arc<dyn Store>) -> Self {
        let tokens = TempTokenStore::new();
        let lists = ResourceService::new(store.clone(), ResourceKind::List);
        let presets = ResourceService::new(store.clone(), ResourceKind::Preset);
        let notes = ResourceService::new(store.clone(), ResourceKind::Note);
        let task_service = TaskService::new(store.clone(), lists.clone());
        let tag_service = TagService::new(store.clone());
        let auth_service = AuthService::new(store.clone(), tokens);

        Self {
            config,
            store,
            auth_service,
            lists,
            presets,
            notes,
            task_service,
            tag_service,
        }
    }
}

/// One handler set serves all three guarded resource kinds; each mount gets
/// its own kind-bound service as state.
fn resource_routes(prefix: &str, svc: ResourceService) -> Router {
    Router::new()
        .route(
            prefix,
            get(handlers::resources::list_resources).post(handlers::resources::create_resource),
        )
        .route(
            &format!("{prefix}/reorder"),
            post(handlers::resources::reorder_resources),
        )
        .route(
            &format!("{prefix}/:id"),
            patch(handlers::resources::update_resource)
                .delete(handlers::resources::delete_resource),
        )
        .route(
            &format!("{prefix}/:id/verify-password"),
            post(handlers::resources::verify_password),
        )
        .route(
            &format!("{prefix}/:id/revoke-access"),
            post(handlers::resources::revoke_access),
        )
        .route(
            &format!("{prefix}/:id/users"),
            get(handlers::resources::resource_users),
        )
        .with_state(svc)
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Accounts
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/token", post(handlers::auth::generate_temp_token))
        .route(
            "/auth/token/login",
            post(handlers::auth::login_with_temp_token),
        )
        .route("/users", get(handlers::users::list_users))
        .route(
            "/users/:user_id/password",
            post(handlers::users::change_password),
        )
        .route(
            "/users/:user_id/settings",
            patch(handlers::users::update_settings),
        )
        // Tasks
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route("/tasks/list", get(handlers::tasks::list_tasks_in_list))
        .route("/tasks/reorder", post(handlers::tasks::reorder_tasks))
        .route(
            "/tasks/completed/delete",
            post(handlers::tasks::delete_completed_tasks),
        )
        .route(
            "/tasks/:id",
            patch(handlers::tasks::update_task).delete(handlers::tasks::delete_task),
        )
        .route(
            "/tasks/:id/tags",
            axum::routing::put(handlers::tasks::update_task_tags),
        )
        .route("/tasks/:id/move", post(handlers::tasks::move_task))
        .route(
            "/tasks/:id/tags/assign",
            post(handlers::tags::assign_tag_to_task),
        )
        // Preset tasks
        .route(
            "/presets/:id/tasks",
            get(handlers::tasks::list_preset_tasks).post(handlers::tasks::create_preset_task),
        )
        .route(
            "/presets/:id/tasks/reset",
            post(handlers::tasks::reset_preset_tasks),
        )
        .route(
            "/preset-tasks/reorder",
            post(handlers::tasks::reorder_preset_tasks),
        )
        .route(
            "/preset-tasks/:id",
            patch(handlers::tasks::update_preset_task)
                .delete(handlers::tasks::delete_preset_task),
        )
        // Tags
        .route(
            "/tags",
            get(handlers::tags::list_tags).post(handlers::tags::create_tag),
        )
        .route("/tags/reorder", post(handlers::tags::reorder_tags))
        .route(
            "/tags/:name",
            axum::routing::delete(handlers::tags::delete_tag),
        )
        .route(
            "/tags/:name/color",
            axum::routing::put(handlers::tags::update_tag_color),
        )
        .route(
            "/notes/:id/tags/assign",
            post(handlers::tags::assign_tag_to_note),
        )
        .with_state(state.clone());

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .map(|o| {
                    o.parse::<axum::http::HeaderValue>().unwrap_or_else(|e| {
                        tracing::error!("Invalid CORS origin '{}': {}. Using fallback.", o, e);
                        axum::http::HeaderValue::from_static("*")
                    })
                })
                .collect::<Vec<axum::http::HeaderValue>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    api.merge(resource_routes("/lists", state.lists.clone()))
        .merge(resource_routes("/presets", state.presets.clone()))
        .merge(resource_routes("/notes", state.notes.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Service is unhealthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Storage health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": state.config.service_name,
            "version": state.config.service_version,
            "checks": {
                "database": "up"
            }
        })),
    ))
}
