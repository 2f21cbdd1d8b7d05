//! Account handlers: registration, login and the temp-token exchange.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::dtos::auth::{
    AuthResponse, LoginRequest, RegisterRequest, RegisterResponse, TempTokenLoginRequest,
    TempTokenRequest, TempTokenResponse,
};
use crate::dtos::ErrorResponse;
use crate::utils::ValidatedJson;
use crate::AppState;

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 200, description = "Rejected with a failure message", body = RegisterResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    match state.auth_service.register(req).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                success: true,
                message: "Registration successful!".to_string(),
            }),
        )),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok((
                StatusCode::OK,
                Json(RegisterResponse {
                    success: false,
                    message,
                }),
            ))
        }
    }
}

/// Login with email or username
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login outcome", body = AuthResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    match state.auth_service.login(req).await {
        Ok(user) => Ok(Json(AuthResponse::ok(user))),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok(Json(AuthResponse::failure(message)))
        }
    }
}

/// Mint a 60-second single-use login token
#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = TempTokenRequest,
    responses(
        (status = 200, description = "Token outcome", body = TempTokenResponse)
    ),
    tag = "Authentication"
)]
pub async fn generate_temp_token(
    State(state): State<AppState>,
    Json(req): Json<TempTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    match state.auth_service.generate_temp_login_token(req.user_id).await {
        Ok(token) => Ok(Json(TempTokenResponse {
            success: true,
            token: Some(token),
            message: None,
        })),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok(Json(TempTokenResponse {
                success: false,
                token: None,
                message: Some(message),
            }))
        }
    }
}

/// Exchange a temp token for its account
#[utoipa::path(
    post,
    path = "/auth/token/login",
    request_body = TempTokenLoginRequest,
    responses(
        (status = 200, description = "Login outcome", body = AuthResponse)
    ),
    tag = "Authentication"
)]
pub async fn login_with_temp_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TempTokenLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    match state.auth_service.login_with_temp_token(&req.token).await {
        Ok(user) => Ok(Json(AuthResponse::ok(user))),
        Err(e) => {
            let message = e.into_failure_message()?;
            Ok(Json(AuthResponse::failure(message)))
        }
    }
}
