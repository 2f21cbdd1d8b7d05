use service_core::error::AppError;
use thiserror::Error;

/// Domain failure taxonomy. Business failures surface to callers as
/// `{ success: false, message }` bodies; `Database`/`Internal` are faults and
/// propagate as HTTP 5xx.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("{0} not found.")]
    NotFound(&'static str),

    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    #[error("Incorrect password.")]
    InvalidCredential,

    #[error("Incorrect current password.")]
    IncorrectCurrentPassword,

    #[error("Invalid credentials.")]
    InvalidLogin,

    #[error("User not authenticated.")]
    Unauthenticated,

    #[error("Token is invalid or has expired.")]
    TokenInvalid,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),
}

impl ServiceError {
    /// Splits faults from business failures: faults bubble up as `AppError`,
    /// everything else becomes a caller-facing failure message.
    pub fn into_failure_message(self) -> Result<String, AppError> {
        match self {
            ServiceError::Database(_) | ServiceError::Internal(_) => Err(self.into()),
            other => Ok(other.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::NotFound(what) => {
                AppError::NotFound(anyhow::anyhow!("{} not found", what))
            }
            ServiceError::PermissionDenied => {
                AppError::Forbidden(anyhow::anyhow!("Permission denied"))
            }
            ServiceError::InvalidCredential | ServiceError::IncorrectCurrentPassword => {
                AppError::AuthError(anyhow::anyhow!("Incorrect password"))
            }
            ServiceError::InvalidLogin => AppError::AuthError(anyhow::anyhow!("Invalid credentials")),
            ServiceError::Unauthenticated => {
                AppError::Unauthorized(anyhow::anyhow!("User not authenticated"))
            }
            ServiceError::TokenInvalid => {
                AppError::BadRequest(anyhow::anyhow!("Token is invalid or has expired"))
            }
            ServiceError::Validation(e) => AppError::BadRequest(anyhow::anyhow!(e)),
            ServiceError::Conflict(e) => AppError::Conflict(anyhow::anyhow!(e)),
        }
    }
}
