use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::services::AuthError;

pub const WEAK_PASSWORD_MESSAGE: &str = "Password should have at least one uppercase letter, \
     one lowercase letter, one number, and one special character.";
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email is already in use.";
pub const NOT_FOUND_MESSAGE: &str = "User not found";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Wrong password or username!";
pub const REGISTRATION_FAILED_MESSAGE: &str = "Error registering the user";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// HTTP-facing error. Renders `{ "message": ... }`, plus `"error"` when a
/// server fault is allowed to carry its cause.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn internal() -> Self {
        ApiError::Internal {
            message: INTERNAL_MESSAGE.to_string(),
            detail: None,
        }
    }

    /// Maps a registration outcome. Infrastructure causes are attached to the
    /// body only when `expose_detail` is set.
    pub fn from_registration(err: AuthError, expose_detail: bool) -> Self {
        if err.is_infrastructure() {
            return ApiError::Internal {
                message: REGISTRATION_FAILED_MESSAGE.to_string(),
                detail: expose_detail.then(|| err.to_string()),
            };
        }
        err.into()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingField(field) => ApiError::BadRequest(format!("{field} is required")),
            AuthError::InvalidEmail => {
                ApiError::BadRequest("Please fill a valid email address".to_string())
            }
            AuthError::WeakPassword => ApiError::BadRequest(WEAK_PASSWORD_MESSAGE.to_string()),
            AuthError::DuplicateEmail => ApiError::BadRequest(DUPLICATE_EMAIL_MESSAGE.to_string()),
            AuthError::AccountNotFound => ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()),
            AuthError::InvalidCredentials => {
                ApiError::BadRequest(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            AuthError::Store(_) | AuthError::Hasher(_) | AuthError::Token(_) => {
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "message": message })),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "message": message })),
            ApiError::Internal { message, detail } => {
                let body = match detail {
                    Some(detail) => json!({ "message": message, "error": detail }),
                    None => json!({ "message": message }),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(body)).into_response()
    }
}
