//! The JSON envelope every endpoint returns, and the mapping from
//! [`AuthError`] to HTTP responses.

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;
use utoipa::ToSchema;

use crate::auth::error::AuthError;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ApiResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    #[must_use]
    pub fn with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors: None,
        }
    }
}

/// Map an operation error to status plus envelope. Messages come from the
/// error display impls, so the wire text and the taxonomy cannot drift apart.
pub fn error_response(err: &AuthError) -> (StatusCode, Json<ApiResponse>) {
    let message = err.to_string();
    let (status, response) = match err {
        AuthError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            ApiResponse {
                success: false,
                message,
                data: None,
                errors: Some(errors.clone()),
            },
        ),
        AuthError::Conflict => (StatusCode::CONFLICT, ApiResponse::error(message)),
        AuthError::InvalidOrExpiredOtp | AuthError::WrongAuthMethod => {
            (StatusCode::BAD_REQUEST, ApiResponse::error(message))
        }
        AuthError::NotFound => (StatusCode::NOT_FOUND, ApiResponse::error(message)),
        AuthError::Unauthorized | AuthError::MissingToken => {
            (StatusCode::UNAUTHORIZED, ApiResponse::error(message))
        }
        AuthError::EmailNotVerified { email } => (
            StatusCode::FORBIDDEN,
            ApiResponse {
                success: false,
                message,
                data: Some(json!({ "requiresOTP": true, "email": email })),
                errors: None,
            },
        ),
        AuthError::InvalidToken => (StatusCode::FORBIDDEN, ApiResponse::error(message)),
        AuthError::Delivery => (StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::error(message)),
        AuthError::Internal(inner) => {
            error!("internal error: {inner:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("Internal server error"),
            )
        }
    };
    (status, Json(response))
}
