//! One handler per endpoint, plus small shared helpers.

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};

use crate::api::response::ApiResponse;
use crate::auth::rate_limit::RateLimitAction;

pub mod health;
pub mod login;
pub mod profile;
pub mod resend_otp;
pub mod signup;
pub mod verify_otp;

/// Extract a client IP for rate limiting from common proxy headers.
pub(crate) fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// 429 with the action-specific retry hint.
pub(crate) fn rate_limited(action: RateLimitAction) -> (StatusCode, Json<ApiResponse>) {
    let message = match action {
        RateLimitAction::Signup => "Too many signup attempts. Please try again in an hour.",
        RateLimitAction::Otp => "Too many OTP requests. Please wait 5 minutes before trying again.",
        RateLimitAction::Login => {
            "Too many authentication attempts. Please try again in a minute."
        }
    };
    (StatusCode::TOO_MANY_REQUESTS, Json(ApiResponse::error(message)))
}

pub(crate) fn missing_payload() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error("Missing payload")),
    )
}
