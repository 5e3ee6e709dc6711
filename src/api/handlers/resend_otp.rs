use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::{extract_client_ip, missing_payload, rate_limited};
use crate::{
    api::response::{ApiResponse, error_response},
    auth::{
        rate_limit::{RateLimitAction, RateLimitDecision, RateLimiter},
        state::AuthState,
    },
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendOtpRequest {
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/resend-otp",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "A fresh code was sent", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 404, description = "No unverified account for this email", body = ApiResponse),
        (status = 429, description = "Too many OTP requests", body = ApiResponse),
        (status = 500, description = "Delivery failed", body = ApiResponse),
    ),
    tag = "auth"
)]
pub async fn resend_otp(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResendOtpRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload().into_response();
    };

    let client_ip = extract_client_ip(&headers);
    if state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::Otp)
        == RateLimitDecision::Limited
    {
        return rate_limited(RateLimitAction::Otp).into_response();
    }

    match state.resend_otp(&request.email).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok("OTP sent successfully to your email")),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}
