use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
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
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[utoipa::path(
    post,
    path = "/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Email verified, session issued", body = ApiResponse),
        (status = 400, description = "Validation failed or invalid/expired OTP", body = ApiResponse),
        (status = 429, description = "Too many OTP requests", body = ApiResponse),
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
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

    match state.verify_otp(&request.email, &request.otp).await {
        Ok(session) => {
            let data = json!({ "token": session.token, "user": session.account });
            (
                StatusCode::OK,
                Json(ApiResponse::with_data("Email verified successfully", data)),
            )
                .into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}
