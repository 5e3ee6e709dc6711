use axum::{Json, extract::Extension, http::HeaderMap, response::IntoResponse};
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
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, verification code sent", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 409, description = "An account with this email already exists", body = ApiResponse),
        (status = 429, description = "Too many signup attempts", body = ApiResponse),
    ),
    tag = "auth"
)]
pub async fn signup(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignupRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload().into_response();
    };

    let client_ip = extract_client_ip(&headers);
    if state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::Signup)
        == RateLimitDecision::Limited
    {
        return rate_limited(RateLimitAction::Signup).into_response();
    }

    match state
        .register(
            &request.name,
            &request.email,
            &request.date_of_birth,
            &request.password,
        )
        .await
    {
        Ok(registration) => {
            let message = if registration.otp_delivered {
                "User created successfully. Please check your email for OTP verification."
            } else {
                "User created but failed to send OTP email. Please try requesting OTP again."
            };
            let data = json!({
                "userId": registration.account_id,
                "email": registration.email,
                "requiresOTP": true,
            });
            (
                axum::http::StatusCode::CREATED,
                Json(ApiResponse::with_data(message, data)),
            )
                .into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}
