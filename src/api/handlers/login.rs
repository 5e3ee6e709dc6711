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
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse),
        (status = 400, description = "Validation failed or wrong auth method", body = ApiResponse),
        (status = 401, description = "Invalid email or password", body = ApiResponse),
        (status = 403, description = "Email not verified yet", body = ApiResponse),
        (status = 429, description = "Too many authentication attempts", body = ApiResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload().into_response();
    };

    let client_ip = extract_client_ip(&headers);
    if state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::Login)
        == RateLimitDecision::Limited
    {
        return rate_limited(RateLimitAction::Login).into_response();
    }

    match state.login(&request.email, &request.password).await {
        Ok(session) => {
            let data = json!({ "token": session.token, "user": session.account });
            (
                StatusCode::OK,
                Json(ApiResponse::with_data("Login successful", data)),
            )
                .into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}
