use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

use super::extract_bearer_token;
use crate::{
    api::response::{ApiResponse, error_response},
    auth::state::AuthState,
};

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile of the authenticated account", body = ApiResponse),
        (status = 401, description = "Missing access token", body = ApiResponse),
        (status = 403, description = "Invalid or expired token", body = ApiResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn profile(headers: HeaderMap, state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let bearer = extract_bearer_token(&headers);

    match state.authenticate(bearer.as_deref()).await {
        Ok(account) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(
                "User profile retrieved successfully",
                json!({ "user": account }),
            )),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}
