//! HTTP surface: router, middleware layers, and server startup.

use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use utoipa::OpenApi;

use crate::{
    auth::{
        rate_limit::FixedWindowRateLimiter,
        state::{AuthConfig, AuthState},
    },
    mail::LogMailer,
    store::postgres::PgStore,
};

pub mod handlers;
pub mod response;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::signup::signup,
        handlers::login::login,
        handlers::verify_otp::verify_otp,
        handlers::resend_otp::resend_otp,
        handlers::profile::profile,
    ),
    components(schemas(
        handlers::health::Health,
        handlers::signup::SignupRequest,
        handlers::login::LoginRequest,
        handlers::verify_otp::VerifyOtpRequest,
        handlers::resend_otp::ResendOtpRequest,
        response::ApiResponse,
        crate::store::PublicAccount,
    )),
    tags(
        (name = "konto", description = "Note taking app account API")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, config: AuthConfig) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let state = Arc::new(AuthState::new(
        config,
        Arc::new(PgStore::new(pool)),
        Arc::new(LogMailer),
        Arc::new(FixedWindowRateLimiter::new()),
    ));

    serve(port, state).await
}

/// Bind and serve with the given state. Split from [`new`] so tests can run
/// the router against an in-memory store.
pub async fn serve(port: u16, state: Arc<AuthState>) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

#[must_use]
pub fn router(state: Arc<AuthState>) -> Router {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/", get(|| async { "📝" }))
        .route("/signup", post(handlers::signup::signup))
        .route("/login", post(handlers::login::login))
        .route("/verify-otp", post(handlers::verify_otp::verify_otp))
        .route("/resend-otp", post(handlers::resend_otp::resend_otp))
        .route("/profile", get(handlers::profile::profile))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(state.clone())),
        )
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .layer(Extension(state))
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_every_route() {
        let doc = openapi();
        let paths = doc.paths.paths;
        for path in [
            "/signup",
            "/login",
            "/verify-otp",
            "/resend-otp",
            "/profile",
            "/health",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
