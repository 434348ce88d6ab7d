//! Route definitions for the FocusFlow API
//!
//! This module organizes all API routes and applies middleware. Paths
//! mirror the dashboard's expectations: /auth/*, /notify/*, /health*.

use crate::middleware::{general_rate_limit, security_headers};
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod health;
mod notify;

#[cfg(test)]
mod auth_tests;
#[cfg(test)]
mod notify_tests;

pub use auth::auth_routes;
pub use notify::notify_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let frontend_origin = state
        .config()
        .cors
        .frontend_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173"));

    Router::new()
        .route("/", get(|| async { "FocusFlow API" }))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/auth", auth::auth_routes(state.clone()))
        .nest("/notify", notify::notify_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            // Credentialed CORS for the configured dashboard origin
            CorsLayer::new()
                .allow_origin(frontend_origin)
                .allow_credentials(true)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            general_rate_limit,
        ))
        // Outside the limiter so 429s carry the headers too
        .layer(middleware::from_fn(security_headers))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
