//! Route definitions for the DropShare HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_request = usize::try_from(state.config.storage.max_request_size_bytes)
        .unwrap_or(usize::MAX);

    let api_routes = Router::new()
        .merge(upload_routes())
        .merge(share_routes())
        .merge(download_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_request))
        .layer(
            TraceLayer::new_for_http().make_span_with(middleware::logging::request_span),
        )
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Share creation
fn upload_routes() -> Router<AppState> {
    Router::new().route("/upload", post(handlers::upload::upload))
}

/// Inspect and password verification
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/shares/{share_id}", get(handlers::share::inspect_share))
        .route(
            "/shares/{share_id}/verify",
            post(handlers::share::verify_password),
        )
        // Older clients post here.
        .route(
            "/verify-password/{share_id}",
            post(handlers::share::verify_password),
        )
}

/// Counted downloads
fn download_routes() -> Router<AppState> {
    Router::new().route(
        "/download/{share_id}/{file_index}",
        get(handlers::download::download_file),
    )
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
