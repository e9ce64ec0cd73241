//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ComponentHealth, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.lifecycle.store();
    let storage = state.lifecycle.storage();

    let store_healthy = store.health_check().await.unwrap_or(false);
    let storage_healthy = storage.health_check().await.unwrap_or(false);
    let healthy = store_healthy && storage_healthy;

    let status = if healthy {
        StatusCode::OK
    } else {
        tracing::warn!(store_healthy, storage_healthy, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            store: ComponentHealth {
                backend: store.backend().to_string(),
                healthy: store_healthy,
            },
            storage: ComponentHealth {
                backend: storage.provider_type().to_string(),
                healthy: storage_healthy,
            },
        }),
    )
}
