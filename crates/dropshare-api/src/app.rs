//! Application builder: wires configuration, stores, services and the
//! reaper into a running server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;

use dropshare_auth::ShareTokenIssuer;
use dropshare_core::config::AppConfig;
use dropshare_core::error::AppError;
use dropshare_database::connect_store;
use dropshare_service::{LifecycleSettings, ShareLifecycleManager, notifier_from_config};
use dropshare_storage::LocalStorageProvider;
use dropshare_worker::{Reaper, ReaperScheduler};

use crate::router::build_router;
use crate::state::AppState;

/// Everything the server and the admin CLI need.
#[derive(Debug, Clone)]
pub struct AppComponents {
    /// Shared handler state.
    pub state: AppState,
    /// The sweep over all shares.
    pub reaper: Arc<Reaper>,
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Construct every component from configuration.
pub async fn build_components(config: AppConfig) -> Result<AppComponents, AppError> {
    // ── Step 1: Create data directories ──────────────────────────
    create_data_directories(&config).await?;

    // ── Step 2: Metadata store ───────────────────────────────────
    tracing::info!(backend = %config.database.backend, "Opening share store...");
    let store = connect_store(&config).await?;

    // ── Step 3: Payload storage ──────────────────────────────────
    let storage = Arc::new(LocalStorageProvider::new(config.storage.uploads_path()).await?);
    tracing::info!(root = %storage.root().display(), "Payload storage ready");

    // ── Step 4: Access tokens ────────────────────────────────────
    let tokens = Arc::new(ShareTokenIssuer::new(&config.auth));

    // ── Step 5: Notifications ────────────────────────────────────
    let notifier = notifier_from_config(&config.notification);

    // ── Step 6: Lifecycle manager ────────────────────────────────
    let lifecycle = ShareLifecycleManager::new(
        store,
        storage,
        tokens,
        notifier,
        LifecycleSettings::from_config(&config),
    );

    // ── Step 7: Reaper ───────────────────────────────────────────
    let reaper = Arc::new(Reaper::new(
        lifecycle.clone(),
        config.worker.orphan_grace_minutes,
    ));

    Ok(AppComponents {
        state: AppState::new(Arc::new(config), lifecycle),
        reaper,
    })
}

/// Runs the DropShare server until Ctrl+C / SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DropShare server...");

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let worker_config = config.worker.clone();

    let AppComponents { state, reaper } = build_components(config).await?;

    // ── Step 8: Reaper schedule ──────────────────────────────────
    let mut scheduler = if worker_config.enabled {
        let scheduler = ReaperScheduler::new(Arc::clone(&reaper), &worker_config).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Periodic reaper disabled; shares are reaped on access only");
        None
    };

    // ── Step 9: Build and start HTTP server ──────────────────────
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("DropShare server listening on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = shutdown_tx.send(true);
            })
            .await
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Open connections outlived the shutdown grace period; closing them"
            );
        }
    }

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Reaper scheduler did not shut down cleanly");
        }
    }

    tracing::info!("DropShare server stopped");
    Ok(())
}

async fn create_data_directories(config: &AppConfig) -> Result<(), AppError> {
    let dirs = [config.storage.uploads_path(), config.storage.shares_path()];

    for dir in &dirs {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::internal(format!("Failed to create dir '{}': {}", dir.display(), e))
        })?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
