//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use dropshare_core::config::AppConfig;
use dropshare_service::ShareLifecycleManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Services ─────────────────────────────────────────────
    /// Share lifecycle manager (store and payload storage hang off it)
    pub lifecycle: ShareLifecycleManager,

    // ── Runtime ──────────────────────────────────────────────
    /// Process start, for the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: Arc<AppConfig>, lifecycle: ShareLifecycleManager) -> Self {
        Self {
            config,
            lifecycle,
            started_at: Instant::now(),
        }
    }
}
