//! # dropshare-api
//!
//! HTTP API layer for DropShare built on Axum.
//!
//! Provides the upload, inspect, verify and download endpoints, the
//! credential extractor, middleware (CORS, request logging), DTOs, error
//! mapping, and the bootstrap that wires every component together.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{AppComponents, build_app, build_components, run_server};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
