//! Convenience result type alias for DropShare.

use crate::error::AppError;

/// A specialized `Result` type for DropShare operations.
pub type AppResult<T> = Result<T, AppError>;
