//! Typed path parameter helpers.

use dropshare_core::{AppError, ShareId};

/// Parses a share id from a path segment.
///
/// Malformed ids are reported as `NotFound`, like unknown ones.
pub fn parse_share_id(s: &str) -> Result<ShareId, AppError> {
    ShareId::parse(s)
}

/// Parses a file index from a path segment.
pub fn parse_file_index(s: &str) -> Result<usize, AppError> {
    s.parse::<usize>()
        .map_err(|_| AppError::out_of_range(format!("No file at index {s}")))
}
