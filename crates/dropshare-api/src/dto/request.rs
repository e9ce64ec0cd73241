//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use dropshare_core::AppError;
use dropshare_service::CreateShareOptions;

/// Password verification request body.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct VerifyPasswordRequest {
    /// Share password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for VerifyPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyPasswordRequest").finish_non_exhaustive()
    }
}

/// Text fields of the upload form, collected while the files stream in.
#[derive(Debug, Clone, Default)]
pub struct UploadFormFields {
    /// `ttlHours` (or legacy `expiryHours`).
    pub ttl_hours: Option<String>,
    /// `maxDownloads`.
    pub max_downloads: Option<String>,
    /// `password`.
    pub password: Option<String>,
}

impl UploadFormFields {
    /// Record a text field. Returns `false` for unknown field names.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "ttlHours" | "expiryHours" => &mut self.ttl_hours,
            "maxDownloads" => &mut self.max_downloads,
            "password" => &mut self.password,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Parse the collected fields. Blank values fall back to defaults.
    pub fn into_options(self) -> Result<CreateShareOptions, AppError> {
        let ttl_hours = match blank_to_none(self.ttl_hours) {
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
                AppError::validation(format!("ttlHours must be a number, got {raw:?}"))
            })?),
            None => None,
        };
        let max_downloads = match blank_to_none(self.max_downloads) {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                AppError::validation(format!(
                    "maxDownloads must be a non-negative integer, got {raw:?}"
                ))
            })?),
            None => None,
        };
        Ok(CreateShareOptions {
            ttl_hours,
            max_downloads,
            password: self.password,
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
