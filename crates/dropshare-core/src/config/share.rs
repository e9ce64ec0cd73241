//! Share policy defaults.

use serde::{Deserialize, Serialize};

/// Defaults and bounds applied when a share is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Lifetime used when the uploader does not pick one, in hours.
    #[serde(default = "default_ttl_hours")]
    pub default_ttl_hours: f64,
    /// Longest lifetime an uploader may request, in hours.
    #[serde(default = "default_max_ttl_hours")]
    pub max_ttl_hours: f64,
    /// Download limit used when the uploader does not pick one (0 = unlimited).
    #[serde(default)]
    pub default_max_downloads: u32,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_ttl_hours: default_ttl_hours(),
            max_ttl_hours: default_max_ttl_hours(),
            default_max_downloads: 0,
        }
    }
}

fn default_ttl_hours() -> f64 {
    24.0
}

fn default_max_ttl_hours() -> f64 {
    720.0
}
