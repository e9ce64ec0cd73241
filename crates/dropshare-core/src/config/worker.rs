//! Background reaper configuration.

use serde::{Deserialize, Serialize};

/// Longest accepted orphan grace period: one leap year.
pub const MAX_ORPHAN_GRACE_MINUTES: u64 = 366 * 24 * 60;

/// Reaper scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the periodic reaper runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (with seconds) for sweeps. Hourly by default.
    #[serde(default = "default_schedule")]
    pub reaper_schedule: String,
    /// Run one sweep immediately at startup.
    #[serde(default = "default_true")]
    pub sweep_on_startup: bool,
    /// Payload directories without a record are removed once older than this.
    #[serde(default = "default_orphan_grace")]
    pub orphan_grace_minutes: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reaper_schedule: default_schedule(),
            sweep_on_startup: true,
            orphan_grace_minutes: default_orphan_grace(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 0 * * * *".to_string()
}

fn default_orphan_grace() -> u64 {
    60
}
