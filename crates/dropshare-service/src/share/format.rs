//! Human-readable sizes and durations for views and notifications.

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with binary units, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}

/// Describe the time left until `expires_at`: `45 min`, `5h`, or `2 days`.
pub fn describe_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (expires_at - now).num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes} min")
    } else if minutes < 24 * 60 {
        format!("{}h", minutes / 60)
    } else {
        let days = minutes / (24 * 60);
        format!("{days} day{}", if days > 1 { "s" } else { "" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn test_describe_expiry() {
        let now = Utc::now();
        assert_eq!(describe_expiry(now + Duration::minutes(45), now), "45 min");
        assert_eq!(describe_expiry(now + Duration::hours(5), now), "5h");
        assert_eq!(describe_expiry(now + Duration::hours(24), now), "1 day");
        assert_eq!(describe_expiry(now + Duration::hours(72), now), "3 days");
        assert_eq!(describe_expiry(now - Duration::hours(1), now), "0 min");
    }
}
