//! Notification text.

use std::fmt::Write;

use dropshare_entity::ShareSummary;

use crate::share::format::format_file_size;

/// Render the plain-text message sent for a new share.
pub fn compose_share_message(summary: &ShareSummary) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "New share created");
    let _ = writeln!(text);
    let _ = writeln!(text, "Files: {}", summary.file_count());
    for (name, size) in &summary.files {
        let _ = writeln!(text, "  - {name} ({})", format_file_size(*size));
    }
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "Total size: {}",
        format_file_size(summary.total_size_bytes)
    );
    let _ = writeln!(text, "Expires in: {}", summary.expiry_description);
    if summary.max_downloads == 0 {
        let _ = writeln!(text, "Download limit: unlimited");
    } else {
        let _ = writeln!(text, "Download limit: {}", summary.max_downloads);
    }
    let _ = writeln!(
        text,
        "Password: {}",
        if summary.password_protected { "yes" } else { "no" }
    );
    let _ = writeln!(text);
    let _ = writeln!(text, "ID: {}", summary.share_id);
    let _ = write!(
        text,
        "Created: {}",
        summary.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    text
}
