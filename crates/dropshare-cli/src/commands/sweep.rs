//! One-shot reaper sweep.

use dropshare_core::error::AppError;

use crate::output::{self, OutputFormat};

/// `sweep`
pub async fn execute(config_path: Option<&str>, format: OutputFormat) -> Result<(), AppError> {
    let components = super::connect(config_path).await?;
    let report = components.reaper.sweep().await;

    let fields = [
        ("Scanned", report.scanned.to_string()),
        ("Reaped", report.reaped.to_string()),
        ("Deferred", report.deferred.to_string()),
        ("Failed", report.failed.to_string()),
        ("Orphans removed", report.orphans_removed.to_string()),
    ];
    output::print_item(&report, &fields, format)?;

    if report.failed > 0 {
        return Err(AppError::internal(format!(
            "{} item(s) could not be processed; see the log",
            report.failed
        )));
    }
    Ok(())
}
